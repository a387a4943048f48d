use serde::Serialize;
use serde::Serializer;

/// Task contrasts produced by the first-level pipeline, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Motor1,
    Motor2,
    Language,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::Motor1, Task::Motor2, Task::Language];

    pub fn label(self) -> &'static str {
        match self {
            Task::Motor1 => "Motor 1",
            Task::Motor2 => "Motor 2",
            Task::Language => "Language",
        }
    }

    /// Token used in BIDS-style file names (`task-<token>`).
    pub fn file_token(self) -> &'static str {
        match self {
            Task::Motor1 => "motor_run-01",
            Task::Motor2 => "motor_run-02",
            Task::Language => "lang",
        }
    }

    /// Token used for viewer file names.
    pub fn snake_token(self) -> &'static str {
        match self {
            Task::Motor1 => "motor_1",
            Task::Motor2 => "motor_2",
            Task::Language => "language",
        }
    }

    /// Canonical ROI labels for this task, in table order.
    pub fn roi_labels(self) -> &'static [&'static str] {
        match self {
            Task::Motor1 | Task::Motor2 => &[
                "Whole-brain SMA + PMC",
                "Left SMA + PMC",
                "Right SMA + PMC",
            ],
            Task::Language => &[
                "Whole-brain STG",
                "Left STG",
                "Right STG",
                "Whole-brain Heschl",
                "Left Heschl",
                "Right Heschl",
            ],
        }
    }
}

impl Serialize for Task {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    Native,
    Mni,
}

impl Space {
    pub const ALL: [Space; 2] = [Space::Native, Space::Mni];

    /// Label as it appears in CSV rows, file names and report headings.
    pub fn label(self) -> &'static str {
        match self {
            Space::Native => "Native",
            Space::Mni => "MNI",
        }
    }
}

impl Serialize for Space {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Cluster-forming z thresholds of the GLM maps, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Threshold {
    Z31,
    Z235,
}

impl Threshold {
    pub const ALL: [Threshold; 2] = [Threshold::Z31, Threshold::Z235];

    pub fn value(self) -> f32 {
        match self {
            Threshold::Z31 => 3.1,
            Threshold::Z235 => 2.35,
        }
    }

    /// Value as it appears in the CSV `Threshold` column (`Z=...`).
    pub fn csv_label(self) -> &'static str {
        match self {
            Threshold::Z31 => "Z=3.1",
            Threshold::Z235 => "Z=2.35",
        }
    }

    /// Token used in artifact file names.
    pub fn file_token(self) -> &'static str {
        match self {
            Threshold::Z31 => "3.1",
            Threshold::Z235 => "2.35",
        }
    }

    /// Token used in viewer file names.
    pub fn viewer_token(self) -> &'static str {
        match self {
            Threshold::Z31 => "z31",
            Threshold::Z235 => "z235",
        }
    }
}

impl Serialize for Threshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.csv_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Zstat,
    Tfce,
}

impl StatKind {
    /// Value as it appears in the CSV `Stat Type` column.
    pub fn csv_label(self) -> &'static str {
        match self {
            StatKind::Zstat => "Z-stat",
            StatKind::Tfce => "TFCE",
        }
    }
}

impl Serialize for StatKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.csv_label())
    }
}

/// The 12 canonical table slots: every task's ROI labels in task order.
pub fn canonical_slots() -> Vec<(Task, &'static str)> {
    let mut slots = Vec::with_capacity(12);
    for task in Task::ALL {
        for label in task.roi_labels() {
            slots.push((task, *label));
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_slots_order() {
        let slots = canonical_slots();
        assert_eq!(slots.len(), 12);
        assert_eq!(slots[0], (Task::Motor1, "Whole-brain SMA + PMC"));
        assert_eq!(slots[3], (Task::Motor2, "Whole-brain SMA + PMC"));
        assert_eq!(slots[5], (Task::Motor2, "Right SMA + PMC"));
        assert_eq!(slots[6], (Task::Language, "Whole-brain STG"));
        assert_eq!(slots[9], (Task::Language, "Whole-brain Heschl"));
        assert_eq!(slots[11], (Task::Language, "Right Heschl"));
    }

    #[test]
    fn test_threshold_labels() {
        assert_eq!(Threshold::Z31.csv_label(), "Z=3.1");
        assert_eq!(Threshold::Z235.csv_label(), "Z=2.35");
        assert_eq!(Threshold::Z31.file_token(), "3.1");
        assert_eq!(Threshold::Z235.viewer_token(), "z235");
    }

    #[test]
    fn test_report_order() {
        assert_eq!(Space::ALL[0], Space::Native);
        assert_eq!(Threshold::ALL[0], Threshold::Z31);
    }
}
