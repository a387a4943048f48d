use std::fmt::Write;

use crate::model::Space;
use crate::stats::aggregate::TableSelector;
use crate::stats::{RoiStatsRow, RowSet};

const COL_WIDTHS: [u32; 6] = [70, 160, 160, 150, 160, 160];
const MARGIN: u32 = 10;
const TITLE_H: u32 = 34;
const HEADER_H: u32 = 34;
const ROW_H: u32 = 26;
const CAPTION_LINE_H: u32 = 16;

const COLUMN_LABELS: [&str; 6] = [
    "Task",
    "ROI",
    "Activated Voxels across Whole Brain",
    "Activated Voxels within ROI",
    "%Activated ROI/%Activated WB (ratio)*",
    "Activated Voxels in ROI across WB (%)*",
];

const FOOTNOTE_RATIO: &str = "*%Activated ROI/%Activated WB (ratio): Percentage of activated \
voxels in ROI (Column 4) divided by Percentage of activated voxels across Whole Brain (Column 3)";
const FOOTNOTE_ROI_WB: &str = "*Activated Voxels in ROI across WB (%): Activated voxels in ROI \
(Column 4) divided by Whole-brain voxel counts; (percentage in parentheses is total ROI voxels / \
whole brain voxels)";

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn table_width() -> u32 {
    2 * MARGIN + COL_WIDTHS.iter().sum::<u32>()
}

pub(crate) fn title_for(space: Space, selector: TableSelector) -> String {
    match selector {
        TableSelector::Zstat(t) => format!(
            "Supra-thresholded Voxels in {} Space ({})",
            space.label(),
            t.csv_label()
        ),
        TableSelector::Tfce => format!(
            "Supra-thresholded Voxels in {} Space (p-corrected t-map, p<0.05)",
            space.label()
        ),
    }
}

pub(crate) fn placeholder_text(space: Space, selector: TableSelector) -> String {
    match selector {
        TableSelector::Zstat(t) => format!(
            "No Z-stat data available for {} space ({})",
            space.label(),
            t.csv_label()
        ),
        TableSelector::Tfce => format!(
            "No TFCE data available for {} space (p<0.05)",
            space.label()
        ),
    }
}

/// Cell text for the six-column body, in row order. The task label appears
/// only on the first row of each task's group.
pub(crate) fn table_cells(rows: &[RoiStatsRow]) -> Vec<[String; 6]> {
    let mut last_task = None;
    rows.iter()
        .map(|row| {
            let task_cell = if last_task == Some(row.task) {
                String::new()
            } else {
                last_task = Some(row.task);
                row.task.label().to_string()
            };
            [
                task_cell,
                row.roi.clone(),
                format!("{} ({:.1}%)", row.activated_wb, row.activated_wb_pct),
                format!("{} ({:.1}%)", row.activated_roi, row.activated_roi_pct),
                format!("{:.1}", row.activated_ratio),
                format!("{:.1} ({:.1}%)", row.activated_roi_wb_pct, row.roi_voxel_pct()),
            ]
        })
        .collect()
}

/// Caption block under a table: voxel counts plus the two column footnotes.
pub(crate) fn caption_lines(rows: &[RoiStatsRow]) -> [String; 4] {
    let wb_voxels = rows.first().map(|r| r.wb_voxels).unwrap_or(0);
    let roi_voxels = rows
        .iter()
        .map(|r| r.roi_voxels.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    [
        format!("Whole-brain voxel counts: {wb_voxels}"),
        format!("ROI voxel counts (order follows table): {roi_voxels}"),
        FOOTNOTE_RATIO.to_string(),
        FOOTNOTE_ROI_WB.to_string(),
    ]
}

/// Renders one statistics table as a standalone SVG document. An empty row
/// set becomes a single-cell placeholder instead of a table.
pub fn render_stats_table(rows: &RowSet, space: Space, selector: TableSelector) -> String {
    match rows {
        RowSet::Empty => render_placeholder(space, selector),
        RowSet::Rows(rows) => render_table(rows, space, selector),
    }
}

fn svg_open(out: &mut String, width: u32, height: u32) {
    // Infallible String writes.
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
viewBox=\"0 0 {width} {height}\" font-family=\"Helvetica, Arial, sans-serif\">"
    );
    let _ = writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"white\"/>"
    );
}

fn render_placeholder(space: Space, selector: TableSelector) -> String {
    let width = table_width();
    let height = TITLE_H + 3 * ROW_H;
    let mut out = String::with_capacity(1024);
    svg_open(&mut out, width, height);
    let _ = writeln!(
        out,
        "<text x=\"{}\" y=\"22\" text-anchor=\"middle\" font-size=\"14\" font-weight=\"bold\">{}</text>",
        width / 2,
        xml_escape(&title_for(space, selector))
    );
    let _ = writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#c00000\">{}</text>",
        width / 2,
        TITLE_H + 3 * ROW_H / 2,
        xml_escape(&placeholder_text(space, selector))
    );
    out.push_str("</svg>\n");
    out
}

fn render_table(rows: &[RoiStatsRow], space: Space, selector: TableSelector) -> String {
    let width = table_width();
    let caption_line_count = 4u32;
    let height = TITLE_H
        + HEADER_H
        + rows.len() as u32 * ROW_H
        + 10
        + caption_line_count * CAPTION_LINE_H
        + MARGIN;
    let mut out = String::with_capacity(16 * 1024);
    svg_open(&mut out, width, height);

    let _ = writeln!(
        out,
        "<text x=\"{}\" y=\"22\" text-anchor=\"middle\" font-size=\"14\" font-weight=\"bold\">{}</text>",
        width / 2,
        xml_escape(&title_for(space, selector))
    );

    // Header row.
    let _ = writeln!(
        out,
        "<rect x=\"{MARGIN}\" y=\"{TITLE_H}\" width=\"{}\" height=\"{HEADER_H}\" fill=\"#4CAF50\"/>",
        width - 2 * MARGIN
    );
    let mut x = MARGIN;
    for (label, w) in COLUMN_LABELS.iter().zip(COL_WIDTHS) {
        let _ = writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"9\" font-weight=\"bold\" \
fill=\"white\">{}</text>",
            x + w / 2,
            TITLE_H + HEADER_H / 2 + 3,
            xml_escape(label)
        );
        x += w;
    }

    // Body rows, banded per three-ROI task grouping.
    for (i, cells) in table_cells(rows).iter().enumerate() {
        let y = TITLE_H + HEADER_H + i as u32 * ROW_H;
        if (i / 3) % 2 == 1 {
            let _ = writeln!(
                out,
                "<rect x=\"{MARGIN}\" y=\"{y}\" width=\"{}\" height=\"{ROW_H}\" fill=\"#f2f2f2\"/>",
                width - 2 * MARGIN
            );
        }
        let mut x = MARGIN;
        for (cell, w) in cells.iter().zip(COL_WIDTHS) {
            if !cell.is_empty() {
                let _ = writeln!(
                    out,
                    "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\">{}</text>",
                    x + w / 2,
                    y + ROW_H / 2 + 4,
                    xml_escape(cell)
                );
            }
            x += w;
        }
    }

    // Caption block.
    let caption_y = TITLE_H + HEADER_H + rows.len() as u32 * ROW_H + 10;
    for (i, line) in caption_lines(rows).iter().enumerate() {
        let _ = writeln!(
            out,
            "<text x=\"{MARGIN}\" y=\"{}\" font-size=\"8\" fill=\"#333\">{}</text>",
            caption_y + (i as u32 + 1) * CAPTION_LINE_H,
            xml_escape(line)
        );
    }

    out.push_str("</svg>\n");
    out
}
