use std::fs;
use std::path::Path;

use tracing::{info, info_span};

use crate::config::RunConfig;
use crate::error::ReportError;
use crate::layout::SubjectLayout;
use crate::model::{Space, Task, Threshold};
use crate::render::mosaic::render_zmap_mosaic;
use crate::render::table::render_stats_table;
use crate::render::viewer::render_viewer;
use crate::report::html::{HtmlContext, SpaceSection, TaskViewers, ThresholdPanel, render_html};
use crate::report::json::{JsonSummary, render_summary_json};
use crate::report::pdf::render_pdf;
use crate::report::{ArtifactPaths, ViewerKind, file_data_uri};
use crate::stats::aggregate::{SpaceTables, TableSelector, aggregate_space};

/// Runs the full report pipeline for one subject: aggregate the per-task
/// CSVs, render (or reuse) the composite images and tables, regenerate the
/// interactive viewers, and assemble the HTML, PDF, and JSON documents.
pub fn process_subject(subject: &str, config: &RunConfig) -> Result<(), ReportError> {
    let span = info_span!("subject", id = subject);
    let _guard = span.enter();

    let layout = SubjectLayout::new(subject, &config.archive_dir, &config.roi_dir);
    create_dir(&layout.post_stats_dir)?;
    create_dir(&layout.viewer_dir)?;
    let paths = ArtifactPaths::new(&layout);

    let native = aggregate_space(&layout, Space::Native);
    let mni = aggregate_space(&layout, Space::Mni);

    // Mosaics and tables are cached as a set: all present means all current.
    // A partial set regenerates everything rather than guessing which of the
    // survivors is stale.
    if !config.force && paths.all_cached() {
        info!("composite images and tables present; reusing");
    } else {
        render_composites(&layout, &paths, &native, &mni)?;
    }

    // Viewers are cheap relative to the mosaics and their rendering evolves
    // independently, so they are rebuilt on every run.
    render_viewers(&layout, &paths)?;

    assemble_reports(&layout, &paths, &native, &mni)?;
    info!("subject report complete");
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::io(dir, source))
}

fn render_composites(
    layout: &SubjectLayout,
    paths: &ArtifactPaths,
    native: &SpaceTables,
    mni: &SpaceTables,
) -> Result<(), ReportError> {
    for (space, tables) in [(Space::Native, native), (Space::Mni, mni)] {
        for threshold in Threshold::ALL {
            render_zmap_mosaic(layout, space, threshold, &paths.zmap_plot(space, threshold))?;
            let selector = TableSelector::Zstat(threshold);
            let svg = render_stats_table(tables.zstat(threshold), space, selector);
            write_text(&paths.stats_table(space, selector), &svg)?;
        }
        let svg = render_stats_table(&tables.tfce, space, TableSelector::Tfce);
        write_text(&paths.stats_table(space, TableSelector::Tfce), &svg)?;
    }
    Ok(())
}

fn render_viewers(layout: &SubjectLayout, paths: &ArtifactPaths) -> Result<(), ReportError> {
    let bg = layout.background(Space::Native);
    for task in Task::ALL {
        let record = layout.record(task, Space::Native);
        for kind in ViewerKind::ALL {
            let map = match kind.threshold() {
                Some(threshold) => record.thresh_map(threshold),
                None => record.z_map.as_path(),
            };
            render_viewer(
                bg,
                map,
                kind.display_threshold(),
                &kind.title(task),
                &paths.viewer_file(task, kind),
            )?;
        }
    }
    Ok(())
}

fn assemble_reports(
    layout: &SubjectLayout,
    paths: &ArtifactPaths,
    native: &SpaceTables,
    mni: &SpaceTables,
) -> Result<(), ReportError> {
    let section = |space: Space| -> Result<SpaceSection, ReportError> {
        Ok(SpaceSection {
            z31: panel(paths, space, Threshold::Z31)?,
            z235: panel(paths, space, Threshold::Z235)?,
        })
    };
    let native_section = section(Space::Native)?;
    let mni_section = section(Space::Mni)?;

    let viewers = |kind: ViewerKind, unthresh: ViewerKind| -> Vec<TaskViewers> {
        Task::ALL
            .into_iter()
            .map(|task| TaskViewers {
                task_label: task.label().to_string(),
                thresh_href: paths.viewer_rel(task, kind),
                unthresh_href: paths.viewer_rel(task, unthresh),
            })
            .collect()
    };

    let ctx = HtmlContext {
        subject: layout.subject.clone(),
        native: native_section,
        mni: mni_section,
        viewers_31: viewers(ViewerKind::Z31, ViewerKind::UnthreshZ31),
        viewers_235: viewers(ViewerKind::Z235, ViewerKind::UnthreshZ235),
    };
    let html_path = paths.html_report();
    write_text(&html_path, &render_html(&ctx))?;
    info!(path = %html_path.display(), "HTML report saved");

    render_pdf(&layout.subject, paths, native, mni, &paths.pdf_report())?;

    let summary = JsonSummary::new(
        &layout.subject,
        layout.subject_dir.display().to_string(),
        layout.roi_templates.display().to_string(),
        paths.expected_files(),
        native,
        mni,
    );
    let json_path = paths.json_summary();
    write_text(&json_path, &render_summary_json(&summary)?)?;
    info!(path = %json_path.display(), "JSON summary saved");
    Ok(())
}

fn panel(
    paths: &ArtifactPaths,
    space: Space,
    threshold: Threshold,
) -> Result<ThresholdPanel, ReportError> {
    Ok(ThresholdPanel {
        roi_img: file_data_uri(&paths.zmap_plot(space, threshold))?,
        zstat_table_img: file_data_uri(&paths.stats_table(space, TableSelector::Zstat(threshold)))?,
        tfce_table_img: file_data_uri(&paths.stats_table(space, TableSelector::Tfce))?,
    })
}

fn write_text(path: &Path, content: &str) -> Result<(), ReportError> {
    fs::write(path, content).map_err(|source| ReportError::io(path, source))
}
