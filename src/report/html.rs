use std::fmt::Write as _;

use crate::model::{Space, Threshold};
use crate::report::mosaic_row_captions;

/// Inline-encoded artifacts for one (space, threshold) tab.
#[derive(Debug, Clone)]
pub struct ThresholdPanel {
    pub roi_img: String,
    pub zstat_table_img: String,
    pub tfce_table_img: String,
}

#[derive(Debug, Clone)]
pub struct SpaceSection {
    pub z31: ThresholdPanel,
    pub z235: ThresholdPanel,
}

impl SpaceSection {
    fn panel(&self, threshold: Threshold) -> &ThresholdPanel {
        match threshold {
            Threshold::Z31 => &self.z31,
            Threshold::Z235 => &self.z235,
        }
    }
}

/// Relative links to one task's viewer pair for one threshold.
#[derive(Debug, Clone)]
pub struct TaskViewers {
    pub task_label: String,
    pub thresh_href: String,
    pub unthresh_href: String,
}

/// Everything the HTML report embeds. One field per artifact slot, so a
/// missing artifact fails to construct instead of failing to render.
#[derive(Debug, Clone)]
pub struct HtmlContext {
    pub subject: String,
    pub native: SpaceSection,
    pub mni: SpaceSection,
    pub viewers_31: Vec<TaskViewers>,
    pub viewers_235: Vec<TaskViewers>,
}

impl HtmlContext {
    fn section(&self, space: Space) -> &SpaceSection {
        match space {
            Space::Native => &self.native,
            Space::Mni => &self.mni,
        }
    }

    fn viewers(&self, threshold: Threshold) -> &[TaskViewers] {
        match threshold {
            Threshold::Z31 => &self.viewers_31,
            Threshold::Z235 => &self.viewers_235,
        }
    }
}

const STYLE: &str = "\
.space-tab{overflow:hidden;border:1px solid #ccc;background-color:#f1f1f1;}\
.space-tab button{background-color:inherit;float:left;border:none;outline:none;cursor:pointer;padding:14px 16px;transition:0.3s;}\
.space-tab button:hover{background-color:#ddd;}\
.space-tab button.active{background-color:#ccc;}\
.space-tabcontent{display:none;padding:6px 12px;border:1px solid #ccc;border-top:none;}\
.thresh-tab{overflow:hidden;background-color:#e9ecef;}\
.thresh-tab button{background-color:inherit;float:left;border:none;outline:none;cursor:pointer;padding:10px 12px;transition:0.3s;}\
.thresh-tab button:hover{background-color:#ced4da;}\
.thresh-tab button.active{background-color:#adb5bd;}\
.thresh-tabcontent{display:none;padding:6px 12px;}\
img{max-width:90%;height:auto;}\
.mosaic-rows{font-size:13px;color:#333;columns:2;margin:4px 0;}\
.viewer{width:100%;height:400px;border:none;}";

const TAB_SCRIPT: &str = "\
function openSpaceTab(evt,spaceName){\
var i,c=document.getElementsByClassName('space-tabcontent');\
for(i=0;i<c.length;i++){c[i].style.display='none';}\
var l=document.getElementsByClassName('space-tablinks');\
for(i=0;i<l.length;i++){l[i].className=l[i].className.replace(' active','');}\
document.getElementById(spaceName).style.display='block';\
evt.currentTarget.className+=' active';\
document.getElementById('defaultThresh'+spaceName).click();}\
function openThreshTab(evt,threshName,spaceName){\
var i,c=document.getElementsByClassName('thresh-tabcontent');\
for(i=0;i<c.length;i++){if(c[i].parentElement.id===spaceName){c[i].style.display='none';}}\
var l=document.getElementsByClassName('thresh-tablinks');\
for(i=0;i<l.length;i++){if(l[i].parentElement.parentElement.id===spaceName){l[i].className=l[i].className.replace(' active','');}}\
document.getElementById(threshName).style.display='block';\
evt.currentTarget.className+=' active';}\
document.getElementById('defaultSpaceOpen').click();";

/// Renders the tabbed subject report: Space tabs, Threshold tabs within,
/// inline images, and (Native only) the interactive viewer frames.
pub fn render_html(ctx: &HtmlContext) -> String {
    let mut html = String::with_capacity(256 * 1024);
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"en\">");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "<meta charset=\"utf-8\"/>");
    let _ = writeln!(html, "<title>{} Task-Based fMRI Report</title>", ctx.subject);
    let _ = writeln!(html, "<style>{STYLE}</style>");
    let _ = writeln!(html, "</head>");
    let _ = writeln!(html, "<body>");
    let _ = writeln!(html, "<h1>{} Task-Based fMRI Report</h1>", ctx.subject);

    let _ = writeln!(html, "<div class=\"space-tab\">");
    let _ = writeln!(
        html,
        "<button class=\"space-tablinks\" onclick=\"openSpaceTab(event, 'Native')\" \
id=\"defaultSpaceOpen\">Native Space</button>"
    );
    let _ = writeln!(
        html,
        "<button class=\"space-tablinks\" onclick=\"openSpaceTab(event, 'MNI')\">MNI Space</button>"
    );
    let _ = writeln!(html, "</div>");

    for space in Space::ALL {
        write_space_section(&mut html, ctx, space);
    }

    let _ = writeln!(html, "<script>{TAB_SCRIPT}</script>");
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    html
}

fn write_space_section(html: &mut String, ctx: &HtmlContext, space: Space) {
    let space_id = space.label();
    let _ = writeln!(html, "<div id=\"{space_id}\" class=\"space-tabcontent\">");
    let _ = writeln!(html, "<div class=\"thresh-tab\">");
    let _ = writeln!(
        html,
        "<button class=\"thresh-tablinks\" onclick=\"openThreshTab(event, '{space_id}_31', \
'{space_id}')\" id=\"defaultThresh{space_id}\">Cluster-Threshold Z=3.1</button>"
    );
    let _ = writeln!(
        html,
        "<button class=\"thresh-tablinks\" onclick=\"openThreshTab(event, '{space_id}_235', \
'{space_id}')\">Cluster-Threshold Z=2.35</button>"
    );
    let _ = writeln!(html, "</div>");

    for threshold in Threshold::ALL {
        let tab_id = match threshold {
            Threshold::Z31 => format!("{space_id}_31"),
            Threshold::Z235 => format!("{space_id}_235"),
        };
        let z = threshold.csv_label();
        let panel = ctx.section(space).panel(threshold);

        let _ = writeln!(html, "<div id=\"{tab_id}\" class=\"thresh-tabcontent\">");
        let _ = writeln!(
            html,
            "<h2>Z-Maps with ROI Outlines ({space_id} Space, {z})</h2>"
        );
        let _ = writeln!(
            html,
            "<img src=\"{}\" alt=\"{space_id} ROI Plot {z}\">",
            panel.roi_img
        );
        // Mosaic rows carry no rasterized titles; caption them here in the
        // same top-to-bottom order.
        let _ = writeln!(html, "<ol class=\"mosaic-rows\">");
        for caption in mosaic_row_captions(&ctx.subject, threshold) {
            let _ = writeln!(html, "<li>{caption}</li>");
        }
        let _ = writeln!(html, "</ol>");
        let _ = writeln!(
            html,
            "<h2>GLM Test Z-map ROI Statistics ({space_id} Space, {z})</h2>"
        );
        let _ = writeln!(
            html,
            "<img src=\"{}\" alt=\"{space_id} Z-stat Table {z}\">",
            panel.zstat_table_img
        );
        let _ = writeln!(
            html,
            "<h2>Permutation Test T-map ROI Statistics ({space_id} Space, p&lt;0.05)</h2>"
        );
        let _ = writeln!(
            html,
            "<img src=\"{}\" alt=\"{space_id} TFCE Table\">",
            panel.tfce_table_img
        );

        if space == Space::Native {
            let _ = writeln!(
                html,
                "<h2>Interactive Brain Viewer (Native Space, {z})</h2>"
            );
            for viewer in ctx.viewers(threshold) {
                let task = &viewer.task_label;
                let _ = writeln!(html, "<h3>{task}</h3>");
                let _ = writeln!(
                    html,
                    "<iframe src=\"{}\" class=\"viewer\"></iframe>",
                    viewer.thresh_href
                );
                let _ = writeln!(
                    html,
                    "<p><a href=\"{}\" target=\"_blank\">Open {task} {z} Viewer in New Tab</a></p>",
                    viewer.thresh_href
                );
                let _ = writeln!(
                    html,
                    "<iframe src=\"{}\" class=\"viewer\"></iframe>",
                    viewer.unthresh_href
                );
                let _ = writeln!(
                    html,
                    "<p><a href=\"{}\" target=\"_blank\">Open {task} Unthresholded Viewer in New \
Tab</a></p>",
                    viewer.unthresh_href
                );
            }
        }
        let _ = writeln!(html, "</div>");
    }
    let _ = writeln!(html, "</div>");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(tag: &str) -> ThresholdPanel {
        ThresholdPanel {
            roi_img: format!("data:image/png;base64,{tag}roi"),
            zstat_table_img: format!("data:image/svg+xml;base64,{tag}zstat"),
            tfce_table_img: format!("data:image/svg+xml;base64,{tag}tfce"),
        }
    }

    fn context() -> HtmlContext {
        let viewers = |z: &str| {
            vec![TaskViewers {
                task_label: "Motor 1".to_string(),
                thresh_href: format!("viewers/native_motor_1_{z}_viewer.html"),
                unthresh_href: format!("viewers/native_motor_1_unthresh_{z}_viewer.html"),
            }]
        };
        HtmlContext {
            subject: "042".to_string(),
            native: SpaceSection {
                z31: panel("n31"),
                z235: panel("n235"),
            },
            mni: SpaceSection {
                z31: panel("m31"),
                z235: panel("m235"),
            },
            viewers_31: viewers("z31"),
            viewers_235: viewers("z235"),
        }
    }

    #[test]
    fn test_report_has_two_level_tabs() {
        let html = render_html(&context());
        assert!(html.contains("Native Space"));
        assert!(html.contains("MNI Space"));
        assert!(html.contains("id=\"Native_31\""));
        assert!(html.contains("id=\"Native_235\""));
        assert!(html.contains("id=\"MNI_31\""));
        assert!(html.contains("Cluster-Threshold Z=2.35"));
        assert!(html.contains("defaultSpaceOpen"));
    }

    #[test]
    fn test_every_panel_is_embedded() {
        let html = render_html(&context());
        for tag in ["n31", "n235", "m31", "m235"] {
            assert!(html.contains(&format!("{tag}roi")));
            assert!(html.contains(&format!("{tag}zstat")));
            assert!(html.contains(&format!("{tag}tfce")));
        }
    }

    #[test]
    fn test_mosaic_rows_are_captioned() {
        let html = render_html(&context());
        let start = html.find("id=\"Native_31\"").unwrap();
        let native_31 = &html[start..];
        let end = native_31.find("</ol>").unwrap();
        let mosaic_block = &native_31[..end];
        assert!(mosaic_block.contains("n31roi"));
        assert!(mosaic_block.contains("<li>sub-042 Motor 1 (unthresholded)</li>"));
        assert!(mosaic_block.contains("<li>sub-042 Motor 1 (thresholded, Z=3.1)</li>"));
        assert!(mosaic_block.contains("<li>sub-042 Language (thresholded, Z=3.1)</li>"));
    }

    #[test]
    fn test_viewers_only_in_native_tabs() {
        let html = render_html(&context());
        assert!(html.contains("viewers/native_motor_1_z31_viewer.html"));
        assert!(html.contains("Open Motor 1 Z=3.1 Viewer in New Tab"));
        let mni_section = html.split("<div id=\"MNI\"").nth(1).unwrap();
        assert!(!mni_section.contains("iframe"));
    }
}
