use std::fmt::Write as _;
use std::io::Cursor;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::RgbImage;
use tracing::info;

use crate::error::RenderError;
use crate::render::volume::Volume;
use crate::render::{blend, sample, stat_color};

/// Rendered edge length of one viewer slice.
const VIEW: u32 = 200;
/// Upper bound on embedded slices; larger volumes are strided.
const MAX_SLICES: usize = 48;
const STAT_ALPHA: f32 = 0.7;

/// Renders a self-contained interactive viewer: the statistical overlay on
/// the anatomical background, pre-composited per axial slice and embedded as
/// base64 PNGs, navigable with a slider or arrow keys. A display threshold
/// of 0 shows the unthresholded map.
pub fn render_viewer(
    bg_path: &Path,
    map_path: &Path,
    display_threshold: f32,
    title: &str,
    out_path: &Path,
) -> Result<(), RenderError> {
    let bg = Volume::load(bg_path)?;
    let map = Volume::load(map_path)?;
    let html = viewer_html(&bg, &map, display_threshold, title)?;
    std::fs::write(out_path, html).map_err(|source| RenderError::Io {
        path: out_path.to_path_buf(),
        source,
    })?;
    info!(path = %out_path.display(), "viewer saved");
    Ok(())
}

pub fn viewer_html(
    bg: &Volume,
    map: &Volume,
    display_threshold: f32,
    title: &str,
) -> Result<String, RenderError> {
    let ceiling = bg.intensity_ceiling();
    let floor = if display_threshold > 0.0 {
        display_threshold
    } else {
        0.01
    };
    let n = bg.n_slices();
    let stride = n.div_ceil(MAX_SLICES).max(1);

    let mut frames = Vec::new();
    let mut world_zs = Vec::new();
    for k in (0..n).step_by(stride) {
        let world_z = bg.world_z_of_slice(k);
        let bg_slice = bg.axial_slice(k);
        let map_slice = map.axial_slice(map.slice_index_for_world_z(world_z));

        let mut img = RgbImage::new(VIEW, VIEW);
        for py in 0..VIEW {
            for px in 0..VIEW {
                let u = (px as f32 + 0.5) / VIEW as f32;
                let v = (py as f32 + 0.5) / VIEW as f32;
                let anat = (sample(&bg_slice, u, v) / ceiling).clamp(0.0, 1.0);
                let g = (anat * 255.0) as u8;
                let mut pixel = [g, g, g];
                let z = sample(&map_slice, u, v);
                if z.is_finite() && z.abs() >= floor {
                    pixel = blend(pixel, stat_color(z), STAT_ALPHA);
                }
                img.put_pixel(px, py, image::Rgb(pixel));
            }
        }

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .map_err(|source| RenderError::Image {
                path: std::path::PathBuf::from(title),
                source,
            })?;
        frames.push(BASE64.encode(&png));
        world_zs.push(world_z);
    }

    let mut html = String::with_capacity(frames.len() * 24 * 1024);
    // Infallible String writes.
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"en\">");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "<meta charset=\"utf-8\"/>");
    let _ = writeln!(html, "<title>{}</title>", html_escape(title));
    let _ = writeln!(html, "<style>");
    let _ = writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:12px;text-align:center;background:#111;color:#eee;}}"
    );
    let _ = writeln!(html, "img{{image-rendering:pixelated;width:400px;height:400px;}}");
    let _ = writeln!(html, "input[type=range]{{width:400px;}}");
    let _ = writeln!(html, "</style>");
    let _ = writeln!(html, "</head>");
    let _ = writeln!(html, "<body>");
    let _ = writeln!(html, "<h3>{}</h3>", html_escape(title));
    let threshold_label = if display_threshold > 0.0 {
        format!("display threshold |z| &ge; {display_threshold}")
    } else {
        "unthresholded".to_string()
    };
    let _ = writeln!(html, "<p>{threshold_label}</p>");
    let _ = writeln!(html, "<img id=\"slice\" alt=\"axial slice\"/>");
    let _ = writeln!(
        html,
        "<p><input id=\"nav\" type=\"range\" min=\"0\" max=\"{}\" value=\"{}\"/></p>",
        frames.len() - 1,
        frames.len() / 2
    );
    let _ = writeln!(html, "<p id=\"label\"></p>");
    let _ = writeln!(html, "<script>");
    let _ = write!(html, "const slices=[");
    for (i, frame) in frames.iter().enumerate() {
        if i > 0 {
            html.push(',');
        }
        let _ = write!(html, "\"data:image/png;base64,{frame}\"");
    }
    let _ = writeln!(html, "];");
    let _ = write!(html, "const zs=[");
    for (i, z) in world_zs.iter().enumerate() {
        if i > 0 {
            html.push(',');
        }
        let _ = write!(html, "{z:.1}");
    }
    let _ = writeln!(html, "];");
    let _ = writeln!(
        html,
        "const img=document.getElementById('slice');\
const nav=document.getElementById('nav');\
const label=document.getElementById('label');\
function show(i){{img.src=slices[i];label.textContent='slice '+(+i+1)+'/'+slices.length+' (z='+zs[i]+' mm)';}}\
nav.addEventListener('input',()=>show(nav.value));\
document.addEventListener('keydown',(e)=>{{\
if(e.key==='ArrowLeft'&&nav.value>0){{nav.value--;show(nav.value);}}\
if(e.key==='ArrowRight'&&nav.value<slices.length-1){{nav.value++;show(nav.value);}}}});\
show(nav.value);"
    );
    let _ = writeln!(html, "</script>");
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    Ok(html)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
