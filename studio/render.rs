/// Template renderer for the report studio.
///
/// The studio serves a single HTML page (`studio/assets/report.html`) with
/// placeholder tokens like `{{TOKEN}}`. The template is embedded at compile
/// time; `render_page` resolves the global tokens and hands the rest to a
/// closure. Tokens the closure leaves untouched are blanked.

use crate::state::{FlashKind, FlashMessage};

const TEMPLATE: &str = include_str!("assets/report.html");

/// Renders the report page.
///
/// # Arguments
/// - `title`           : report title shown in the browser tab
/// - `training_running`: whether a run is currently streaming
/// - `fill`            : closure that fills the remaining placeholders
pub fn render_page<F>(title: &str, training_running: bool, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{TITLE}}",            &html_escape(title));
    html = html.replace("{{TRAINING_RUNNING}}", if training_running { "true" } else { "false" });
    html = html.replace("{{START_DISABLED}}",   if training_running { "disabled" } else { "" });
    html = html.replace("{{STOP_DISABLED}}",    if training_running { "" } else { "disabled" });

    html = fill(html);

    blank_remaining(html)
}

/// Replaces any `{{TOKEN}}` that wasn't substituted with an empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

pub fn render_flash_html(flash: Option<&FlashMessage>) -> String {
    match flash {
        None    => String::new(),
        Some(f) => {
            let cls = match f.kind {
                FlashKind::Success => "flash-success",
                FlashKind::Error   => "flash-error",
            };
            format!(r#"<div class="flash {}">{}</div>"#, cls, html_escape(&f.text))
        }
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}
