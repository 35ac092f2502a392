use std::fmt::Write;

use crate::metrics::{LOSS, ACCURACY};
use crate::report::recording::{Block, RecordingSurface};
use crate::report::surface::{ChartHandle, ProgressHandle, TextHandle};

const BAR_WIDTH: usize = 40;
const GRID_COLUMNS: usize = 12;

/// Renders the final state of a recorded report as plain text.
///
/// Charts are summarised by their row count and last row; image grids by
/// their captions.
pub fn render_plain(surface: &RecordingSurface) -> String {
    let mut out = String::new();
    for block in surface.blocks() {
        // Writing into a String cannot fail.
        let _ = render_block(&mut out, surface, block);
    }
    out
}

fn render_block(out: &mut String, surface: &RecordingSurface, block: &Block) -> std::fmt::Result {
    match block {
        Block::Header { text, level } => {
            writeln!(out)?;
            writeln!(out, "{} {}", "#".repeat(*level as usize), text)?;
        }
        Block::Text(id) => {
            writeln!(out, "{}", surface.text(TextHandle(*id)).unwrap_or(""))?;
        }
        Block::Alert { id, kind } => {
            let label = format!("{:?}", kind).to_lowercase();
            writeln!(out, "[{}] {}", label, surface.text(TextHandle(*id)).unwrap_or(""))?;
        }
        Block::Progress(id) => {
            let percent = surface.progress(ProgressHandle(*id)).unwrap_or(0).min(100) as usize;
            let filled = percent * BAR_WIDTH / 100;
            writeln!(
                out,
                "[{}{}] {:>3}%",
                "#".repeat(filled),
                ".".repeat(BAR_WIDTH - filled),
                percent
            )?;
        }
        Block::Chart { id, kind } => {
            let rows = surface.chart_rows(ChartHandle(*id)).unwrap_or(&[]);
            write!(out, "({:?} chart, {} points", kind, rows.len())?;
            if let Some(last) = rows.last() {
                write!(
                    out,
                    ", last {}={:.5} {}={:.5}",
                    LOSS,
                    last.get(LOSS).unwrap_or(f64::NAN),
                    ACCURACY,
                    last.get(ACCURACY).unwrap_or(f64::NAN)
                )?;
            }
            writeln!(out, ")")?;
        }
        Block::ImageGrid { captions, .. } => {
            for line in captions.chunks(GRID_COLUMNS) {
                let cells: Vec<String> = line.iter().map(|c| format!("{:>3}", c)).collect();
                writeln!(out, "{}", cells.join(""))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricSample;
    use crate::report::chart::{ChartKind, ChartSpec};
    use crate::report::surface::{AlertKind, ReportSurface};

    #[test]
    fn renders_current_state_in_document_order() {
        let mut surface = RecordingSurface::new();
        surface.render_header("Epoch 0", 3).unwrap();
        let chart = surface.render_chart(&ChartSpec::loss_accuracy(ChartKind::Line, 0)).unwrap();
        let progress = surface.render_progress(0).unwrap();
        let stats = surface.render_alert("No stats yet.", AlertKind::Info).unwrap();
        surface.append_rows(chart, &[MetricSample::loss_accuracy(0.25, 0.5)]).unwrap();
        surface.update_progress(progress, 50).unwrap();
        surface.update_text(stats, "loss: 0.25000").unwrap();

        let text = render_plain(&surface);
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines[0], "### Epoch 0");
        assert_eq!(lines[1], "(Line chart, 1 points, last loss=0.25000 accuracy=0.50000)");
        assert!(lines[2].ends_with(" 50%"));
        assert_eq!(lines[3], "[info] loss: 0.25000");
    }

    #[test]
    fn progress_above_100_renders_a_full_bar() {
        let mut surface = RecordingSurface::new();
        let progress = surface.render_progress(150).unwrap();
        assert_eq!(
            render_plain(&surface).trim(),
            format!("[{}] 100%", "#".repeat(BAR_WIDTH))
        );
        surface.update_progress(progress, 255).unwrap();
        assert!(render_plain(&surface).trim().ends_with("] 100%"));
    }
}
