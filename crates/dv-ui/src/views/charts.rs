use dv_core::Dataset;
use egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use super::{numeric_cell, numeric_columns};

/// One line per numeric column, plotted against the row index
pub fn show(ui: &mut Ui, dataset: &Dataset) {
    let rows = dataset.rows().unwrap_or_default();
    let columns = numeric_columns(rows);
    if columns.is_empty() {
        ui.label("No numeric columns to chart.");
        return;
    }

    Plot::new(format!("charts_{}", dataset.id))
        .legend(Legend::default())
        .show_grid(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for column in &columns {
                let points: Vec<[f64; 2]> = rows
                    .iter()
                    .enumerate()
                    .filter_map(|(i, row)| numeric_cell(row, column).map(|y| [i as f64, y]))
                    .collect();
                plot_ui.line(Line::new(PlotPoints::new(points)).name(column));
            }
        });
}
