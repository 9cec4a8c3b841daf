use dv_core::Dataset;
use egui::Ui;
use egui_extras::{Column, TableBuilder};

use super::{cell_text, columns_of};

/// Maximum rows rendered; the rest is summarized below the table
const MAX_ROWS: usize = 10_000;

/// Raw rows of the active dataset
pub fn show(ui: &mut Ui, dataset: &Dataset) {
    let rows = dataset.rows().unwrap_or_default();
    if rows.is_empty() {
        ui.label("This dataset has no parsed rows.");
        return;
    }

    let columns = columns_of(rows);
    let shown = rows.len().min(MAX_ROWS);
    if shown < rows.len() {
        ui.label(format!("Showing the first {} of {} rows", shown, rows.len()));
    }

    let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;
    let mut builder = TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .min_scrolled_height(0.0)
        .vscroll(true)
        .column(Column::initial(50.0).at_least(40.0));
    for _ in &columns {
        builder = builder.column(Column::initial(150.0).at_least(80.0).clip(true));
    }

    builder
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for column in &columns {
                header.col(|ui| {
                    ui.strong(column);
                });
            }
        })
        .body(|body| {
            body.rows(text_height, shown, |row_index, mut row| {
                row.col(|ui| {
                    ui.label(row_index.to_string());
                });
                for column in &columns {
                    row.col(|ui| {
                        ui.label(cell_text(rows[row_index].get(column.as_str())));
                    });
                }
            });
        });
}
