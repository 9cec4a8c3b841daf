use dv_core::Dataset;
use egui::{RichText, Ui};
use serde_json::Value;

use super::{cell_text, columns_of, numeric_columns};
use crate::{theme, Intent};

/// Overview of the active dataset with the report download
pub fn show(ui: &mut Ui, dataset: &Dataset, loading: bool, intents: &mut Vec<Intent>) {
    ui.horizontal(|ui| {
        ui.heading(dataset.display_name());
        ui.label(RichText::new(format!("#{}", dataset.id)).color(theme::muted_color()));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(!loading, egui::Button::new("Download PDF report"))
                .clicked()
            {
                intents.push(Intent::DownloadReport);
            }
        });
    });
    ui.separator();

    let rows = dataset.rows().unwrap_or_default();
    let columns = columns_of(rows);
    let numeric = numeric_columns(rows);

    egui::Grid::new("dataset_summary").num_columns(2).striped(true).show(ui, |ui| {
        ui.label("Rows");
        ui.label(rows.len().to_string());
        ui.end_row();

        ui.label("Columns");
        ui.label(columns.join(", "));
        ui.end_row();

        ui.label("Numeric columns");
        ui.label(numeric.join(", "));
        ui.end_row();

        // Scalar metadata the backend attached to the record
        for (key, value) in &dataset.fields {
            if key == Dataset::PARSED_ROWS_FIELD || value.is_array() || value.is_object() {
                continue;
            }
            ui.label(key);
            ui.label(cell_text(Some(value)));
            ui.end_row();
        }
    });

    if let Some(Value::Object(stats)) = dataset.field("summary") {
        ui.add_space(12.0);
        ui.strong("Statistics");
        egui::Grid::new("dataset_statistics").num_columns(2).striped(true).show(ui, |ui| {
            for (key, value) in stats {
                ui.label(key);
                ui.label(cell_text(Some(value)));
                ui.end_row();
            }
        });
    }
}
