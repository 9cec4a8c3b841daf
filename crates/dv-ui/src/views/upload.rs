use std::path::PathBuf;

use egui::{RichText, Ui};

use crate::{theme, Intent, UiState};

/// CSV upload form
pub fn show(ui: &mut Ui, ui_state: &mut UiState, intents: &mut Vec<Intent>) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.heading("Upload a CSV file");
        ui.label(RichText::new("The file is parsed by the server and becomes the active dataset.")
            .color(theme::muted_color()));
        ui.add_space(20.0);
    });

    ui.horizontal(|ui| {
        ui.label("File:");
        ui.add(egui::TextEdit::singleline(&mut ui_state.upload_path).desired_width(400.0));

        if ui.button("Browse...").clicked() {
            intents.push(Intent::BrowseForUpload);
        }

        let path = ui_state.upload_path.trim();
        let can_upload = !path.is_empty() && !ui_state.upload_in_progress;
        if ui.add_enabled(can_upload, egui::Button::new("Upload")).clicked() {
            intents.push(Intent::Upload(PathBuf::from(path)));
        }

        if ui_state.upload_in_progress {
            ui.spinner();
        }
    });

    if let Some(error) = &ui_state.upload_error {
        ui.colored_label(theme::error_color(), error);
    }
}
