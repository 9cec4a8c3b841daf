use dv_core::{Dataset, DatasetId};
use egui::{RichText, Ui};

use crate::{theme, Intent, UiState};

/// Previously uploaded datasets
pub fn show(
    ui: &mut Ui,
    ui_state: &mut UiState,
    current: Option<&Dataset>,
    intents: &mut Vec<Intent>,
) {
    ui.horizontal(|ui| {
        ui.heading("History");
        if ui
            .add_enabled(!ui_state.history_loading, egui::Button::new("Refresh"))
            .clicked()
        {
            intents.push(Intent::RefreshHistory);
        }
        if ui_state.history_loading {
            ui.spinner();
        }
    });

    ui.horizontal(|ui| {
        ui.label("Open by id:");
        ui.text_edit_singleline(&mut ui_state.history_lookup);
        let id = ui_state.history_lookup.trim();
        if ui.add_enabled(!id.is_empty(), egui::Button::new("Open")).clicked() {
            intents.push(Intent::OpenDataset(DatasetId::from(id)));
        }
    });

    if let Some(error) = &ui_state.history_error {
        ui.colored_label(theme::error_color(), error);
    }
    ui.separator();

    if ui_state.history.is_empty() {
        ui.label(
            RichText::new("No datasets listed. Press Refresh to load them.")
                .color(theme::muted_color()),
        );
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for dataset in &ui_state.history {
            let is_current = current.map(|c| c.id == dataset.id).unwrap_or(false);
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(is_current, dataset.display_name())
                    .clicked()
                    && !is_current
                {
                    intents.push(Intent::OpenDataset(dataset.id.clone()));
                }
                ui.label(RichText::new(format!("#{}", dataset.id)).color(theme::muted_color()));
            });
        }
    });
}
