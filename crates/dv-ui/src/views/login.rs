use dv_core::Credentials;
use egui::Ui;

use crate::{theme, Intent, UiState};

/// Username/password form
pub fn show(ui: &mut Ui, ui_state: &mut UiState, intents: &mut Vec<Intent>) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.heading("Sign in");
        ui.add_space(20.0);

        egui::Grid::new("login_form").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
            ui.label("Username");
            ui.text_edit_singleline(&mut ui_state.login_username);
            ui.end_row();

            ui.label("Password");
            ui.add(egui::TextEdit::singleline(&mut ui_state.login_password).password(true));
            ui.end_row();
        });

        ui.add_space(12.0);
        let filled =
            !ui_state.login_username.trim().is_empty() && !ui_state.login_password.is_empty();
        let button = ui.add_enabled(
            filled && !ui_state.login_in_progress,
            egui::Button::new("Sign in"),
        );
        if button.clicked() {
            intents.push(Intent::Login(Credentials {
                username: ui_state.login_username.trim().to_string(),
                password: ui_state.login_password.clone(),
            }));
        }

        if ui_state.login_in_progress {
            ui.spinner();
        }
        if let Some(error) = &ui_state.login_error {
            ui.colored_label(theme::error_color(), error);
        }
    });
}
