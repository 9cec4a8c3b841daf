use dv_core::{can_activate, Tab, ViewState};
use egui::{CentralPanel, Context, RichText, TopBottomPanel};
use tracing::debug;

use crate::{icons, theme, views, Intent, UiState};

/// Render the whole shell for one frame and collect the user's intents
pub fn show_shell(ctx: &Context, state: &ViewState, ui_state: &mut UiState) -> Vec<Intent> {
    let mut intents = Vec::new();

    TopBottomPanel::top("tab_bar").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.heading("Data Visualizer");
            ui.separator();
            tab_bar(ui, state, &mut intents);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                session_status(ui, state, &mut intents);
            });
        });
        ui.add_space(4.0);
    });

    CentralPanel::default().show(ctx, |ui| {
        status_overlay(ui, state, &mut intents);

        match (state.active_tab, &state.dataset) {
            (Tab::Upload, _) => views::upload::show(ui, ui_state, &mut intents),
            (Tab::History, current) => {
                views::history::show(ui, ui_state, current.as_ref(), &mut intents)
            }
            (Tab::Login, _) => views::login::show(ui, ui_state, &mut intents),
            (Tab::Summary, Some(dataset)) => {
                views::summary::show(ui, dataset, state.is_loading(), &mut intents)
            }
            (Tab::Table, Some(dataset)) => views::table::show(ui, dataset),
            (Tab::Charts, Some(dataset)) => views::charts::show(ui, dataset),
            (tab, None) => {
                ui.label(format!("{} needs an active dataset.", tab));
            }
        }
    });

    intents
}

fn tab_icon(tab: Tab) -> &'static str {
    match tab {
        Tab::Upload => icons::UPLOAD,
        Tab::Summary => icons::SUMMARY,
        Tab::Table => icons::TABLE,
        Tab::Charts => icons::CHART,
        Tab::History => icons::HISTORY,
        Tab::Login => icons::LOGIN,
    }
}

/// Tab buttons; ineligible tabs are disabled
fn tab_bar(ui: &mut egui::Ui, state: &ViewState, intents: &mut Vec<Intent>) {
    for tab in Tab::ALL {
        // The login tab disappears entirely once signed in.
        if tab == Tab::Login && state.is_authenticated() {
            continue;
        }

        let selected = state.active_tab == tab;
        let label =
            egui::SelectableLabel::new(selected, format!("{} {}", tab_icon(tab), tab.label()));
        let response = ui.add_enabled(can_activate(tab, state), label);
        let response = if tab.requires_dataset() {
            response.on_disabled_hover_text("Upload or open a dataset first")
        } else {
            response
        };

        if response.clicked() && !selected {
            debug!("Tab clicked: {}", tab);
            intents.push(Intent::SelectTab(tab));
        }
    }
}

fn session_status(ui: &mut egui::Ui, state: &ViewState, intents: &mut Vec<Intent>) {
    match state.user() {
        Some(user) => {
            if ui
                .add_enabled(!state.is_loading(), egui::Button::new("Log out"))
                .clicked()
            {
                intents.push(Intent::Logout);
            }
            ui.label(format!(
                "Signed in as {}",
                user.display_name().unwrap_or("unknown user")
            ));
        }
        None => {
            ui.label(RichText::new("Not signed in").color(theme::muted_color()));
        }
    }
}

/// Loading indicator and the single error banner
fn status_overlay(ui: &mut egui::Ui, state: &ViewState, intents: &mut Vec<Intent>) {
    if state.is_loading() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading...");
        });
    }

    if let Some(message) = state.error() {
        egui::Frame::none()
            .fill(theme::error_color().linear_multiply(0.2))
            .stroke(egui::Stroke::new(1.0, theme::error_color()))
            .rounding(4.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(icons::WARNING).color(theme::error_color()));
                    ui.label(message);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(icons::CLOSE).on_hover_text("Dismiss").clicked() {
                            intents.push(Intent::DismissError);
                        }
                    });
                });
            });
        ui.add_space(8.0);
    }
}
