use eframe::egui::{self, Color32, RichText, Ui};
use graphab_distance::RegressionKind;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – fit controls
// ---------------------------------------------------------------------------

/// Render the left panel: linkset, regression kind, bounds and prediction.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Distance conversion");
    ui.separator();

    let linksets = match &state.project {
        Some(project) => project.linksets().to_vec(),
        None => {
            ui.label("No project loaded.");
            return;
        }
    };

    // ---- Linkset selector ----
    ui.strong("Linkset");
    let current = state.linkset.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("linkset")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for name in &linksets {
                if ui.selectable_label(current == *name, name).clicked() {
                    state.linkset = Some(name.clone());
                    state.prediction = None;
                }
            }
        });

    // ---- Regression kind ----
    ui.strong("Regression");
    egui::ComboBox::from_id_salt("regression_kind")
        .selected_text(state.kind.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in RegressionKind::ALL {
                if ui.selectable_label(state.kind == kind, kind.label()).clicked() {
                    state.kind = kind;
                    state.prediction = None;
                }
            }
        });
    ui.separator();

    // ---- Distance bounds ----
    ui.strong("Distance bounds");
    egui::Grid::new("bounds").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Lower");
        ui.text_edit_singleline(&mut state.lower_text);
        ui.end_row();
        ui.label("Upper");
        ui.text_edit_singleline(&mut state.upper_text);
        ui.end_row();
    });
    if ui.button("Fit").clicked() {
        state.fit();
    }
    ui.separator();

    // ---- Fitted parameters ----
    if let Some(conv) = state.current_converter() {
        let model = conv.model();
        egui::Grid::new("params").num_columns(2).show(ui, |ui: &mut Ui| {
            ui.label("Samples");
            ui.label(model.n_samples.to_string());
            ui.end_row();
            ui.label("Slope");
            ui.label(format!("{:.6}", model.slope));
            ui.end_row();
            ui.label("Intercept");
            ui.label(format!("{:.6}", model.intercept));
            ui.end_row();
            ui.label("R²");
            ui.label(format!("{:.4}", model.r_squared));
            ui.end_row();
        });
        ui.separator();
    }

    // ---- Prediction ----
    ui.strong("Predict cost");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Distance");
        let response = ui.text_edit_singleline(&mut state.distance_text);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Predict").clicked() || submitted {
            state.predict();
        }
    });
    if let Some((x, cost)) = state.prediction {
        ui.label(RichText::new(format!("{x} → {cost:.3}")).strong());
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let fitted = state.current_converter().is_some();
            if ui.add_enabled(fitted, egui::Button::new("Save plot…")).clicked() {
                save_plot_dialog(state);
                ui.close_menu();
            }
            if ui.add_enabled(fitted, egui::Button::new("Export model…")).clicked() {
                export_model_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(project) = &state.project {
            ui.label(format!(
                "{}: {} linkset(s), {} fit(s)",
                project.name(),
                project.linksets().len(),
                project.fit_count()
            ))
            .on_hover_text(project.project_file().display().to_string());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open Graphab project or links table")
        .add_filter("Supported files", &["xml", "csv", "parquet", "pq"])
        .add_filter("Graphab project", &["xml"])
        .add_filter("Links table", &["csv", "parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

fn save_plot_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save plot")
        .add_filter("PNG image", &["png"])
        .set_file_name(format!("{}.png", default_stem(state)))
        .save_file();

    if let Some(path) = file {
        state.save_plot(&path);
    }
}

fn export_model_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export fitted model")
        .add_filter("JSON", &["json"])
        .set_file_name(format!("{}.json", default_stem(state)))
        .save_file();

    if let Some(path) = file {
        state.export_model(&path);
    }
}

/// `<linkset>-<kind>`, used as the suggested export file name.
fn default_stem(state: &AppState) -> String {
    let linkset = state.linkset.as_deref().unwrap_or("linkset");
    format!("{linkset}-{}", state.kind)
}
