use eframe::egui::{Color32, Ui};
use egui_plot::{Line, MarkerShape, Plot, PlotPoints, Points};
use graphab_distance::color::SeriesColors;
use graphab_distance::RegressionKind;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Fit plot (central panel)
// ---------------------------------------------------------------------------

fn color32(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Render the samples and fitted line in the central panel.
pub fn fit_plot(ui: &mut Ui, state: &AppState) {
    let converter = match state.current_converter() {
        Some(conv) => conv,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                let hint = if state.project.is_some() {
                    "Pick a linkset and press Fit"
                } else {
                    "Open a project to fit distances  (File → Open…)"
                };
                ui.heading(hint);
            });
            return;
        }
    };

    let colors = SeriesColors::for_kind(converter.kind());
    let (x_label, y_label) = converter.axis_labels();
    let (xs, ys) = converter.samples();

    Plot::new("fit_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let samples: PlotPoints = xs.iter().zip(ys).map(|(&x, &y)| [x, y]).collect();
            plot_ui.points(
                Points::new(samples)
                    .name("links")
                    .shape(MarkerShape::Circle)
                    .radius(2.5)
                    .color(color32(colors.points)),
            );

            let line: PlotPoints = converter.fitted_line().into_iter().collect();
            plot_ui.line(
                Line::new(line)
                    .name(converter.kind().label())
                    .color(color32(colors.line))
                    .width(2.0),
            );

            // Last prediction, placed in the same (possibly log) space.
            if let Some((x, cost)) = state.prediction {
                let point = match converter.kind() {
                    RegressionKind::LogLog if x > 0.0 && cost > 0.0 => Some([x.ln(), cost.ln()]),
                    RegressionKind::LogLog => None,
                    _ => Some([x, cost]),
                };
                if let Some(p) = point {
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![p]))
                            .name("prediction")
                            .shape(MarkerShape::Diamond)
                            .radius(6.0)
                            .color(Color32::RED),
                    );
                }
            }
        });
}
