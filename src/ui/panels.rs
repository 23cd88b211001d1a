use eframe::egui::{self, RichText, Ui};

use crate::state::{AppState, Tier};

const NONE_LABEL: &str = "(none)";

// ---------------------------------------------------------------------------
// Left side panel – cascading dropdowns
// ---------------------------------------------------------------------------

/// Render the team → position → player selectors.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let tiers = [
        (Tier::Team, "Select Team:", "team-dropdown"),
        (Tier::Position, "Select Position:", "position-dropdown"),
        (Tier::Player, "Select Player:", "player-dropdown"),
    ];

    for (tier, label, id) in tiers {
        let (current, options) = match tier {
            Tier::Team => (state.filters.team.as_deref(), &state.view.team_options),
            Tier::Position => (state.filters.position.as_deref(), &state.view.position_options),
            Tier::Player => (state.filters.player.as_deref(), &state.view.player_options),
        };

        ui.label(label);
        if let Some(value) = dropdown(ui, id, current, options) {
            log::debug!("{tier:?} selection changed to {value:?}");
            state.select(tier, value);
        }
        ui.add_space(8.0);
    }
}

/// One single-select combo box with a leading "(none)" entry.
/// Returns the new selection when the user picked a different value.
fn dropdown(
    ui: &mut Ui,
    id: &str,
    current: Option<&str>,
    options: &[String],
) -> Option<Option<String>> {
    let mut picked = None;

    egui::ComboBox::from_id_salt(id)
        .selected_text(current.unwrap_or(NONE_LABEL))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), NONE_LABEL).clicked() {
                picked = Some(None);
            }
            for option in options {
                let selected = current == Some(option.as_str());
                if ui.selectable_label(selected, option).clicked() {
                    picked = Some(Some(option.clone()));
                }
            }
        });

    picked.filter(|value: &Option<String>| value.as_deref() != current)
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title and dataset summary.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("NFL Player Performance Dashboard");
        ui.separator();

        let report = &state.table.report;
        ui.label(format!(
            "{} player-weeks loaded, {} visible",
            state.table.len(),
            state.view.rows.len()
        ))
        .on_hover_text(format!(
            "sources: {} crosswalk rows, {} snap-count rows, {} stat rows",
            report.crosswalk_rows, report.participation_rows, report.performance_rows
        ));

        if report.week_mismatches > 0 {
            ui.separator();
            ui.label(
                RichText::new(format!(
                    "{} week-mismatched join rows discarded",
                    report.week_mismatches
                ))
                .weak(),
            );
        }
    });
}
