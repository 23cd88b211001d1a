use eframe::egui::{self, Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Paginated data table (central panel)
// ---------------------------------------------------------------------------

/// Render the pager and the current page of filtered rows, all columns.
pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("< Prev").clicked() {
            state.prev_page();
        }
        ui.label(format!("page {} of {}", state.page + 1, state.page_count()));
        if ui.button("Next >").clicked() {
            state.next_page();
        }
    });
    ui.separator();

    let table = &state.table;
    let rows = state.page_rows();

    if rows.is_empty() {
        ui.label("No rows match the current selection.");
        return;
    }

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        ui.push_id("data-table", |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(Layout::left_to_right(Align::Center))
                .columns(Column::auto().at_least(48.0), table.columns.len())
                .max_scroll_height(400.0)
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for column in &table.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&column.name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let record = &table.records[rows[row.index()]];
                        for column in &table.columns {
                            row.col(|ui: &mut Ui| {
                                ui.label(table.cell(record, column.source).to_string());
                            });
                        }
                    });
                });
        });
    });
}
