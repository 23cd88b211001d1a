use crate::color::ColorMap;
use crate::data::filter::{Chart, DashboardView, FilterState};
use crate::data::model::PreparedTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which tier of the cascade a selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Team,
    Position,
    Player,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Prepared dataset, read-only for the life of the process.
    pub table: PreparedTable,

    /// Current dropdown selections.
    pub filters: FilterState,

    /// Options, rows and chart derived from `filters` (recomputed on every change).
    pub view: DashboardView,

    /// Line colour per charted player.
    pub color_map: ColorMap,

    /// Zero-based table page.
    pub page: usize,

    /// Table rows per page.
    pub page_size: usize,
}

impl AppState {
    pub fn new(table: PreparedTable, page_size: usize) -> Self {
        let filters = FilterState::default();
        let view = DashboardView::compute(&table, &filters);
        let mut state = Self {
            table,
            filters,
            view,
            color_map: ColorMap::default(),
            page: 0,
            page_size: page_size.max(1),
        };
        state.rebuild_color_map();
        state
    }

    /// Change one selection and recompute everything downstream of it.
    pub fn select(&mut self, tier: Tier, value: Option<String>) {
        match tier {
            Tier::Team => self.filters.team = value,
            Tier::Position => self.filters.position = value,
            Tier::Player => self.filters.player = value,
        }
        self.refresh();
    }

    /// Recompute the view top-down from the current selections.
    ///
    /// Stale downstream selections are cleared first, so the rows shown always
    /// agree with what the dropdowns display.
    pub fn refresh(&mut self) {
        self.view = loop {
            let view = DashboardView::compute(&self.table, &self.filters);
            let before = self.filters.clone();
            self.filters
                .reconcile(&view.position_options, &view.player_options);
            if self.filters == before {
                break view;
            }
            log::debug!("Cleared stale selections: {before:?} -> {:?}", self.filters);
        };
        self.page = 0;
        self.rebuild_color_map();
    }

    fn rebuild_color_map(&mut self) {
        self.color_map = match &self.view.chart {
            Chart::Lines(series) => ColorMap::new(series.iter().map(|s| s.name.as_str())),
            Chart::NoData => ColorMap::default(),
        };
    }

    // -- Pagination --

    pub fn page_count(&self) -> usize {
        self.view.rows.len().div_ceil(self.page_size).max(1)
    }

    /// Row indices on the current page.
    pub fn page_rows(&self) -> &[usize] {
        let start = (self.page * self.page_size).min(self.view.rows.len());
        let end = (start + self.page_size).min(self.view.rows.len());
        &self.view.rows[start..end]
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }
}
