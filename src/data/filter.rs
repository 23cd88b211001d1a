use std::collections::HashSet;

use super::model::{PlayerWeekRecord, PreparedTable};

// ---------------------------------------------------------------------------
// Cascading selection: team → position → player
// ---------------------------------------------------------------------------

/// The three dropdown selections. `None` (or an empty string) means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub team: Option<String>,
    pub position: Option<String>,
    pub player: Option<String>,
}

/// A selection counts only when it is present and non-empty.
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl FilterState {
    pub fn team(&self) -> Option<&str> {
        active(&self.team)
    }

    pub fn position(&self) -> Option<&str> {
        active(&self.position)
    }

    pub fn player(&self) -> Option<&str> {
        active(&self.player)
    }

    /// Whether a record passes every active equality filter.
    pub fn matches(&self, record: &PlayerWeekRecord) -> bool {
        self.team().map_or(true, |t| record.team == t)
            && self.position().map_or(true, |p| record.position == p)
            && self.player().map_or(true, |n| record.name == n)
    }

    /// Clear downstream selections that are no longer offered after an
    /// upstream change.
    pub fn reconcile(&mut self, positions: &[String], players: &[String]) {
        if self.position().is_some_and(|p| !positions.iter().any(|o| o == p)) {
            self.position = None;
        }
        if self.player().is_some_and(|n| !players.iter().any(|o| o == n)) {
            self.player = None;
        }
    }
}

/// Distinct values in first-appearance order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Tier 1: every team in the table.
pub fn team_options(table: &PreparedTable) -> Vec<String> {
    distinct(table.records.iter().map(|r| r.team.as_str()))
}

/// Tier 2: positions fielded by `team`; empty until a team is chosen.
pub fn position_options(table: &PreparedTable, team: Option<&str>) -> Vec<String> {
    let Some(team) = team else {
        return Vec::new();
    };
    distinct(
        table
            .records
            .iter()
            .filter(|r| r.team == team)
            .map(|r| r.position.as_str()),
    )
}

/// Tier 3: players for `team` at `position`; empty until both are chosen.
pub fn player_options(
    table: &PreparedTable,
    team: Option<&str>,
    position: Option<&str>,
) -> Vec<String> {
    let (Some(team), Some(position)) = (team, position) else {
        return Vec::new();
    };
    distinct(
        table
            .records
            .iter()
            .filter(|r| r.team == team && r.position == position)
            .map(|r| r.name.as_str()),
    )
}

/// Indices of records passing all active filters.
///
/// Always evaluated against the full table, never against a previous
/// subset, so clearing an upstream selection cannot leave stale rows behind.
pub fn filtered_indices(table: &PreparedTable, filters: &FilterState) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| filters.matches(r))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// One player's line: (week, offense snaps) points in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    /// Nothing matched the filters; render a placeholder.
    NoData,
    Lines(Vec<Series>),
}

/// Snaps-over-weeks lines, one per distinct player in `indices`. Weeks
/// without a snap count leave a gap rather than a point.
pub fn snap_chart(table: &PreparedTable, indices: &[usize]) -> Chart {
    if indices.is_empty() {
        return Chart::NoData;
    }
    let mut series: Vec<Series> = Vec::new();
    for &i in indices {
        let r = &table.records[i];
        let pos = match series.iter().position(|s| s.name == r.name) {
            Some(pos) => pos,
            None => {
                series.push(Series {
                    name: r.name.clone(),
                    points: Vec::new(),
                });
                series.len() - 1
            }
        };
        if let Some(snaps) = r.offense_snaps {
            series[pos].points.push([r.week as f64, snaps as f64]);
        }
    }
    Chart::Lines(series)
}

// ---------------------------------------------------------------------------
// DashboardView – everything the UI renders for one FilterState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub team_options: Vec<String>,
    pub position_options: Vec<String>,
    pub player_options: Vec<String>,
    /// Indices into `PreparedTable::records`.
    pub rows: Vec<usize>,
    pub chart: Chart,
}

impl DashboardView {
    /// Recompute all three tiers top-down, then the table rows and chart.
    pub fn compute(table: &PreparedTable, filters: &FilterState) -> Self {
        let team_options = team_options(table);
        let position_options = position_options(table, filters.team());
        let player_options = player_options(table, filters.team(), filters.position());
        let rows = filtered_indices(table, filters);
        let chart = snap_chart(table, &rows);
        Self {
            team_options,
            position_options,
            player_options,
            rows,
            chart,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        name: &str,
        team: &str,
        position: &str,
        week: i64,
        snaps: i64,
        score: f64,
    ) -> PlayerWeekRecord {
        PlayerWeekRecord {
            player_id: format!("id-{name}"),
            name: name.to_string(),
            team: team.to_string(),
            position: position.to_string(),
            week,
            offense_snaps: Some(snaps),
            offense_pct: 50.0,
            score,
            efficiency: score / snaps as f64,
            stats: Vec::new(),
        }
    }

    pub(crate) fn table(records: Vec<PlayerWeekRecord>) -> PreparedTable {
        PreparedTable {
            records,
            ..PreparedTable::default()
        }
    }

    fn league() -> PreparedTable {
        table(vec![
            record("A", "NE", "QB", 1, 50, 20.0),
            record("A", "NE", "QB", 2, 60, 24.0),
            record("B", "NE", "WR", 1, 40, 10.0),
            record("C", "KC", "TE", 1, 55, 12.0),
            record("D", "KC", "QB", 1, 70, 30.0),
        ])
    }

    fn select(team: Option<&str>, position: Option<&str>, player: Option<&str>) -> FilterState {
        FilterState {
            team: team.map(String::from),
            position: position.map(String::from),
            player: player.map(String::from),
        }
    }

    #[test]
    fn team_options_are_distinct_in_table_order() {
        assert_eq!(team_options(&league()), vec!["NE", "KC"]);
    }

    #[test]
    fn positions_need_a_team() {
        let t = league();
        assert!(position_options(&t, None).is_empty());
        assert_eq!(position_options(&t, Some("KC")), vec!["TE", "QB"]);
        assert!(position_options(&t, Some("SF")).is_empty());
    }

    #[test]
    fn players_need_team_and_position() {
        let t = league();
        assert!(player_options(&t, Some("NE"), None).is_empty());
        assert!(player_options(&t, None, Some("QB")).is_empty());
        assert_eq!(player_options(&t, Some("NE"), Some("QB")), vec!["A"]);
        assert!(player_options(&t, Some("NE"), Some("TE")).is_empty());
    }

    #[test]
    fn empty_filters_show_everything() {
        let t = league();
        let view = DashboardView::compute(&t, &FilterState::default());
        assert_eq!(view.rows, vec![0, 1, 2, 3, 4]);
        assert!(view.position_options.is_empty());
        assert!(view.player_options.is_empty());
        let Chart::Lines(lines) = view.chart else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn empty_string_counts_as_unset() {
        let t = league();
        let rows = filtered_indices(&t, &select(Some(""), Some("QB"), None));
        assert_eq!(rows, vec![0, 1, 4]);
    }

    #[test]
    fn filtering_starts_from_full_table() {
        let t = league();
        // Player set while the upstream team is cleared: only the player filter applies.
        let rows = filtered_indices(&t, &select(None, None, Some("D")));
        assert_eq!(rows, vec![4]);
    }

    #[test]
    fn unmatched_selection_renders_no_data() {
        let t = league();
        let filters = select(Some("NE"), Some("TE"), Some("A"));
        let view = DashboardView::compute(&t, &filters);
        assert!(view.player_options.is_empty());
        assert!(view.rows.is_empty());
        assert_eq!(view.chart, Chart::NoData);
    }

    #[test]
    fn single_player_chart_and_efficiency() {
        let t = table(vec![
            record("A", "NE", "QB", 1, 50, 20.0),
            record("A", "NE", "QB", 2, 60, 24.0),
        ]);

        let mut filters = select(Some("NE"), Some("QB"), None);
        let view = DashboardView::compute(&t, &filters);
        assert_eq!(view.player_options, vec!["A"]);

        filters.player = Some("A".into());
        let view = DashboardView::compute(&t, &filters);
        assert_eq!(
            view.chart,
            Chart::Lines(vec![Series {
                name: "A".into(),
                points: vec![[1.0, 50.0], [2.0, 60.0]],
            }])
        );
        for &i in &view.rows {
            assert!((t.records[i].efficiency - 0.40).abs() < 1e-12);
        }
    }

    #[test]
    fn missing_snap_count_leaves_a_gap_in_the_line() {
        let mut gap = record("A", "NE", "QB", 2, 0, 24.0);
        gap.offense_snaps = None;
        let t = table(vec![
            record("A", "NE", "QB", 1, 50, 20.0),
            gap,
            record("A", "NE", "QB", 3, 55, 18.0),
        ]);
        let view = DashboardView::compute(&t, &select(Some("NE"), Some("QB"), Some("A")));
        assert_eq!(view.rows, vec![0, 1, 2]);
        assert_eq!(
            view.chart,
            Chart::Lines(vec![Series {
                name: "A".into(),
                points: vec![[1.0, 50.0], [3.0, 55.0]],
            }])
        );
    }

    #[test]
    fn reconcile_drops_stale_downstream_values() {
        let t = league();
        let mut filters = select(Some("KC"), Some("WR"), Some("B"));
        let positions = position_options(&t, filters.team());
        let players = player_options(&t, filters.team(), filters.position());
        filters.reconcile(&positions, &players);
        assert_eq!(filters, select(Some("KC"), None, None));
    }

    #[test]
    fn reconcile_keeps_valid_values() {
        let t = league();
        let mut filters = select(Some("KC"), Some("QB"), Some("D"));
        let positions = position_options(&t, filters.team());
        let players = player_options(&t, filters.team(), filters.position());
        filters.reconcile(&positions, &players);
        assert_eq!(filters, select(Some("KC"), Some("QB"), Some("D")));
    }
}
