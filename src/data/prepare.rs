use std::collections::HashMap;

use anyhow::{Context, Result};

use super::loader::load_source;
use super::model::{
    CellValue, ColumnSource, DataError, Frame, PlayerWeekRecord, PrepareReport, PreparedTable,
    TableColumn,
};
use crate::config::DashboardConfig;

/// Weekly score the efficiency metric is derived from.
pub const SCORE_COLUMN: &str = "fantasy_points_ppr";
/// Derived `score / snaps` column.
pub const EFFICIENCY_COLUMN: &str = "fp/snap";

/// Performance columns made redundant by the join. `player_id` moves to the
/// front of the table, the stat-side `week` duplicates the snap-count week.
const DROPPED_PERFORMANCE_COLUMNS: [&str; 6] = [
    "player_id",
    "player_name",
    "player_display_name",
    "position_group",
    "headshot_url",
    "week",
];

/// Older stat releases call the team column `recent_team`, newer ones `team`.
const TEAM_COLUMNS: [&str; 2] = ["recent_team", "team"];

// ---------------------------------------------------------------------------
// Typed views of the three sources
// ---------------------------------------------------------------------------

struct CrosswalkEntry {
    legacy: String,
    canonical: String,
    name: String,
}

// Numeric fields stay nullable until a row survives the joins.
struct Participation {
    legacy: String,
    offense_snaps: Option<i64>,
    offense_pct: Option<f64>,
    week: Option<i64>,
}

struct Performance {
    canonical: String,
    team: String,
    position: String,
    week: Option<i64>,
    score: Option<f64>,
    stats: Vec<CellValue>,
}

/// Crosswalk rows missing either key can never match and are skipped.
fn crosswalk_entries(frame: &Frame) -> Result<Vec<CrosswalkEntry>, DataError> {
    let legacy_col = frame.column_index("pfr_id")?;
    let name_col = frame.column_index("name")?;
    let canonical_col = frame.column_index("gsis_id")?;

    Ok((0..frame.len())
        .filter_map(|row| {
            Some(CrosswalkEntry {
                legacy: frame.key_at(row, legacy_col)?,
                canonical: frame.key_at(row, canonical_col)?,
                name: frame.key_at(row, name_col).unwrap_or_default(),
            })
        })
        .collect())
}

fn participation_rows(frame: &Frame) -> Result<Vec<Participation>, DataError> {
    let legacy_col = frame.column_index("pfr_player_id")?;
    let snaps_col = frame.column_index("offense_snaps")?;
    let pct_col = frame.column_index("offense_pct")?;
    let week_col = frame.column_index("week")?;

    let mut rows = Vec::with_capacity(frame.len());
    for row in 0..frame.len() {
        let Some(legacy) = frame.key_at(row, legacy_col) else {
            continue;
        };
        rows.push(Participation {
            legacy,
            offense_snaps: frame.int_at(row, snaps_col)?,
            offense_pct: frame.float_at(row, pct_col)?,
            week: frame.int_at(row, week_col)?,
        });
    }
    Ok(rows)
}

/// Performance rows restricted to `positions`, plus the names of the columns
/// kept in [`Performance::stats`].
fn performance_rows(
    frame: &Frame,
    positions: &[String],
    report: &mut PrepareReport,
) -> Result<(Vec<Performance>, Vec<String>), DataError> {
    let canonical_col = frame.column_index("player_id")?;
    let position_col = frame.column_index("position")?;
    let week_col = frame.column_index("week")?;
    let score_col = frame.column_index(SCORE_COLUMN)?;
    let team_col = TEAM_COLUMNS
        .iter()
        .find_map(|c| frame.column_index(c).ok())
        .ok_or_else(|| DataError::MissingColumn {
            source_name: frame.name.clone(),
            column: TEAM_COLUMNS[0].to_string(),
        })?;

    let kept: Vec<usize> = (0..frame.columns.len())
        .filter(|&i| !DROPPED_PERFORMANCE_COLUMNS.contains(&frame.columns[i].as_str()))
        .collect();
    let stat_columns = kept.iter().map(|&i| frame.columns[i].clone()).collect();

    let mut rows = Vec::new();
    for row in 0..frame.len() {
        let position = frame.key_at(row, position_col);
        let Some(position) = position.filter(|p| positions.contains(p)) else {
            report.performance_excluded += 1;
            continue;
        };
        let Some(canonical) = frame.key_at(row, canonical_col) else {
            continue;
        };
        rows.push(Performance {
            canonical,
            team: frame.key_at(row, team_col).unwrap_or_default(),
            position,
            week: frame.int_at(row, week_col)?,
            score: frame.float_at(row, score_col)?,
            stats: kept.iter().map(|&i| frame.rows[row][i].clone()).collect(),
        });
    }
    Ok((rows, stat_columns))
}

// ---------------------------------------------------------------------------
// Join pipeline
// ---------------------------------------------------------------------------

/// Round to two decimal places.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn index_by<T>(rows: &[T], key: impl Fn(&T) -> &str) -> HashMap<&str, Vec<usize>> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        index.entry(key(row)).or_default().push(i);
    }
    index
}

/// Join crosswalk ⋈ participation ⋈ performance into the dashboard table.
///
/// Rows whose snap-count week differs from the stat week are dropped and
/// counted in [`PrepareReport::week_mismatches`]; a missing week on either
/// side never matches. Efficiency is computed without a zero-snap guard, so
/// zero-snap rows carry `inf` or `NaN`. Missing score or snap share become
/// `NaN`.
pub fn prepare(
    crosswalk: &Frame,
    participation: &Frame,
    performance: &Frame,
    positions: &[String],
) -> Result<PreparedTable, DataError> {
    let mut report = PrepareReport {
        crosswalk_rows: crosswalk.len(),
        participation_rows: participation.len(),
        performance_rows: performance.len(),
        ..PrepareReport::default()
    };

    let crosswalk = crosswalk_entries(crosswalk)?;
    let participation = participation_rows(participation)?;
    let (performance, stat_columns) = performance_rows(performance, positions, &mut report)?;

    let by_legacy = index_by(&participation, |p| p.legacy.as_str());
    let by_canonical = index_by(&performance, |p| p.canonical.as_str());

    let mut records = Vec::new();
    for entry in &crosswalk {
        let Some(snap_rows) = by_legacy.get(entry.legacy.as_str()) else {
            continue;
        };
        for &s in snap_rows {
            report.participation_matches += 1;
            let snaps = &participation[s];
            let Some(stat_rows) = by_canonical.get(entry.canonical.as_str()) else {
                continue;
            };
            for &p in stat_rows {
                report.performance_matches += 1;
                let stats = &performance[p];
                let week = match (snaps.week, stats.week) {
                    (Some(a), Some(b)) if a == b => a,
                    _ => {
                        report.week_mismatches += 1;
                        continue;
                    }
                };
                let score = stats.score.unwrap_or(f64::NAN);
                records.push(PlayerWeekRecord {
                    player_id: entry.canonical.clone(),
                    name: entry.name.clone(),
                    team: stats.team.clone(),
                    position: stats.position.clone(),
                    week,
                    offense_snaps: snaps.offense_snaps,
                    offense_pct: snaps.offense_pct.map_or(f64::NAN, |p| round2(p * 100.0)),
                    score,
                    efficiency: score / snaps.offense_snaps.map_or(f64::NAN, |s| s as f64),
                    stats: stats.stats.clone(),
                });
            }
        }
    }
    report.kept = records.len();

    Ok(PreparedTable {
        columns: table_columns(&stat_columns),
        records,
        report,
    })
}

/// Display order: identifier and name lead, then snap columns, the retained
/// stat columns in source order and finally the efficiency column.
fn table_columns(stat_columns: &[String]) -> Vec<TableColumn> {
    let fixed = [
        ("player_id", ColumnSource::PlayerId),
        ("name", ColumnSource::Name),
        ("offense_snaps", ColumnSource::OffenseSnaps),
        ("offense_pct", ColumnSource::OffensePct),
        ("week", ColumnSource::Week),
    ];
    fixed
        .into_iter()
        .map(|(name, source)| TableColumn {
            name: name.to_string(),
            source,
        })
        .chain(stat_columns.iter().enumerate().map(|(i, name)| TableColumn {
            name: name.clone(),
            source: ColumnSource::Stat(i),
        }))
        .chain(std::iter::once(TableColumn {
            name: EFFICIENCY_COLUMN.to_string(),
            source: ColumnSource::Efficiency,
        }))
        .collect()
}

/// Fetch the three configured sources and join them. Any failure aborts.
pub fn load_and_prepare(config: &DashboardConfig) -> Result<PreparedTable> {
    let crosswalk = load_source("player id crosswalk", config.crosswalk_location())?;
    let participation = load_source("snap counts", config.participation_location())?;
    let performance = load_source("weekly player stats", config.performance_location())?;

    let table = prepare(&crosswalk, &participation, &performance, &config.positions)
        .context("joining sources")?;

    let r = &table.report;
    log::info!(
        "Fetched {} crosswalk rows, {} snap-count rows, {} stat rows",
        r.crosswalk_rows,
        r.participation_rows,
        r.performance_rows
    );
    log::info!(
        "Prepared {} player-weeks ({} snap matches, {} stat matches, {} stat rows outside {:?})",
        r.kept,
        r.participation_matches,
        r.performance_matches,
        r.performance_excluded,
        config.positions
    );
    if r.week_mismatches > 0 {
        log::warn!(
            "Discarded {} joined rows whose snap-count week differs from the stat week",
            r.week_mismatches
        );
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn frame(name: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> Frame {
        Frame::new(name, columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn crosswalk() -> Frame {
        frame(
            "ids",
            &["pfr_id", "name", "gsis_id", "espn_id"],
            vec![
                vec![s("JoneMa00"), s("Mac Jones"), s("00-01"), CellValue::Integer(1)],
                vec![s("StevJa00"), s("Jarrett Stidham"), s("00-02"), CellValue::Null],
                vec![CellValue::Null, s("Nobody"), s("00-03"), CellValue::Null],
            ],
        )
    }

    fn snap_counts() -> Frame {
        let row = |id: &str, pos: &str, snaps: i64, pct: f64, week: i64| {
            vec![
                s(id),
                s(pos),
                CellValue::Integer(snaps),
                CellValue::Float(pct),
                CellValue::Integer(week),
            ]
        };
        frame(
            "snaps",
            &["pfr_player_id", "position", "offense_snaps", "offense_pct", "week"],
            vec![
                row("JoneMa00", "QB", 50, 0.8333, 1),
                row("JoneMa00", "QB", 60, 1.0, 2),
                row("StevJa00", "QB", 0, 0.0, 1),
                row("KickAa00", "K", 0, 0.0, 1),
            ],
        )
    }

    fn weekly() -> Frame {
        let row = |id: &str, pos: &str, week: i64, pts: f64| {
            vec![
                s(id),
                s("short"),
                s("Display"),
                s(pos),
                s("QB"),
                s("http://img"),
                s("NE"),
                CellValue::Integer(2023),
                CellValue::Integer(week),
                CellValue::Float(pts),
            ]
        };
        frame(
            "weekly",
            &[
                "player_id",
                "player_name",
                "player_display_name",
                "position",
                "position_group",
                "headshot_url",
                "recent_team",
                "season",
                "week",
                "fantasy_points_ppr",
            ],
            vec![
                row("00-01", "QB", 1, 20.0),
                row("00-01", "QB", 2, 24.0),
                row("00-02", "QB", 1, 1.5),
                row("00-09", "K", 1, 7.0),
            ],
        )
    }

    fn positions() -> Vec<String> {
        ["QB", "RB", "WR", "TE"].map(String::from).to_vec()
    }

    fn prepared() -> PreparedTable {
        prepare(&crosswalk(), &snap_counts(), &weekly(), &positions()).unwrap()
    }

    #[test]
    fn joins_and_keeps_only_matching_weeks() {
        let table = prepared();
        let keys: Vec<(&str, i64)> = table
            .records
            .iter()
            .map(|r| (r.name.as_str(), r.week))
            .collect();
        assert_eq!(keys, vec![("Mac Jones", 1), ("Mac Jones", 2), ("Jarrett Stidham", 1)]);
        // Mac Jones: 2 snap weeks x 2 stat weeks, half mismatched.
        assert_eq!(table.report.participation_matches, 3);
        assert_eq!(table.report.performance_matches, 5);
        assert_eq!(table.report.week_mismatches, 2);
        assert_eq!(table.report.kept, 3);
        assert_eq!(table.report.performance_excluded, 1);
    }

    #[test]
    fn report_counts_raw_source_rows() {
        let report = prepared().report;
        assert_eq!(report.crosswalk_rows, 3);
        assert_eq!(report.participation_rows, 4);
        assert_eq!(report.performance_rows, 4);
    }

    #[test]
    fn no_prepared_row_has_mismatched_weeks() {
        let table = prepared();
        let weeks = table.columns.iter().filter(|c| c.name == "week").count();
        assert_eq!(weeks, 1);
        for r in &table.records {
            let source = weekly();
            let matching = source
                .rows
                .iter()
                .filter(|row| row[0] == CellValue::String(r.player_id.clone()))
                .any(|row| row[8] == CellValue::Integer(r.week));
            assert!(matching, "{} week {} has no stat row", r.name, r.week);
        }
    }

    #[test]
    fn rescales_snap_share_to_two_decimal_percent() {
        let table = prepared();
        assert_eq!(table.records[0].offense_pct, 83.33);
        assert_eq!(table.records[1].offense_pct, 100.0);
        for r in &table.records {
            assert!((0.0..=100.0).contains(&r.offense_pct));
            assert_eq!(round2(r.offense_pct), r.offense_pct);
        }
    }

    #[test]
    fn efficiency_is_score_per_snap_without_zero_guard() {
        let table = prepared();
        assert!((table.records[0].efficiency - 0.40).abs() < 1e-12);
        assert!((table.records[1].efficiency - 0.40).abs() < 1e-12);
        let zero = &table.records[2];
        assert_eq!(zero.offense_snaps, Some(0));
        assert!(!zero.efficiency.is_finite());
    }

    #[test]
    fn column_order_leads_with_identifier_and_name() {
        let table = prepared();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "player_id",
                "name",
                "offense_snaps",
                "offense_pct",
                "week",
                "position",
                "recent_team",
                "season",
                "fantasy_points_ppr",
                "fp/snap",
            ]
        );
        let record = &table.records[0];
        assert_eq!(table.cell(record, ColumnSource::Stat(1)), s("NE"));
        assert_eq!(table.cell(record, ColumnSource::OffenseSnaps), CellValue::Integer(50));
        let week = table.columns.iter().find(|c| c.name == "week").unwrap();
        assert_eq!(week.source, ColumnSource::Week);
    }

    #[test]
    fn records_carry_stat_side_team_and_position() {
        let table = prepared();
        assert!(table.records.iter().all(|r| r.team == "NE" && r.position == "QB"));
        assert_eq!(table.records[0].player_id, "00-01");
        assert_eq!(table.records[0].score, 20.0);
    }

    #[test]
    fn team_column_falls_back_to_team() {
        let mut stats = weekly();
        stats.columns[6] = "team".into();
        let table = prepare(&crosswalk(), &snap_counts(), &stats, &positions()).unwrap();
        assert_eq!(table.records[0].team, "NE");
    }

    #[test]
    fn missing_required_column_fails() {
        let mut snaps = snap_counts();
        snaps.columns[2] = "snaps".into();
        let err = prepare(&crosswalk(), &snaps, &weekly(), &positions()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "offense_snaps"));
    }

    #[test]
    fn non_numeric_snaps_fail() {
        let mut snaps = snap_counts();
        snaps.rows[0][2] = s("lots");
        assert!(matches!(
            prepare(&crosswalk(), &snaps, &weekly(), &positions()),
            Err(DataError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unjoined_row_with_missing_snap_share_is_ignored() {
        let mut snaps = snap_counts();
        snaps.rows.push(vec![
            s("DefeNd00"),
            s("CB"),
            CellValue::Integer(0),
            CellValue::Null,
            CellValue::Integer(1),
        ]);
        let table = prepare(&crosswalk(), &snaps, &weekly(), &positions()).unwrap();
        assert_eq!(table.report.kept, 3);
        assert_eq!(table.report.participation_rows, 5);
    }

    #[test]
    fn joined_row_with_missing_score_keeps_nan_efficiency() {
        let mut stats = weekly();
        stats.rows[0][9] = CellValue::Null;
        let table = prepare(&crosswalk(), &snap_counts(), &stats, &positions()).unwrap();
        assert_eq!(table.report.kept, 3);
        let first = &table.records[0];
        assert_eq!((first.name.as_str(), first.week), ("Mac Jones", 1));
        assert!(first.score.is_nan());
        assert!(first.efficiency.is_nan());
        assert_eq!(table.cell(first, ColumnSource::Stat(3)), CellValue::Null);
    }

    #[test]
    fn missing_snap_count_and_share_become_empty_and_nan() {
        let mut snaps = snap_counts();
        snaps.rows[0][2] = CellValue::Null;
        snaps.rows[0][3] = CellValue::Null;
        let table = prepare(&crosswalk(), &snaps, &weekly(), &positions()).unwrap();
        let first = &table.records[0];
        assert_eq!(first.offense_snaps, None);
        assert!(first.offense_pct.is_nan());
        assert!(first.efficiency.is_nan());
    }

    #[test]
    fn missing_week_counts_as_mismatch() {
        let mut snaps = snap_counts();
        snaps.rows[1][4] = CellValue::Null;
        let table = prepare(&crosswalk(), &snaps, &weekly(), &positions()).unwrap();
        assert_eq!(table.report.kept, 2);
        assert_eq!(table.report.week_mismatches, 3);
        assert!(table.records.iter().all(|r| r.name != "Mac Jones" || r.week == 1));
    }
}
