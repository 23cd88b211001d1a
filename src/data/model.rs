use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common dtypes of the source tables.
/// Used as a `BTreeSet` / `HashSet` element downstream, so it must be `Ord` and `Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so floats can take part in ordered sets --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Shortest round-trip form: 62.5 stays "62.5", 0.4 stays "0.4".
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Integers widen, everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer view of the cell. Floats convert only when they carry no fraction
    /// (parquet writers frequently store counts as doubles).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Text view used for join keys and categorical columns. Null has no key.
    pub fn as_key(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors raised while reading typed values out of raw frames
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{source_name}: missing column `{column}`")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name}: row {row}, column `{column}`: expected {expected}, found {found:?}")]
    InvalidValue {
        source_name: String,
        row: usize,
        column: String,
        expected: &'static str,
        found: CellValue,
    },
}

// ---------------------------------------------------------------------------
// Frame – one raw source table
// ---------------------------------------------------------------------------

/// A raw tabular source: ordered column names and rows of cells.
/// Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Human-readable source label used in error messages.
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Frame {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn column_index(&self, column: &str) -> Result<usize, DataError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DataError::MissingColumn {
                source_name: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn invalid(&self, row: usize, col: usize, expected: &'static str) -> DataError {
        DataError::InvalidValue {
            source_name: self.name.clone(),
            row,
            column: self.columns[col].clone(),
            expected,
            found: self.rows[row][col].clone(),
        }
    }

    /// Optional text value: `None` for null cells.
    pub fn key_at(&self, row: usize, col: usize) -> Option<String> {
        self.rows[row][col].as_key()
    }

    /// Nullable integer: `Ok(None)` for null cells, an error for anything
    /// else that is not integral.
    pub fn int_at(&self, row: usize, col: usize) -> Result<Option<i64>, DataError> {
        match &self.rows[row][col] {
            CellValue::Null => Ok(None),
            cell => cell
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(row, col, "integer")),
        }
    }

    /// Nullable number, same contract as [`Frame::int_at`].
    pub fn float_at(&self, row: usize, col: usize) -> Result<Option<f64>, DataError> {
        match &self.rows[row][col] {
            CellValue::Null => Ok(None),
            cell => cell
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(row, col, "number")),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerWeekRecord – one row of the prepared table
// ---------------------------------------------------------------------------

/// One player in one week, after the crosswalk / participation / performance join.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerWeekRecord {
    /// Canonical player key.
    pub player_id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub week: i64,
    /// `None` when the snap-count source left the cell empty.
    pub offense_snaps: Option<i64>,
    /// Share of team offensive snaps, 0–100 with two decimals.
    pub offense_pct: f64,
    /// Weekly PPR fantasy points, `NaN` when missing.
    pub score: f64,
    /// `score / offense_snaps`; non-finite when the player had zero snaps,
    /// `NaN` when either side is missing.
    pub efficiency: f64,
    /// Retained performance columns, aligned with the `Stat` display columns.
    pub stats: Vec<CellValue>,
}

// ---------------------------------------------------------------------------
// PreparedTable – the immutable joined dataset
// ---------------------------------------------------------------------------

/// Where a display column reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    PlayerId,
    Name,
    OffenseSnaps,
    OffensePct,
    Week,
    /// Index into [`PlayerWeekRecord::stats`].
    Stat(usize),
    Efficiency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub name: String,
    pub source: ColumnSource,
}

/// Row counts observed at each stage of preparation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareReport {
    /// Raw row counts of the three sources as fetched.
    pub crosswalk_rows: usize,
    pub participation_rows: usize,
    pub performance_rows: usize,
    /// Performance rows outside the offensive positions.
    pub performance_excluded: usize,
    /// Rows produced by the crosswalk ⋈ participation join.
    pub participation_matches: usize,
    /// Rows produced by the second join, before the week filter.
    pub performance_matches: usize,
    /// Joined rows dropped because the two week columns disagree.
    pub week_mismatches: usize,
    pub kept: usize,
}

/// The fully prepared dataset. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct PreparedTable {
    /// Display columns in table order.
    pub columns: Vec<TableColumn>,
    pub records: Vec<PlayerWeekRecord>,
    pub report: PrepareReport,
}

impl PreparedTable {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Read one display cell of a record.
    pub fn cell(&self, record: &PlayerWeekRecord, source: ColumnSource) -> CellValue {
        match source {
            ColumnSource::PlayerId => CellValue::String(record.player_id.clone()),
            ColumnSource::Name => CellValue::String(record.name.clone()),
            ColumnSource::OffenseSnaps => {
                record.offense_snaps.map_or(CellValue::Null, CellValue::Integer)
            }
            ColumnSource::OffensePct => CellValue::Float(record.offense_pct),
            ColumnSource::Week => CellValue::Integer(record.week),
            ColumnSource::Stat(i) => record.stats.get(i).cloned().unwrap_or(CellValue::Null),
            ColumnSource::Efficiency => CellValue::Float(record.efficiency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_coerce_to_integers() {
        assert_eq!(CellValue::Float(42.0).as_i64(), Some(42));
        assert_eq!(CellValue::Float(42.5).as_i64(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_i64(), None);
        assert_eq!(CellValue::String("42".into()).as_i64(), None);
    }

    #[test]
    fn null_cells_have_no_key() {
        assert_eq!(CellValue::Null.as_key(), None);
        assert_eq!(CellValue::Integer(7).as_key().as_deref(), Some("7"));
        assert_eq!(CellValue::String("BradTo00".into()).as_key().as_deref(), Some("BradTo00"));
    }

    #[test]
    fn ordering_groups_by_type_then_value() {
        let mut values = vec![
            CellValue::String("b".into()),
            CellValue::Float(1.5),
            CellValue::Null,
            CellValue::Integer(3),
            CellValue::String("a".into()),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Integer(3),
                CellValue::Float(1.5),
                CellValue::String("a".into()),
                CellValue::String("b".into()),
            ]
        );
    }

    #[test]
    fn missing_column_names_the_source() {
        let frame = Frame::new("snap counts", vec!["week".into()], Vec::new());
        let err = frame.column_index("offense_snaps").unwrap_err();
        assert_eq!(err.to_string(), "snap counts: missing column `offense_snaps`");
    }

    #[test]
    fn typed_accessors_report_bad_cells() {
        let frame = Frame::new(
            "weekly",
            vec!["week".into()],
            vec![vec![CellValue::String("one".into())]],
        );
        let err = frame.int_at(0, 0).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { row: 0, expected: "integer", .. }));
    }

    #[test]
    fn null_numeric_cells_read_as_none() {
        let frame = Frame::new(
            "snap counts",
            vec!["offense_snaps".into(), "offense_pct".into()],
            vec![
                vec![CellValue::Null, CellValue::Null],
                vec![CellValue::Float(12.0), CellValue::Integer(1)],
            ],
        );
        assert_eq!(frame.int_at(0, 0).unwrap(), None);
        assert_eq!(frame.float_at(0, 1).unwrap(), None);
        assert_eq!(frame.int_at(1, 0).unwrap(), Some(12));
        assert_eq!(frame.float_at(1, 1).unwrap(), Some(1.0));
    }

    #[test]
    fn missing_snap_count_displays_empty() {
        let record = PlayerWeekRecord {
            player_id: "00-01".into(),
            name: "Mac Jones".into(),
            team: "NE".into(),
            position: "QB".into(),
            week: 1,
            offense_snaps: None,
            offense_pct: f64::NAN,
            score: 3.0,
            efficiency: f64::NAN,
            stats: Vec::new(),
        };
        let table = PreparedTable::default();
        assert_eq!(table.cell(&record, ColumnSource::OffenseSnaps), CellValue::Null);
        assert_eq!(table.cell(&record, ColumnSource::Stat(0)), CellValue::Null);
    }
}
