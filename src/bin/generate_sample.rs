//! Writes a small, deterministic copy of the three dashboard sources to
//! `sample_data/` so the dashboard can run without network access.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const OUTPUT_DIR: &str = "sample_data";
const SEASON: i32 = 2023;
const WEEKS: i32 = 17;
const TEAM_SNAPS: f64 = 65.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

struct SamplePlayer {
    name: &'static str,
    pfr_id: &'static str,
    gsis_id: &'static str,
    team: &'static str,
    position: &'static str,
    /// Typical share of team snaps.
    usage: f64,
}

const PLAYERS: &[SamplePlayer] = &[
    SamplePlayer { name: "Mac Jones", pfr_id: "JoneMa05", gsis_id: "00-0036972", team: "NE", position: "QB", usage: 0.95 },
    SamplePlayer { name: "Rhamondre Stevenson", pfr_id: "StevRh00", gsis_id: "00-0036880", team: "NE", position: "RB", usage: 0.60 },
    SamplePlayer { name: "Ezekiel Elliott", pfr_id: "ElliEz00", gsis_id: "00-0033045", team: "NE", position: "RB", usage: 0.40 },
    SamplePlayer { name: "Kendrick Bourne", pfr_id: "BourKe00", gsis_id: "00-0033307", team: "NE", position: "WR", usage: 0.75 },
    SamplePlayer { name: "Hunter Henry", pfr_id: "HenrHu00", gsis_id: "00-0032392", team: "NE", position: "TE", usage: 0.70 },
    SamplePlayer { name: "Patrick Mahomes", pfr_id: "MahoPa00", gsis_id: "00-0033873", team: "KC", position: "QB", usage: 0.98 },
    SamplePlayer { name: "Isiah Pacheco", pfr_id: "PachIs00", gsis_id: "00-0037197", team: "KC", position: "RB", usage: 0.55 },
    SamplePlayer { name: "Rashee Rice", pfr_id: "RiceRa00", gsis_id: "00-0039067", team: "KC", position: "WR", usage: 0.65 },
    SamplePlayer { name: "Travis Kelce", pfr_id: "KelcTr00", gsis_id: "00-0030506", team: "KC", position: "TE", usage: 0.85 },
    SamplePlayer { name: "Josh Allen", pfr_id: "AlleJo02", gsis_id: "00-0034857", team: "BUF", position: "QB", usage: 0.99 },
    SamplePlayer { name: "James Cook", pfr_id: "CookJa01", gsis_id: "00-0037248", team: "BUF", position: "RB", usage: 0.58 },
    SamplePlayer { name: "Stefon Diggs", pfr_id: "DiggSt00", gsis_id: "00-0031588", team: "BUF", position: "WR", usage: 0.90 },
    SamplePlayer { name: "Dalton Kincaid", pfr_id: "KincDa00", gsis_id: "00-0038541", team: "BUF", position: "TE", usage: 0.62 },
];

/// Kicker rows exist in the stat source only; the dashboard filters them out.
const KICKER: SamplePlayer = SamplePlayer {
    name: "Harrison Butker",
    pfr_id: "ButkHa00",
    gsis_id: "00-0033303",
    team: "KC",
    position: "K",
    usage: 0.0,
};

fn opponent(team: &str) -> &'static str {
    match team {
        "NE" => "NYJ",
        "KC" => "DEN",
        _ => "MIA",
    }
}

fn string_array(values: Vec<String>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

fn write_parquet(path: &Path, schema: Arc<Schema>, columns: Vec<ArrayRef>) -> Result<()> {
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .with_context(|| format!("building record batch for {}", path.display()))?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_crosswalk(dir: &Path) -> Result<()> {
    let path = dir.join("db_playerids.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["name", "gsis_id", "pfr_id", "espn_id"])?;
    for (i, p) in PLAYERS.iter().chain(std::iter::once(&KICKER)).enumerate() {
        let espn_id = (3_000_000 + i).to_string();
        writer.write_record([p.name, p.gsis_id, p.pfr_id, espn_id.as_str()])?;
    }
    // Crosswalk rows without a legacy key never join.
    writer.write_record(["Practice Squad Player", "00-0039999", "NA", "NA"])?;
    writer.flush()?;
    Ok(())
}

/// Per-player weekly snaps and stats shared by both parquet files.
struct Week {
    player: usize,
    week: i32,
    snaps: f64,
    passing_yards: f64,
    rushing_yards: f64,
    receptions: i32,
    receiving_yards: f64,
}

fn simulate(rng: &mut SimpleRng) -> Vec<Week> {
    let mut weeks = Vec::new();
    for (player, p) in PLAYERS.iter().enumerate() {
        // Every player sits out one bye week.
        let bye = 5 + (player as i32 % 8);
        for week in (1..=WEEKS).filter(|&w| w != bye) {
            // A few players are listed for week 3 but never take the field.
            let snaps = if player % 4 == 1 && week == 3 {
                0.0
            } else {
                (TEAM_SNAPS * (p.usage * rng.range(0.8, 1.1)).min(1.0)).round()
            };
            let involvement = snaps / TEAM_SNAPS;
            let (passing_yards, rushing_yards, receptions, receiving_yards) = match p.position {
                "QB" => (rng.range(150.0, 350.0).round(), rng.range(0.0, 40.0).round(), 0, 0.0),
                "RB" => (
                    0.0,
                    (rng.range(20.0, 110.0) * involvement).round(),
                    (rng.range(0.0, 6.0) * involvement).round() as i32,
                    (rng.range(0.0, 50.0) * involvement).round(),
                ),
                _ => (
                    0.0,
                    0.0,
                    (rng.range(1.0, 10.0) * involvement).round() as i32,
                    (rng.range(10.0, 120.0) * involvement).round(),
                ),
            };
            weeks.push(Week {
                player,
                week,
                snaps,
                passing_yards,
                rushing_yards,
                receptions,
                receiving_yards,
            });
        }
    }
    weeks
}

fn write_snap_counts(dir: &Path, weeks: &[Week]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("game_id", DataType::Utf8, false),
        Field::new("season", DataType::Int32, false),
        Field::new("week", DataType::Int32, false),
        Field::new("player", DataType::Utf8, false),
        Field::new("pfr_player_id", DataType::Utf8, false),
        Field::new("position", DataType::Utf8, false),
        Field::new("team", DataType::Utf8, false),
        Field::new("opponent", DataType::Utf8, false),
        Field::new("offense_snaps", DataType::Float64, false),
        Field::new("offense_pct", DataType::Float64, false),
    ]));

    let player = |w: &Week| &PLAYERS[w.player];
    let columns: Vec<ArrayRef> = vec![
        string_array(
            weeks
                .iter()
                .map(|w| format!("{SEASON}_{:02}_{}_{}", w.week, player(w).team, opponent(player(w).team)))
                .collect(),
        ),
        Arc::new(Int32Array::from(vec![SEASON; weeks.len()])),
        Arc::new(Int32Array::from(weeks.iter().map(|w| w.week).collect::<Vec<_>>())),
        string_array(weeks.iter().map(|w| player(w).name.to_string()).collect()),
        string_array(weeks.iter().map(|w| player(w).pfr_id.to_string()).collect()),
        string_array(weeks.iter().map(|w| player(w).position.to_string()).collect()),
        string_array(weeks.iter().map(|w| player(w).team.to_string()).collect()),
        string_array(weeks.iter().map(|w| opponent(player(w).team).to_string()).collect()),
        Arc::new(Float64Array::from(weeks.iter().map(|w| w.snaps).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(
            weeks
                .iter()
                .map(|w| ((w.snaps / TEAM_SNAPS) * 100.0).round() / 100.0)
                .collect::<Vec<_>>(),
        )),
    ];

    write_parquet(&dir.join(format!("snap_counts_{SEASON}.parquet")), schema, columns)
}

fn write_player_stats(dir: &Path, weeks: &[Week], rng: &mut SimpleRng) -> Result<()> {
    struct StatRow<'a> {
        p: &'a SamplePlayer,
        week: i32,
        passing_yards: f64,
        rushing_yards: f64,
        receptions: i32,
        receiving_yards: f64,
    }

    let mut rows: Vec<StatRow<'_>> = weeks
        .iter()
        .map(|w| StatRow {
            p: &PLAYERS[w.player],
            week: w.week,
            passing_yards: w.passing_yards,
            rushing_yards: w.rushing_yards,
            receptions: w.receptions,
            receiving_yards: w.receiving_yards,
        })
        .collect();
    for week in 1..=WEEKS {
        rows.push(StatRow {
            p: &KICKER,
            week,
            passing_yards: 0.0,
            rushing_yards: 0.0,
            receptions: 0,
            receiving_yards: rng.range(0.0, 0.5).round(),
        });
    }

    let standard = |r: &StatRow<'_>| {
        r.passing_yards * 0.04 + r.rushing_yards * 0.1 + r.receiving_yards * 0.1
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("player_id", DataType::Utf8, false),
        Field::new("player_name", DataType::Utf8, false),
        Field::new("player_display_name", DataType::Utf8, false),
        Field::new("position", DataType::Utf8, false),
        Field::new("position_group", DataType::Utf8, false),
        Field::new("headshot_url", DataType::Utf8, true),
        Field::new("recent_team", DataType::Utf8, false),
        Field::new("season", DataType::Int32, false),
        Field::new("week", DataType::Int32, false),
        Field::new("season_type", DataType::Utf8, false),
        Field::new("opponent_team", DataType::Utf8, false),
        Field::new("passing_yards", DataType::Float64, false),
        Field::new("rushing_yards", DataType::Float64, false),
        Field::new("receptions", DataType::Int32, false),
        Field::new("receiving_yards", DataType::Float64, false),
        Field::new("fantasy_points", DataType::Float64, false),
        Field::new("fantasy_points_ppr", DataType::Float64, false),
    ]));

    let short_name = |name: &str| {
        let mut parts = name.splitn(2, ' ');
        let first = parts.next().unwrap_or_default();
        let last = parts.next().unwrap_or_default();
        format!("{}.{last}", first.chars().next().unwrap_or('?'))
    };

    let columns: Vec<ArrayRef> = vec![
        string_array(rows.iter().map(|r| r.p.gsis_id.to_string()).collect()),
        string_array(rows.iter().map(|r| short_name(r.p.name)).collect()),
        string_array(rows.iter().map(|r| r.p.name.to_string()).collect()),
        string_array(rows.iter().map(|r| r.p.position.to_string()).collect()),
        string_array(
            rows.iter()
                .map(|r| (if r.p.position == "K" { "SPEC" } else { r.p.position }).to_string())
                .collect(),
        ),
        Arc::new(StringArray::from(vec![None::<&str>; rows.len()])),
        string_array(rows.iter().map(|r| r.p.team.to_string()).collect()),
        Arc::new(Int32Array::from(vec![SEASON; rows.len()])),
        Arc::new(Int32Array::from(rows.iter().map(|r| r.week).collect::<Vec<_>>())),
        string_array(vec!["REG".to_string(); rows.len()]),
        string_array(rows.iter().map(|r| opponent(r.p.team).to_string()).collect()),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.passing_yards).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.rushing_yards).collect::<Vec<_>>())),
        Arc::new(Int32Array::from(rows.iter().map(|r| r.receptions).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.receiving_yards).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| standard(r)).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(
            rows.iter()
                .map(|r| standard(r) + r.receptions as f64)
                .collect::<Vec<_>>(),
        )),
    ];

    write_parquet(&dir.join(format!("player_stats_{SEASON}.parquet")), schema, columns)
}

fn write_config(dir: &Path) -> Result<()> {
    let config = format!(
        "# Copy next to the binary as snap_scope.toml to use the sample sources.\n\
         page_size = 10\n\
         positions = [\"QB\", \"RB\", \"WR\", \"TE\"]\n\
         \n\
         [sources]\n\
         crosswalk = \"{OUTPUT_DIR}/db_playerids.csv\"\n\
         participation = \"{OUTPUT_DIR}/snap_counts_{SEASON}.parquet\"\n\
         performance = \"{OUTPUT_DIR}/player_stats_{SEASON}.parquet\"\n"
    );
    let path = dir.join("snap_scope.toml");
    std::fs::write(&path, config).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(dir).with_context(|| format!("creating {OUTPUT_DIR}/"))?;

    let mut rng = SimpleRng::new(42);
    let weeks = simulate(&mut rng);

    write_crosswalk(dir)?;
    write_snap_counts(dir, &weeks)?;
    write_player_stats(dir, &weeks, &mut rng)?;
    write_config(dir)?;

    println!(
        "Wrote {} players x {WEEKS} weeks ({} snap rows) to {OUTPUT_DIR}/",
        PLAYERS.len(),
        weeks.len()
    );
    println!("Use it with: cp {OUTPUT_DIR}/snap_scope.toml . && cargo run");
    Ok(())
}
