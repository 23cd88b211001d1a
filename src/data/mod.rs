/// Data layer: source loading, the join pipeline and the cascading filter.
///
/// Architecture:
/// ```text
///  ids .csv   snap counts .parquet   weekly stats .parquet
///      │               │                      │
///      └───────────────┼──────────────────────┘
///                      ▼
///                ┌──────────┐
///                │  loader   │  URL / path → Frame
///                └──────────┘
///                      │
///                      ▼
///                ┌──────────┐
///                │ prepare   │  join, week filter, rescale → PreparedTable
///                └──────────┘
///                      │
///                      ▼
///                ┌──────────┐
///                │  filter   │  team → position → player → DashboardView
///                └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod prepare;
