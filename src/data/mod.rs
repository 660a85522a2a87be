/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, categorical value index
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────┐
///   │ filter / aggregate   │  pure queries → borrowed record views, sums
///   └─────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  record view → CSV
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
