/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → validated CostRecords
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ StoreCache   │  load once → Arc<RecordStore>
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  equality criteria → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  summary + grouped means
///   └──────────┘
/// ```

pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
