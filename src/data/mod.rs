/// Data layer: table types, loading, column roles and statistics.
///
/// Architecture:
/// ```text
///  .csv / .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  size check, parse, infer dtypes → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Column>, file order
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ classify  │   │  stats    │  describe, correlation, bins, KDE
///   └──────────┘   └──────────┘
/// ```

pub mod classify;
pub mod loader;
pub mod model;
pub mod stats;
