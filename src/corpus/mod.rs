// Historical trajectory corpus - the pool of "possible futures" the search
// samples from. Paths are supplied by an external provider (or generated
// synthetically for simulation runs) and are immutable once pooled.

pub mod info_path;
pub mod loader;

pub use info_path::{InfoPath, PathPool, PathStep};
pub use loader::{
    build_pool, load_changes_csv, load_changes_json, load_price_series_csv, synthetic_changes,
};
