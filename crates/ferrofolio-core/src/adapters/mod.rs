//! Provider adapters.

mod snapshot;
mod yahoo;

pub use snapshot::SnapshotProvider;
pub use yahoo::YahooAdapter;
