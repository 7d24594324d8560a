//! Data sources for bar series.
//!
//! The [`BarProvider`] trait abstracts over where bars come from (CSV
//! directory, in-memory fixtures, synthetic generation) so the runner
//! can swap implementations and tests never need files on disk.

pub mod csv_source;
pub mod memory;
pub mod provider;
pub mod synthetic;

pub use csv_source::CsvBarProvider;
pub use memory::InMemoryProvider;
pub use provider::{BarProvider, DataError};
pub use synthetic::SyntheticProvider;
