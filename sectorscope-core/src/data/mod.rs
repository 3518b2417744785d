//! Data acquisition: providers, batch fetch, statement collection, alignment.

pub mod align;
pub mod batch;
pub mod circuit_breaker;
pub mod provider;
pub mod statements;
pub mod synthetic;
pub mod yahoo;

pub use align::{align_columns, DatedColumn};
pub use batch::{fetch_batch, FetchBatch};
pub use circuit_breaker::CircuitBreaker;
pub use provider::{
    DataError, DataProvider, DownloadProgress, FetchWindow, Interval, LogProgress, NoProgress,
    Period, PriceField,
};
pub use statements::{collect_statements, StatementBatch};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
