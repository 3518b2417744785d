//! Domain types: series, wide tables, summaries, financial statements.

pub mod series;
pub mod statement;
pub mod summary;
pub mod table;

pub use series::{Observation, Series};
pub use statement::{
    Frequency, LineItem, Statement, StatementColumn, StatementKind, StatementTable,
};
pub use summary::{Aggregation, Panel, SummaryRow, SummarySet, UNKNOWN_LABEL};
pub use table::{TableColumn, TableVariant, WideTable};
