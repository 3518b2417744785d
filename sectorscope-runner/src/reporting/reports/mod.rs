//! Report generators.

mod markdown;

pub use markdown::MarkdownReportGenerator;
