//! Query log processing for querylens
//!
//! This crate reads the proxy's tab-separated query log newest-first, parses
//! and filters records, and truncates the log on request.

pub mod config;
mod error;
mod filter;
pub mod maintenance;
mod parser;
mod query;
mod reader;

pub use config::ProxyConfig;
pub use error::{LogError, Result};
pub use filter::CompiledFilter;
pub use parser::{MIN_FIELDS, RecordParser};
pub use query::{QueryLog, collect_matches};
pub use reader::{DEFAULT_CHUNK_SIZE, LogReader, ReadPolicy, RecentLines, ReverseLineReader};

// Re-export types used in our public API
pub use querylens_types::{EmptyState, FilterCriteria, LogRecord, QueryOutcome};
