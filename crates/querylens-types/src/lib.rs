//! Shared types for querylens
//!
//! This crate contains the data structures passed between the query-log core
//! and the presentation layer.

use serde::Serialize;
use std::num::IntErrorKind;

// ============================================================================
// Log Records
// ============================================================================

/// Status used when a log line carries no seventh field
pub const DEFAULT_STATUS: &str = "OK";

/// Query types offered by the type selector. Records may carry any token.
pub const QUERY_TYPES: [&str; 8] = ["A", "AAAA", "CNAME", "MX", "TXT", "PTR", "SRV", "HTTPS"];

/// One resolved DNS query event, as written by the proxy.
///
/// All values are kept verbatim from the log line; nothing is reformatted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    time: String,
    client: String,
    domain: String,
    #[serde(rename = "type")]
    query_type: String,
    server: String,
    latency_ms: String,
    status: String,
}

impl LogRecord {
    pub fn new(
        time: impl Into<String>,
        client: impl Into<String>,
        domain: impl Into<String>,
        query_type: impl Into<String>,
        server: impl Into<String>,
        latency_ms: impl Into<String>,
        status: Option<String>,
    ) -> Self {
        Self {
            time: time.into(),
            client: client.into(),
            domain: domain.into(),
            query_type: query_type.into(),
            server: server.into(),
            latency_ms: latency_ms.into(),
            status: status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        }
    }

    /// Producer-formatted timestamp
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Client address or identifier
    pub fn client(&self) -> &str {
        &self.client
    }

    /// Query name
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    /// Resolver / upstream that answered
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn latency_ms(&self) -> &str {
        &self.latency_ms
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

// ============================================================================
// Filter Criteria
// ============================================================================

/// Smallest accepted entry cap
pub const MIN_ENTRIES: usize = 10;

/// Largest accepted entry cap
pub const MAX_ENTRIES: usize = 1000;

/// Entry cap used when none (or garbage) is supplied
pub const DEFAULT_ENTRIES: usize = 100;

/// Entry caps offered by the viewer
pub const ENTRY_PRESETS: [usize; 5] = [50, 100, 250, 500, 1000];

/// Operator-supplied filters and entry cap for one query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterCriteria {
    domain: Option<String>,
    query_type: Option<String>,
    client: Option<String>,
    max_entries: usize,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            domain: None,
            query_type: None,
            client: None,
            max_entries: DEFAULT_ENTRIES,
        }
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring to require in the domain
    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = non_empty(domain.into());
        self
    }

    /// Exact query type to require
    pub fn with_query_type<S: Into<String>>(mut self, query_type: S) -> Self {
        self.query_type = non_empty(query_type.into());
        self
    }

    /// Case-insensitive substring to require in the client
    pub fn with_client<S: Into<String>>(mut self, client: S) -> Self {
        self.client = non_empty(client.into());
        self
    }

    /// Set the entry cap, clamped into [MIN_ENTRIES, MAX_ENTRIES]
    pub fn with_max_entries(mut self, max_entries: i64) -> Self {
        self.max_entries = clamp_entries(max_entries);
        self
    }

    /// Set the entry cap from untrusted text input.
    ///
    /// Only the leading integer is read, so decimals are truncated. Input with
    /// no leading digits falls back to the default before clamping.
    pub fn with_max_entries_input(mut self, input: Option<&str>) -> Self {
        self.max_entries = parse_max_entries(input);
        self
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn query_type(&self) -> Option<&str> {
        self.query_type.as_deref()
    }

    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// True when no predicate is set (only the cap applies)
    pub fn is_unfiltered(&self) -> bool {
        self.domain.is_none() && self.query_type.is_none() && self.client.is_none()
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Clamp a requested entry count into the accepted range
pub fn clamp_entries(n: i64) -> usize {
    n.clamp(MIN_ENTRIES as i64, MAX_ENTRIES as i64) as usize
}

/// Coerce raw entry-count input into the accepted range
pub fn parse_max_entries(input: Option<&str>) -> usize {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_ENTRIES;
    };

    // Leading integer only: "12.5" is 12, "50abc" is 50
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return DEFAULT_ENTRIES;
    }
    let prefix = &raw[..raw.len() - unsigned.len() + digits];

    match prefix.parse::<i64>() {
        Ok(n) => clamp_entries(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => MAX_ENTRIES,
            IntErrorKind::NegOverflow => MIN_ENTRIES,
            _ => DEFAULT_ENTRIES,
        },
    }
}

// ============================================================================
// Query Results
// ============================================================================

/// Why a query came back without records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyState {
    /// The log file does not exist yet
    NoSource,
    /// The log exists but nothing matched
    NoMatches,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoSource => {
                "Query log file does not exist. Enable query logging and make some DNS queries."
            }
            Self::NoMatches => "No queries found matching the filter criteria.",
        }
    }
}

/// Result of one query against the log
#[derive(Clone, Debug, Default, Serialize)]
pub struct QueryOutcome {
    /// Matching records, newest first
    pub records: Vec<LogRecord>,

    /// Whether the log file existed when the query ran
    pub source_exists: bool,

    /// Candidate lines pulled from the log
    pub scanned: usize,

    /// Candidate lines discarded as structurally invalid
    pub malformed: usize,

    /// The candidate bound stopped the scan before the log was exhausted
    pub scan_limited: bool,
}

impl QueryOutcome {
    /// Outcome for a log file that does not exist
    pub fn absent() -> Self {
        Self::default()
    }

    /// Explains an empty result, or None when records were found
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.records.is_empty() {
            None
        } else if !self.source_exists {
            Some(EmptyState::NoSource)
        } else {
            Some(EmptyState::NoMatches)
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_clamped() {
        assert_eq!(parse_max_entries(Some("5")), 10);
        assert_eq!(parse_max_entries(Some("5000")), 1000);
        assert_eq!(parse_max_entries(Some("250")), 250);
        assert_eq!(parse_max_entries(Some("-3")), 10);
    }

    #[test]
    fn test_entries_non_numeric_uses_default() {
        assert_eq!(parse_max_entries(Some("abc")), DEFAULT_ENTRIES);
        assert_eq!(parse_max_entries(Some("")), DEFAULT_ENTRIES);
        assert_eq!(parse_max_entries(None), DEFAULT_ENTRIES);
    }

    #[test]
    fn test_entries_use_leading_integer() {
        assert_eq!(parse_max_entries(Some("12.5")), 12);
        assert_eq!(parse_max_entries(Some("250.0")), 250);
        assert_eq!(parse_max_entries(Some("50abc")), 50);
        assert_eq!(parse_max_entries(Some(" +500 ")), 500);
        assert_eq!(parse_max_entries(Some("-20.9")), MIN_ENTRIES);
        assert_eq!(parse_max_entries(Some(".5")), DEFAULT_ENTRIES);
        assert_eq!(parse_max_entries(Some("-")), DEFAULT_ENTRIES);
    }

    #[test]
    fn test_entries_overflow_saturates() {
        assert_eq!(parse_max_entries(Some("99999999999999999999999")), MAX_ENTRIES);
        assert_eq!(parse_max_entries(Some("-99999999999999999999999")), MIN_ENTRIES);
    }

    #[test]
    fn test_empty_filters_are_unset() {
        let criteria = FilterCriteria::new()
            .with_domain("")
            .with_query_type("")
            .with_client("");
        assert!(criteria.is_unfiltered());
        assert_eq!(criteria.max_entries(), DEFAULT_ENTRIES);

        let criteria = criteria.with_query_type("AAAA").with_max_entries(1);
        assert_eq!(criteria.query_type(), Some("AAAA"));
        assert_eq!(criteria.max_entries(), MIN_ENTRIES);
    }

    #[test]
    fn test_status_defaults_to_ok() {
        let record = LogRecord::new("t", "c", "d", "A", "s", "1", None);
        assert_eq!(record.status(), "OK");
    }

    #[test]
    fn test_empty_state() {
        assert_eq!(QueryOutcome::absent().empty_state(), Some(EmptyState::NoSource));

        let mut outcome = QueryOutcome {
            source_exists: true,
            ..Default::default()
        };
        assert_eq!(outcome.empty_state(), Some(EmptyState::NoMatches));

        outcome
            .records
            .push(LogRecord::new("t", "c", "d", "A", "s", "1", None));
        assert_eq!(outcome.empty_state(), None);
    }

    #[test]
    fn test_empty_state_messages_differ() {
        assert!(EmptyState::NoSource.message().starts_with("Query log file does not exist"));
        assert_eq!(
            EmptyState::NoMatches.message(),
            "No queries found matching the filter criteria."
        );
    }

    #[test]
    fn test_record_serializes_type_field() {
        let record = LogRecord::new("t1", "c1", "example.com", "A", "srv1", "10", None);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "A");
        assert_eq!(json["status"], "OK");
    }
}
