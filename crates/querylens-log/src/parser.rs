use querylens_types::LogRecord;

/// Minimum number of tab-separated fields for a line to be a record
pub const MIN_FIELDS: usize = 6;

/// Parser for the proxy's tab-separated query log format
///
/// `timestamp \t client \t domain \t type \t server \t latency [ \t status ]`
pub struct RecordParser;

impl RecordParser {
    /// Parse a raw log line into a LogRecord
    ///
    /// Returns None for lines with fewer than six fields. Values are taken
    /// verbatim; anything past the seventh field is ignored.
    pub fn parse(raw: &str) -> Option<LogRecord> {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        let fields: Vec<&str> = line.split('\t').take(MIN_FIELDS + 1).collect();
        let (&[time, client, domain, query_type, server, latency], rest) =
            fields.split_first_chunk::<MIN_FIELDS>()?;
        let status = rest.first().map(|s| s.to_string());

        Some(LogRecord::new(
            time, client, domain, query_type, server, latency, status,
        ))
    }
}
