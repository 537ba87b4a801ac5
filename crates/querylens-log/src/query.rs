use std::path::{Path, PathBuf};

use querylens_types::{FilterCriteria, QueryOutcome};

use crate::error::Result;
use crate::filter::CompiledFilter;
use crate::maintenance;
use crate::parser::RecordParser;
use crate::reader::{LogReader, ReadPolicy};

/// Handle on one query log file
///
/// Holds no state between calls; every query takes a fresh snapshot.
#[derive(Clone, Debug)]
pub struct QueryLog {
    path: PathBuf,
    reader: LogReader,
    max_scan: Option<usize>,
}

impl QueryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: LogReader::default(),
            max_scan: None,
        }
    }

    /// Choose how the file is walked
    pub fn with_policy(mut self, policy: ReadPolicy) -> Self {
        self.reader = LogReader::new(policy);
        self
    }

    /// Stop scanning after this many candidate lines, matched or not
    pub fn with_max_scan(mut self, max_scan: Option<usize>) -> Self {
        self.max_scan = max_scan;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch the newest records matching `criteria`
    pub fn query(&self, criteria: &FilterCriteria) -> Result<QueryOutcome> {
        let filter = CompiledFilter::new(criteria);

        let Some(mut lines) = self.reader.read_recent(&self.path, self.max_scan)? else {
            tracing::debug!(path = %self.path.display(), "query log does not exist");
            return Ok(QueryOutcome::absent());
        };

        let mut outcome = collect_matches(lines.by_ref(), &filter, criteria.max_entries())?;
        outcome.scan_limited = lines.was_limited();

        tracing::debug!(
            path = %self.path.display(),
            policy = ?self.reader.policy(),
            matched = outcome.records.len(),
            scanned = outcome.scanned,
            malformed = outcome.malformed,
            limited = outcome.scan_limited,
            "query log scan finished"
        );

        Ok(outcome)
    }

    /// Truncate the log to zero length in place
    pub fn clear(&self) -> Result<()> {
        maintenance::clear_log(&self.path)
    }
}

/// Run the parse/filter/cap scan over newest-first candidate lines.
///
/// Stops pulling as soon as `max_entries` records are held. Malformed lines
/// are skipped and do not count toward the cap; a read error aborts the scan.
pub fn collect_matches<I>(lines: I, filter: &CompiledFilter, max_entries: usize) -> Result<QueryOutcome>
where
    I: Iterator<Item = Result<String>>,
{
    let mut outcome = QueryOutcome {
        source_exists: true,
        ..Default::default()
    };

    if max_entries == 0 {
        return Ok(outcome);
    }

    for line in lines {
        let line = line?;
        outcome.scanned += 1;

        let Some(record) = RecordParser::parse(&line) else {
            outcome.malformed += 1;
            continue;
        };

        if !filter.matches(&record) {
            continue;
        }

        outcome.records.push(record);
        if outcome.records.len() >= max_entries {
            break;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;
    use std::io::{self, Write};

    const T1: &str = "t1\tc1\texample.com\tA\tsrv1\t10\tOK";
    const T2: &str = "t2\tc2\tblocked.test\tA\tsrv1\t5\tBLOCK";

    fn write_log(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn times(outcome: &QueryOutcome) -> Vec<&str> {
        outcome.records.iter().map(|r| r.time()).collect()
    }

    fn newest_first(lines: &[&str]) -> impl Iterator<Item = Result<String>> {
        lines
            .iter()
            .rev()
            .map(|l| Ok(l.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_type_filter_returns_newest_first() {
        let log = write_log(&[T1, T2]);
        let outcome = QueryLog::new(log.path())
            .query(&FilterCriteria::new().with_query_type("A"))
            .unwrap();
        assert!(outcome.source_exists);
        assert_eq!(times(&outcome), vec!["t2", "t1"]);
    }

    #[test]
    fn test_domain_filter() {
        let log = write_log(&[T1, T2]);
        let outcome = QueryLog::new(log.path())
            .query(&FilterCriteria::new().with_domain("example"))
            .unwrap();
        assert_eq!(times(&outcome), vec!["t1"]);
        assert_eq!(outcome.records[0].domain(), "example.com");
    }

    #[test]
    fn test_oversized_domain_filter_runs() {
        let log = write_log(&[T1, T2]);
        let outcome = QueryLog::new(log.path())
            .query(&FilterCriteria::new().with_domain("é".repeat(400_000)))
            .unwrap();
        assert!(outcome.source_exists);
        assert!(outcome.is_empty());
        assert_eq!(outcome.scanned, 2);
    }

    #[test]
    fn test_cap_of_one_keeps_newest() {
        let filter = CompiledFilter::new(&FilterCriteria::new());
        let outcome = collect_matches(newest_first(&[T1, T2]), &filter, 1).unwrap();
        assert_eq!(times(&outcome), vec!["t2"]);
        assert_eq!(outcome.scanned, 1);
    }

    #[test]
    fn test_public_cap_is_clamped() {
        let lines: Vec<String> = (0..50)
            .map(|i| format!("t{i}\tc\td{i}.com\tA\ts\t1"))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let log = write_log(&refs);

        let outcome = QueryLog::new(log.path())
            .query(&FilterCriteria::new().with_max_entries(1))
            .unwrap();
        assert_eq!(outcome.len(), 10);
        assert_eq!(outcome.records[0].time(), "t49");
        assert_eq!(outcome.records[9].time(), "t40");
    }

    #[test]
    fn test_malformed_line_skipped_without_stopping() {
        let log = write_log(&[T1, "t1.5\tc\tshort\tA", T2]);
        let outcome = QueryLog::new(log.path()).query(&FilterCriteria::new()).unwrap();
        assert_eq!(times(&outcome), vec!["t2", "t1"]);
        assert_eq!(outcome.malformed, 1);
        assert_eq!(outcome.scanned, 3);
    }

    #[test]
    fn test_malformed_lines_do_not_count_toward_cap() {
        let filter = CompiledFilter::new(&FilterCriteria::new());
        let outcome = collect_matches(newest_first(&[T1, "bad", "bad", T2]), &filter, 2).unwrap();
        assert_eq!(times(&outcome), vec!["t2", "t1"]);
        assert_eq!(outcome.malformed, 2);
    }

    #[test]
    fn test_scan_stops_once_cap_reached() {
        let filter = CompiledFilter::new(&FilterCriteria::new());
        let mut pulled = 0;
        let lines = std::iter::repeat_with(|| {
            pulled += 1;
            Ok(T1.to_string())
        });
        let outcome = collect_matches(lines.take(1000), &filter, 10).unwrap();
        assert_eq!(outcome.len(), 10);
        assert_eq!(pulled, 10);
    }

    #[test]
    fn test_read_error_aborts_query() {
        let filter = CompiledFilter::new(&FilterCriteria::new());
        let lines = vec![
            Ok(T2.to_string()),
            Err(LogError::Read {
                path: "query.log".into(),
                cause: io::Error::other("disk fault"),
            }),
            Ok(T1.to_string()),
        ];
        let err = collect_matches(lines.into_iter(), &filter, 10).unwrap_err();
        assert!(err.is_access());
    }

    #[test]
    fn test_every_domain_match_contains_substring() {
        let log = write_log(&[
            "t1\tc\tExample.com\tA\ts\t1",
            "t2\tc\tfoo.net\tA\ts\t1",
            "t3\tc\tmy-EXAMPLE.org\tAAAA\ts\t1",
            "t4\tc\texam.ple\tA\ts\t1",
        ]);
        let outcome = QueryLog::new(log.path())
            .query(&FilterCriteria::new().with_domain("example"))
            .unwrap();

        assert_eq!(times(&outcome), vec!["t3", "t1"]);
        for record in &outcome.records {
            assert!(record.domain().to_lowercase().contains("example"));
        }
    }

    #[test]
    fn test_absent_source() {
        let dir = tempfile::tempdir().unwrap();
        let log = QueryLog::new(dir.path().join("query.log"));

        let outcome = log.query(&FilterCriteria::new()).unwrap();
        assert!(outcome.records.is_empty());
        assert!(!outcome.source_exists);

        log.clear().unwrap();
        assert!(!log.path().exists());
    }

    #[test]
    fn test_clear_then_query_is_empty() {
        let log = write_log(&[T1, T2]);
        let query_log = QueryLog::new(log.path());

        query_log.clear().unwrap();
        let outcome = query_log.query(&FilterCriteria::new()).unwrap();
        assert!(outcome.source_exists);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_max_scan_marks_outcome_limited() {
        let log = write_log(&[T1, T2, T1, T2]);
        let outcome = QueryLog::new(log.path())
            .with_max_scan(Some(2))
            .query(&FilterCriteria::new().with_domain("nothing-matches"))
            .unwrap();
        assert_eq!(outcome.scanned, 2);
        assert!(outcome.scan_limited);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_whole_file_policy_matches_chunked() {
        let log = write_log(&[T1, "junk", T2, T1]);
        let criteria = FilterCriteria::new();
        let chunked = QueryLog::new(log.path()).with_policy(ReadPolicy::Chunked { chunk_size: 8 });
        assert_eq!(chunked.reader.policy(), ReadPolicy::Chunked { chunk_size: 8 });
        let chunked = chunked.query(&criteria).unwrap();

        let whole = QueryLog::new(log.path()).with_policy(ReadPolicy::WholeFile);
        assert_eq!(whole.reader.policy(), ReadPolicy::WholeFile);
        let whole = whole.query(&criteria).unwrap();
        assert_eq!(chunked.records, whole.records);
        assert_eq!(chunked.malformed, whole.malformed);
    }
}
