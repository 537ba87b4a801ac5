use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};

/// Default chunk size for backwards reads (64KB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// How the reader walks the log file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Read backwards from the end in fixed-size chunks
    Chunked { chunk_size: usize },
    /// Load the whole snapshot and walk it in reverse
    WholeFile,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self::Chunked {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Opens the query log and hands out its lines newest-first
#[derive(Clone, Debug, Default)]
pub struct LogReader {
    policy: ReadPolicy,
}

impl LogReader {
    pub fn new(policy: ReadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    /// Open `path` for a newest-first scan.
    ///
    /// Returns `Ok(None)` when the file does not exist. Only bytes present at
    /// open time are visible to the returned iterator.
    pub fn read_recent(
        &self,
        path: &Path,
        max_candidates: Option<usize>,
    ) -> Result<Option<RecentLines>> {
        let read_err = |cause| LogError::Read {
            path: path.to_path_buf(),
            cause,
        };

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_err(e)),
        };

        let metadata = file.metadata().map_err(read_err)?;
        if metadata.is_dir() {
            return Err(read_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path is a directory",
            )));
        }
        let snapshot_len = metadata.len();

        let lines = match self.policy {
            ReadPolicy::Chunked { chunk_size } => {
                Lines::Chunked(ReverseLineReader::new(file, snapshot_len, chunk_size))
            }
            ReadPolicy::WholeFile => {
                let mut data = Vec::new();
                file.take(snapshot_len)
                    .read_to_end(&mut data)
                    .map_err(read_err)?;
                let lines: Vec<String> = data.split(|b| *b == b'\n').filter_map(decode_line).collect();
                Lines::Buffered(lines.into_iter().rev())
            }
        };

        Ok(Some(RecentLines {
            lines,
            path: path.to_path_buf(),
            remaining: max_candidates,
            limited: false,
        }))
    }
}

enum Lines {
    Chunked(ReverseLineReader<File>),
    Buffered(std::iter::Rev<std::vec::IntoIter<String>>),
}

impl Lines {
    fn next_line(&mut self) -> Option<io::Result<String>> {
        match self {
            Self::Chunked(reader) => reader.next(),
            Self::Buffered(lines) => lines.next().map(Ok),
        }
    }
}

/// Newest-first candidate lines from one log snapshot
pub struct RecentLines {
    lines: Lines,
    path: PathBuf,
    remaining: Option<usize>,
    limited: bool,
}

impl RecentLines {
    /// True once the candidate bound stopped the scan with lines left unread
    pub fn was_limited(&self) -> bool {
        self.limited
    }
}

impl Iterator for RecentLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            // Peek once so the caller can tell "bound hit" from "log ended"
            if !self.limited && self.lines.next_line().is_some() {
                self.limited = true;
            }
            return None;
        }

        let item = self.lines.next_line()?;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }

        Some(item.map_err(|cause| LogError::Read {
            path: self.path.clone(),
            cause,
        }))
    }
}

/// Reads lines from the end of a seekable source towards its start.
///
/// Only `len` bytes from the start of the source are considered, so data
/// appended after construction is ignored. Empty lines are skipped and a
/// trailing `\r` is removed.
pub struct ReverseLineReader<R> {
    reader: R,
    /// Offset of the first byte already loaded into `buf`
    pos: u64,
    chunk_size: usize,
    /// Loaded bytes not yet yielded: source[pos..pos + buf.len()]
    buf: Vec<u8>,
    /// Prefix of `buf` that may still contain a newline
    unsearched: usize,
    done: bool,
}

impl<R: Read + Seek> ReverseLineReader<R> {
    pub fn new(reader: R, len: u64, chunk_size: usize) -> Self {
        Self {
            reader,
            pos: len,
            chunk_size: chunk_size.max(1),
            buf: Vec::new(),
            unsearched: 0,
            done: false,
        }
    }

    /// Load the chunk preceding `pos` in front of the buffered bytes
    fn fill(&mut self) -> io::Result<()> {
        let read_len = (self.chunk_size as u64).min(self.pos) as usize;
        let start = self.pos - read_len as u64;

        self.reader.seek(SeekFrom::Start(start))?;
        let mut chunk = vec![0u8; read_len];
        self.reader.read_exact(&mut chunk)?;

        chunk.extend_from_slice(&self.buf);
        self.buf = chunk;
        self.pos = start;
        self.unsearched = read_len;
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for ReverseLineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some(idx) = self.buf[..self.unsearched].iter().rposition(|b| *b == b'\n') {
                let line = decode_line(&self.buf[idx + 1..]);
                self.buf.truncate(idx);
                self.unsearched = idx;
                match line {
                    Some(line) => return Some(Ok(line)),
                    None => continue,
                }
            }
            self.unsearched = 0;

            if self.pos == 0 {
                self.done = true;
                let line = decode_line(&self.buf);
                self.buf = Vec::new();
                return line.map(Ok);
            }

            if let Err(e) = self.fill() {
                self.done = true;
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    // Truncated underneath us; nothing older is left to read
                    tracing::debug!("log shrank during reverse read, stopping scan");
                    return None;
                }
                return Some(Err(e));
            }
        }
    }
}

/// Decode one raw line, dropping a trailing `\r`. Empty lines yield None.
fn decode_line(raw: &[u8]) -> Option<String> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs::OpenOptions;
    use std::io::{Cursor, Write};
    use std::rc::Rc;

    const SAMPLE: &str = "first\n\nsecond\r\nthird line is a fair bit longer than the rest\n\r\nfourth\nlast-no-newline";

    fn expected() -> Vec<String> {
        vec![
            "last-no-newline".to_string(),
            "fourth".to_string(),
            "third line is a fair bit longer than the rest".to_string(),
            "second".to_string(),
            "first".to_string(),
        ]
    }

    fn reverse_lines(data: &str, chunk_size: usize) -> Vec<String> {
        let cursor = Cursor::new(data.as_bytes().to_vec());
        ReverseLineReader::new(cursor, data.len() as u64, chunk_size)
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    fn write_log(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reverse_across_chunk_sizes() {
        for chunk_size in [1, 2, 3, 7, 16, DEFAULT_CHUNK_SIZE] {
            assert_eq!(reverse_lines(SAMPLE, chunk_size), expected(), "chunk size {chunk_size}");
        }
    }

    #[test]
    fn test_reverse_empty_and_blank_sources() {
        assert!(reverse_lines("", 4).is_empty());
        assert!(reverse_lines("\n\n\r\n", 4).is_empty());
    }

    #[test]
    fn test_reverse_lossy_utf8() {
        let data = b"ok\n\xff\xfebad\n".to_vec();
        let len = data.len() as u64;
        let lines: Vec<String> = ReverseLineReader::new(Cursor::new(data), len, 3)
            .map(io::Result::unwrap)
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("bad"));
        assert_eq!(lines[1], "ok");
    }

    /// Cursor wrapper recording how many bytes were read
    struct CountingReader {
        inner: Cursor<Vec<u8>>,
        read: Rc<Cell<usize>>,
    }

    impl Read for CountingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.read.set(self.read.get() + n);
            Ok(n)
        }
    }

    impl Seek for CountingReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_reverse_reads_only_what_is_pulled() {
        let data: String = (0..10_000).map(|i| format!("line {i}\n")).collect();
        let read = Rc::new(Cell::new(0));
        let reader = CountingReader {
            inner: Cursor::new(data.clone().into_bytes()),
            read: Rc::clone(&read),
        };

        let newest: Vec<String> = ReverseLineReader::new(reader, data.len() as u64, 64)
            .take(3)
            .map(io::Result::unwrap)
            .collect();

        assert_eq!(newest, vec!["line 9999", "line 9998", "line 9997"]);
        assert!(read.get() <= 64, "read {} bytes for three lines", read.get());
    }

    #[test]
    fn test_policies_agree_on_disk() {
        let log = write_log(SAMPLE);
        for policy in [
            ReadPolicy::default(),
            ReadPolicy::Chunked { chunk_size: 5 },
            ReadPolicy::WholeFile,
        ] {
            let lines: Vec<String> = LogReader::new(policy)
                .read_recent(log.path(), None)
                .unwrap()
                .unwrap()
                .map(Result::unwrap)
                .collect();
            assert_eq!(lines, expected(), "{policy:?}");
        }
    }

    #[test]
    fn test_absent_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query.log");
        for policy in [ReadPolicy::default(), ReadPolicy::WholeFile] {
            assert!(LogReader::new(policy).read_recent(&path, None).unwrap().is_none());
        }
    }

    #[test]
    fn test_directory_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogReader::default().read_recent(dir.path(), None).err().unwrap();
        assert!(err.is_access());
    }

    #[test]
    fn test_appends_after_open_are_not_seen() {
        for policy in [ReadPolicy::default(), ReadPolicy::WholeFile] {
            let log = write_log("a\nb\n");
            let lines = LogReader::new(policy).read_recent(log.path(), None).unwrap().unwrap();

            let mut writer = OpenOptions::new().append(true).open(log.path()).unwrap();
            writer.write_all(b"c\n").unwrap();

            let lines: Vec<String> = lines.map(Result::unwrap).collect();
            assert_eq!(lines, vec!["b", "a"], "{policy:?}");
        }
    }

    #[test]
    fn test_candidate_bound() {
        let log = write_log("1\n2\n3\n4\n");
        let reader = LogReader::default();

        let mut lines = reader.read_recent(log.path(), Some(2)).unwrap().unwrap();
        let pulled: Vec<String> = lines.by_ref().map(Result::unwrap).collect();
        assert_eq!(pulled, vec!["4", "3"]);
        assert!(lines.was_limited());

        let mut lines = reader.read_recent(log.path(), Some(4)).unwrap().unwrap();
        assert_eq!(lines.by_ref().count(), 4);
        assert!(!lines.was_limited());
    }
}
