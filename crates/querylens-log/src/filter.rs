use regex::{Regex, RegexBuilder};

use querylens_types::{FilterCriteria, LogRecord};

/// Case-insensitive literal substring matcher
#[derive(Clone)]
enum Substring {
    Pattern(Regex),
    /// Lowercased needle, used when the literal is too large for a regex
    Plain(String),
}

impl Substring {
    fn new(text: &str) -> Self {
        match RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => Self::Pattern(re),
            Err(e) => {
                tracing::debug!(error = %e, "filter text too large for a regex, matching as plain text");
                Self::Plain(text.to_lowercase())
            }
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(text),
            Self::Plain(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }

    fn find_iter(&self, text: &str) -> Vec<(usize, usize)> {
        match self {
            Self::Pattern(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
            Self::Plain(needle) => {
                let lower = text.to_lowercase();
                // Offsets only carry over when lowercasing kept every byte in place
                if lower.len() != text.len() {
                    return Vec::new();
                }
                lower
                    .match_indices(needle.as_str())
                    .map(|(start, m)| (start, start + m.len()))
                    .filter(|(start, end)| text.is_char_boundary(*start) && text.is_char_boundary(*end))
                    .collect()
            }
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Pattern(re) => re.as_str(),
            Self::Plain(needle) => needle,
        }
    }
}

/// Compiled filter for log records
#[derive(Clone)]
pub struct CompiledFilter {
    /// Domain substring, case-insensitive (if any)
    domain: Option<Substring>,

    /// Exact query type (if any)
    query_type: Option<String>,

    /// Client substring, case-insensitive (if any)
    client: Option<Substring>,
}

impl CompiledFilter {
    /// Compile the predicates of `criteria`
    ///
    /// Filter text is matched literally; regex syntax in it has no effect.
    pub fn new(criteria: &FilterCriteria) -> Self {
        Self {
            domain: criteria.domain().map(Substring::new),
            query_type: criteria.query_type().map(str::to_string),
            client: criteria.client().map(Substring::new),
        }
    }

    /// Check if a record satisfies every set predicate
    pub fn matches(&self, record: &LogRecord) -> bool {
        if let Some(domain) = &self.domain {
            if !domain.is_match(record.domain()) {
                return false;
            }
        }

        if let Some(query_type) = &self.query_type {
            if record.query_type() != query_type {
                return false;
            }
        }

        if let Some(client) = &self.client {
            if !client.is_match(record.client()) {
                return false;
            }
        }

        true
    }

    /// Find domain-filter match positions in a string (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.domain {
            Some(domain) => domain.find_iter(text),
            None => Vec::new(),
        }
    }

    /// Check if filter is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.query_type.is_none() && self.client.is_none()
    }
}

impl std::fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("domain", &self.domain.as_ref().map(Substring::as_str))
            .field("query_type", &self.query_type)
            .field("client", &self.client.as_ref().map(Substring::as_str))
            .finish()
    }
}
