use std::path::PathBuf;

use chrono::{DateTime, Local};

use querylens_log::CompiledFilter;
use querylens_types::{ENTRY_PRESETS, FilterCriteria, QUERY_TYPES, QueryOutcome, clamp_entries};

/// Text filters the operator can type into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
    Domain,
    Client,
}

impl InputField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Domain => "Domain",
            Self::Client => "Client",
        }
    }
}

/// UI-specific transient state
#[derive(Default)]
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Is the clear-log confirmation open?
    pub confirm_clear_visible: bool,

    /// Field currently being edited (None = not editing)
    pub editing: Option<InputField>,

    /// Text typed into the field being edited
    pub input: String,

    /// First visible row of the result table
    pub scroll: usize,

    /// Rows that fit in the table at the last render
    pub page_size: usize,
}

/// Global application state
pub struct AppState {
    /// Log file being viewed
    pub log_path: PathBuf,

    /// What the proxy config says about query logging (None = unknown)
    pub logging_enabled: Option<bool>,

    /// Query types the proxy is configured not to log
    pub ignored_types: Vec<String>,

    /// Applied domain filter text
    pub domain: String,

    /// Applied client filter text
    pub client: String,

    /// Applied query type (None = all)
    pub query_type: Option<String>,

    /// Applied entry cap
    pub max_entries: usize,

    /// Result of the newest finished query
    pub outcome: Option<QueryOutcome>,

    /// Filter matching the displayed outcome, for highlighting
    pub highlight: Option<CompiledFilter>,

    /// Error message to display (if any)
    pub error_message: Option<String>,

    /// Informational message to display (if any)
    pub notice: Option<String>,

    /// A query is running
    pub loading: bool,

    /// Generation of the newest query sent off
    pub generation: u64,

    /// When the displayed outcome was produced
    pub last_refresh: Option<DateTime<Local>>,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,
}

impl AppState {
    pub fn new(log_path: PathBuf, logging_enabled: Option<bool>, criteria: &FilterCriteria) -> Self {
        Self {
            log_path,
            logging_enabled,
            ignored_types: Vec::new(),
            domain: criteria.domain().unwrap_or_default().to_string(),
            client: criteria.client().unwrap_or_default().to_string(),
            query_type: criteria.query_type().map(str::to_string),
            max_entries: criteria.max_entries(),
            outcome: None,
            highlight: None,
            error_message: None,
            notice: None,
            loading: false,
            generation: 0,
            last_refresh: None,
            ui_state: UiState::default(),
            should_quit: false,
        }
    }

    /// Record which query types the proxy leaves out of the log
    pub fn with_ignored_types(mut self, ignored_types: Vec<String>) -> Self {
        self.ignored_types = ignored_types;
        self
    }

    /// True when the applied type is one the proxy never logs
    pub fn query_type_ignored(&self) -> bool {
        self.query_type
            .as_deref()
            .is_some_and(|t| self.ignored_types.iter().any(|i| i.eq_ignore_ascii_case(t)))
    }

    /// Criteria built from the applied filters
    pub fn criteria(&self) -> FilterCriteria {
        let criteria = FilterCriteria::new()
            .with_domain(self.domain.clone())
            .with_client(self.client.clone())
            .with_max_entries(self.max_entries as i64);
        match &self.query_type {
            Some(query_type) => criteria.with_query_type(query_type.clone()),
            None => criteria,
        }
    }

    /// Mark a new query as in flight, returning its generation and criteria
    pub fn begin_query(&mut self) -> (u64, FilterCriteria) {
        self.generation += 1;
        self.loading = true;
        (self.generation, self.criteria())
    }

    /// Apply a finished query. Answers to superseded queries are dropped.
    pub fn finish_query(
        &mut self,
        generation: u64,
        criteria: &FilterCriteria,
        result: Result<QueryOutcome, String>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        self.loading = false;
        self.last_refresh = Some(Local::now());
        match result {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                let filter = CompiledFilter::new(criteria);
                self.highlight = (!filter.is_empty()).then_some(filter);
                self.error_message = None;
            }
            Err(msg) => {
                self.outcome = None;
                self.highlight = None;
                self.error_message = Some(msg);
            }
        }
        self.clamp_scroll();
        true
    }

    /// Number of records on display
    pub fn record_count(&self) -> usize {
        self.outcome.as_ref().map_or(0, QueryOutcome::len)
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        self.notice = None;
        self.error_message = Some(msg);
    }

    /// Show an informational message
    pub fn show_notice(&mut self, msg: String) {
        self.notice = Some(msg);
    }

    /// Dismiss error and notice messages
    pub fn dismiss_error(&mut self) {
        self.error_message = None;
        self.notice = None;
    }

    // ------------------------------------------------------------------------
    // Text filter input
    // ------------------------------------------------------------------------

    /// Start editing a text filter, seeded with its applied value
    pub fn start_edit(&mut self, field: InputField) {
        self.ui_state.input = match field {
            InputField::Domain => self.domain.clone(),
            InputField::Client => self.client.clone(),
        };
        self.ui_state.editing = Some(field);
    }

    /// Add a character to the input
    pub fn input_char(&mut self, c: char) {
        if !c.is_control() {
            self.ui_state.input.push(c);
        }
    }

    /// Remove last character from the input
    pub fn input_backspace(&mut self) {
        self.ui_state.input.pop();
    }

    pub fn input_clear(&mut self) {
        self.ui_state.input.clear();
    }

    /// Commit the input to its field, as typed. Returns true if the filter changed.
    pub fn apply_input(&mut self) -> bool {
        let Some(field) = self.ui_state.editing.take() else {
            return false;
        };
        let value = std::mem::take(&mut self.ui_state.input);

        let target = match field {
            InputField::Domain => &mut self.domain,
            InputField::Client => &mut self.client,
        };
        if *target == value {
            return false;
        }
        *target = value;
        true
    }

    /// Abandon the input, keeping the applied value
    pub fn cancel_input(&mut self) {
        self.ui_state.editing = None;
        self.ui_state.input.clear();
    }

    // ------------------------------------------------------------------------
    // Selector filters
    // ------------------------------------------------------------------------

    /// Cycle to the next query type (All -> A -> ... -> HTTPS -> All)
    pub fn next_query_type(&mut self) {
        let next = match self.query_type_index() {
            None => Some(0),
            Some(i) if i + 1 < QUERY_TYPES.len() => Some(i + 1),
            Some(_) => None,
        };
        self.query_type = next.map(|i| QUERY_TYPES[i].to_string());
    }

    /// Cycle to the previous query type
    pub fn prev_query_type(&mut self) {
        let prev = match self.query_type_index() {
            None => Some(QUERY_TYPES.len() - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
        self.query_type = prev.map(|i| QUERY_TYPES[i].to_string());
    }

    /// Position of the applied type in the selector; custom types count as All
    fn query_type_index(&self) -> Option<usize> {
        let current = self.query_type.as_deref()?;
        QUERY_TYPES.iter().position(|t| *t == current)
    }

    /// Step the entry cap up to the next preset
    pub fn more_entries(&mut self) {
        let next = ENTRY_PRESETS
            .iter()
            .copied()
            .find(|n| *n > self.max_entries)
            .unwrap_or(ENTRY_PRESETS[ENTRY_PRESETS.len() - 1]);
        self.max_entries = clamp_entries(next as i64);
    }

    /// Step the entry cap down to the previous preset
    pub fn fewer_entries(&mut self) {
        let prev = ENTRY_PRESETS
            .iter()
            .rev()
            .copied()
            .find(|n| *n < self.max_entries)
            .unwrap_or(ENTRY_PRESETS[0]);
        self.max_entries = clamp_entries(prev as i64);
    }

    /// Drop every filter and restore the default cap
    pub fn reset_filters(&mut self) {
        let defaults = FilterCriteria::default();
        self.domain.clear();
        self.client.clear();
        self.query_type = None;
        self.max_entries = defaults.max_entries();
        self.cancel_input();
    }

    // ------------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------------

    fn max_scroll(&self) -> usize {
        self.record_count().saturating_sub(self.ui_state.page_size.max(1))
    }

    /// Keep the scroll position inside the result
    pub fn clamp_scroll(&mut self) {
        self.ui_state.scroll = self.ui_state.scroll.min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.ui_state.scroll = self.ui_state.scroll.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.ui_state.scroll = self.ui_state.scroll.saturating_add(n).min(self.max_scroll());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.ui_state.page_size.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.ui_state.page_size.max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.ui_state.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.ui_state.scroll = self.max_scroll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querylens_types::LogRecord;

    fn state() -> AppState {
        AppState::new(PathBuf::from("query.log"), Some(true), &FilterCriteria::default())
    }

    fn outcome(n: usize) -> QueryOutcome {
        QueryOutcome {
            records: (0..n)
                .map(|i| LogRecord::new(format!("t{i}"), "c", "example.com", "A", "s", "1", None))
                .collect(),
            source_exists: true,
            scanned: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_query_type_cycle() {
        let mut state = state();
        state.next_query_type();
        assert_eq!(state.query_type.as_deref(), Some("A"));
        state.prev_query_type();
        assert_eq!(state.query_type, None);
        state.prev_query_type();
        assert_eq!(state.query_type.as_deref(), Some("HTTPS"));
        state.next_query_type();
        assert_eq!(state.query_type, None);
    }

    #[test]
    fn test_custom_query_type_cycles_from_all() {
        let criteria = FilterCriteria::new().with_query_type("NS");
        let mut state = AppState::new(PathBuf::from("q"), None, &criteria);
        assert_eq!(state.criteria().query_type(), Some("NS"));
        state.next_query_type();
        assert_eq!(state.query_type.as_deref(), Some("A"));
    }

    #[test]
    fn test_entry_presets() {
        let mut state = state();
        assert_eq!(state.max_entries, 100);
        state.more_entries();
        assert_eq!(state.max_entries, 250);
        state.more_entries();
        state.more_entries();
        state.more_entries();
        assert_eq!(state.max_entries, 1000);

        state.max_entries = 10;
        state.fewer_entries();
        assert_eq!(state.max_entries, 50);
        state.max_entries = 120;
        state.fewer_entries();
        assert_eq!(state.max_entries, 100);
    }

    #[test]
    fn test_edit_apply_and_cancel() {
        let mut state = state();
        state.start_edit(InputField::Domain);
        for c in "google".chars() {
            state.input_char(c);
        }
        assert!(state.apply_input());
        assert_eq!(state.domain, "google");
        assert_eq!(state.criteria().domain(), Some("google"));

        state.start_edit(InputField::Domain);
        assert_eq!(state.ui_state.input, "google");
        state.input_backspace();
        state.cancel_input();
        assert_eq!(state.domain, "google");
        assert!(state.ui_state.editing.is_none());

        state.start_edit(InputField::Client);
        assert!(!state.apply_input());
    }

    #[test]
    fn test_input_applied_as_typed() {
        let mut state = state();
        state.start_edit(InputField::Client);
        for c in " 10.0.0.1 ".chars() {
            state.input_char(c);
        }
        assert!(state.apply_input());
        assert_eq!(state.client, " 10.0.0.1 ");
        assert_eq!(state.criteria().client(), Some(" 10.0.0.1 "));
        assert!(state.ui_state.input.is_empty());
    }

    #[test]
    fn test_ignored_query_type() {
        let mut state = state().with_ignored_types(vec!["AAAA".to_string(), "txt".to_string()]);
        assert!(!state.query_type_ignored());

        state.query_type = Some("A".to_string());
        assert!(!state.query_type_ignored());
        state.query_type = Some("AAAA".to_string());
        assert!(state.query_type_ignored());
        state.query_type = Some("TXT".to_string());
        assert!(state.query_type_ignored());
    }

    #[test]
    fn test_stale_results_dropped() {
        let mut state = state();
        let (first, criteria) = state.begin_query();
        let (second, _) = state.begin_query();

        assert!(!state.finish_query(first, &criteria, Ok(outcome(3))));
        assert!(state.loading);
        assert!(state.outcome.is_none());

        assert!(state.finish_query(second, &criteria, Ok(outcome(2))));
        assert!(!state.loading);
        assert_eq!(state.record_count(), 2);
        assert!(state.last_refresh.is_some());
    }

    #[test]
    fn test_highlight_only_when_filtered() {
        let mut state = state();
        let (generation, criteria) = state.begin_query();
        state.finish_query(generation, &criteria, Ok(outcome(1)));
        assert!(state.highlight.is_none());

        state.domain = "example".to_string();
        let (generation, criteria) = state.begin_query();
        state.finish_query(generation, &criteria, Ok(outcome(1)));
        let highlight = state.highlight.as_ref().unwrap();
        assert_eq!(highlight.find_matches("www.example.com"), vec![(4, 11)]);
    }

    #[test]
    fn test_failed_query_replaces_outcome() {
        let mut state = state();
        let (generation, criteria) = state.begin_query();
        state.finish_query(generation, &criteria, Ok(outcome(2)));

        let (generation, criteria) = state.begin_query();
        state.finish_query(generation, &criteria, Err("permission denied".to_string()));
        assert!(state.outcome.is_none());
        assert_eq!(state.error_message.as_deref(), Some("permission denied"));
    }

    #[test]
    fn test_scroll_clamped() {
        let mut state = state();
        state.ui_state.page_size = 10;
        let (generation, criteria) = state.begin_query();
        state.finish_query(generation, &criteria, Ok(outcome(25)));

        state.scroll_down(100);
        assert_eq!(state.ui_state.scroll, 15);
        state.page_up();
        assert_eq!(state.ui_state.scroll, 5);
        state.scroll_to_bottom();
        assert_eq!(state.ui_state.scroll, 15);

        let (generation, criteria) = state.begin_query();
        state.finish_query(generation, &criteria, Ok(outcome(4)));
        assert_eq!(state.ui_state.scroll, 0);
    }

    #[test]
    fn test_reset_filters() {
        let criteria = FilterCriteria::new()
            .with_domain("x")
            .with_client("y")
            .with_query_type("MX")
            .with_max_entries(500);
        let mut state = AppState::new(PathBuf::from("q"), None, &criteria);
        state.reset_filters();
        assert_eq!(state.criteria(), FilterCriteria::default());
    }
}
