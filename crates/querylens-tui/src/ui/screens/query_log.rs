use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use querylens_log::CompiledFilter;
use querylens_types::LogRecord;

use crate::app::AppState;
use crate::ui::components::{
    ConfirmDialog, FilterBar, HelpOverlay, StatusBar, input_hints, viewer_hints,
};
use crate::ui::text::{display_width, pad, sanitize, truncate};
use crate::ui::{Layout, StatusClass, Theme};

const SEPARATOR: &str = " │ ";

/// Table columns as (title, widest allowed)
const COLUMNS: [(&str, usize); 7] = [
    ("Time", 21),
    ("Client", 39),
    ("Domain", usize::MAX),
    ("Type", 6),
    ("Server", 24),
    ("Latency", 8),
    ("Status", 12),
];
const DOMAIN_COLUMN: usize = 2;
const MIN_DOMAIN_WIDTH: usize = 12;

/// Query log viewer screen
pub struct QueryLogScreen;

impl QueryLogScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let show_banner = state.logging_enabled == Some(false);
        let areas = Layout::query_log(frame.area(), show_banner);

        Self::render_header(frame, areas.header, state);
        if let Some(banner) = areas.banner {
            Self::render_banner(frame, banner);
        }
        frame.render_widget(FilterBar::new(state), areas.filters);
        Self::render_records(frame, areas.table, state);
        Self::render_status_bar(frame, areas.status, state);

        if state.ui_state.confirm_clear_visible {
            ConfirmDialog::render(frame, &state.log_path);
        } else if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut spans = vec![
            Span::styled("querylens", Theme::title()),
            Span::styled(SEPARATOR, Theme::text_dim()),
            Span::styled(sanitize(&state.log_path.display().to_string()), Theme::text()),
        ];

        if let Some(at) = state.last_refresh {
            spans.push(Span::styled(SEPARATOR, Theme::text_dim()));
            spans.push(Span::styled(
                format!("⟳ {}", at.format("%H:%M:%S")),
                Theme::text_dim(),
            ));
        }
        if state.loading {
            spans.push(Span::styled(SEPARATOR, Theme::text_dim()));
            spans.push(Span::styled("loading…", Theme::text_highlight()));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_banner(frame: &mut Frame, area: Rect) {
        let banner = Paragraph::new(Line::from(Span::styled(
            "Query logging is disabled. Set [query_log] file in dnscrypt-proxy.toml to record queries.",
            Theme::warning(),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Theme::WARNING)),
        );

        frame.render_widget(banner, area);
    }

    fn render_records(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let inner_height = area.height.saturating_sub(3) as usize; // borders + column header
        let inner_width = area.width.saturating_sub(4) as usize; // borders + scrollbar
        state.ui_state.page_size = inner_height.max(1);
        state.clamp_scroll();

        let total = state.record_count();
        let title = if state.criteria().is_unfiltered() {
            format!(" Queries ({}) ", total)
        } else {
            format!(" Queries ({} matching) ", total)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(title, Theme::title()));

        let Some(outcome) = state.outcome.as_ref() else {
            let (text, style) = match &state.error_message {
                Some(err) => (sanitize(err), Theme::error()),
                None => ("Loading…".to_string(), Theme::text_dim()),
            };
            let body = Paragraph::new(Line::from(Span::styled(text, style)))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(body, area);
            return;
        };

        if let Some(empty) = outcome.empty_state() {
            let body = Paragraph::new(Line::from(Span::styled(empty.message(), Theme::text_dim())))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(body, area);
            return;
        }

        let scroll = state.ui_state.scroll;
        let visible: Vec<&LogRecord> = outcome
            .records
            .iter()
            .skip(scroll)
            .take(inner_height)
            .collect();
        let widths = column_widths(&visible, inner_width);

        let mut lines = Vec::with_capacity(visible.len() + 1);
        lines.push(header_line(&widths));
        for record in &visible {
            lines.push(record_line(record, &widths, state.highlight.as_ref()));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);

        if total > inner_height {
            let max_scroll = total.saturating_sub(inner_height);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(scroll.min(max_scroll));

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let hints = if state.ui_state.editing.is_some() {
            input_hints()
        } else {
            viewer_hints()
        };

        let (right, style) = if let Some(err) = &state.error_message {
            (format!("⚠ {}", sanitize(err)), Theme::error())
        } else if let Some(notice) = &state.notice {
            (sanitize(notice), Theme::notice())
        } else {
            (counters(state), Theme::status_bar())
        };

        frame.render_widget(
            StatusBar::new().hints(hints).right(right).right_style(style),
            area,
        );
    }
}

fn counters(state: &AppState) -> String {
    let Some(outcome) = state.outcome.as_ref() else {
        return String::new();
    };
    let mut text = format!("{} shown · {} scanned", outcome.len(), outcome.scanned);
    if outcome.malformed > 0 {
        text.push_str(&format!(" · {} malformed", outcome.malformed));
    }
    if outcome.scan_limited {
        text.push_str(" · limited");
    }
    text
}

/// Fit columns to the visible rows; the domain column takes what is left
fn column_widths(records: &[&LogRecord], available: usize) -> [usize; 7] {
    let mut widths = [0usize; 7];
    for (i, (title, max)) in COLUMNS.iter().enumerate() {
        let widest = records
            .iter()
            .map(|r| display_width(&sanitize(cell(r, i))))
            .max()
            .unwrap_or(0);
        widths[i] = widest.max(display_width(title)).min(*max);
    }

    let fixed: usize = widths
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != DOMAIN_COLUMN)
        .map(|(_, w)| w)
        .sum();
    let gaps = (COLUMNS.len() - 1) * display_width(SEPARATOR);
    widths[DOMAIN_COLUMN] = available
        .saturating_sub(fixed + gaps)
        .max(MIN_DOMAIN_WIDTH);
    widths
}

fn cell(record: &LogRecord, column: usize) -> &str {
    match column {
        0 => record.time(),
        1 => record.client(),
        2 => record.domain(),
        3 => record.query_type(),
        4 => record.server(),
        5 => record.latency_ms(),
        _ => record.status(),
    }
}

fn header_line(widths: &[usize; 7]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (title, _)) in COLUMNS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(SEPARATOR, Theme::text_dim()));
        }
        spans.push(Span::styled(pad(title, widths[i]), Theme::table_header()));
    }
    Line::from(spans)
}

fn record_line(record: &LogRecord, widths: &[usize; 7], highlight: Option<&CompiledFilter>) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(SEPARATOR, Theme::text_dim()));
        }

        let text = sanitize(cell(record, i));
        match i {
            DOMAIN_COLUMN => spans.extend(domain_spans(&text, *width, highlight)),
            3 => spans.push(Span::styled(pad(&truncate(&text, *width), *width), Theme::query_type())),
            6 => spans.push(Span::styled(
                pad(&truncate(&text, *width), *width),
                StatusClass::of(record.status()).style(),
            )),
            0 | 5 => spans.push(Span::styled(pad(&truncate(&text, *width), *width), Theme::text_dim())),
            _ => spans.push(Span::styled(pad(&truncate(&text, *width), *width), Theme::text())),
        }
    }
    Line::from(spans)
}

/// Domain cell with filter matches highlighted
fn domain_spans(domain: &str, width: usize, highlight: Option<&CompiledFilter>) -> Vec<Span<'static>> {
    let shown = truncate(domain, width);
    // Byte length of the untruncated prefix still visible
    let visible_len = if shown.len() == domain.len() {
        domain.len()
    } else {
        shown.len() - '…'.len_utf8()
    };

    let matches = highlight.map(|h| h.find_matches(domain)).unwrap_or_default();
    let mut spans = Vec::new();
    let mut last = 0;
    for (start, end) in matches {
        if start >= visible_len {
            break;
        }
        let end = end.min(visible_len);
        if start > last {
            spans.push(Span::styled(shown[last..start].to_string(), Theme::text()));
        }
        spans.push(Span::styled(shown[start..end].to_string(), Theme::domain_match()));
        last = end;
    }
    if last < shown.len() {
        spans.push(Span::styled(shown[last..].to_string(), Theme::text()));
    }

    let fill = width.saturating_sub(display_width(&shown));
    if fill > 0 {
        spans.push(Span::raw(" ".repeat(fill)));
    }
    spans
}
