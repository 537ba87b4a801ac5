//! Plain-text rendering for `--print`

use querylens_tui::{display_width, pad, sanitize};
use querylens_types::{LogRecord, QueryOutcome};

const HEADERS: [&str; 7] = [
    "Time", "Client", "Domain", "Type", "Server", "Latency", "Status",
];
const GAP: &str = "  ";

/// Format an outcome as an aligned table, or its empty-state message
pub fn render_table(outcome: &QueryOutcome) -> String {
    if let Some(empty) = outcome.empty_state() {
        return format!("{}\n", empty.message());
    }

    let rows: Vec<[String; 7]> = outcome.records.iter().map(row).collect();
    let mut widths = HEADERS.map(display_width);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    for cells in &rows {
        push_line(&mut out, cells, &widths);
    }
    out
}

fn row(record: &LogRecord) -> [String; 7] {
    [
        record.time(),
        record.client(),
        record.domain(),
        record.query_type(),
        record.server(),
        record.latency_ms(),
        record.status(),
    ]
    .map(sanitize)
}

fn push_line(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect::<Vec<_>>()
        .join(GAP);
    out.push_str(line.trim_end());
    out.push('\n');
}
