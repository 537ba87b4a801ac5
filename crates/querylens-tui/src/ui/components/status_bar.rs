use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use crate::ui::Theme;
use crate::ui::text::display_width;

/// Status bar showing keyboard shortcuts
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<String>,
    right_style: Style,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
            right_style: Theme::status_bar(),
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }

    /// Style for the right-side text, drawn over the bar background
    pub fn right_style(mut self, style: Style) -> Self {
        self.right_style = style;
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;

        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Counters win over hints when space runs out
        if let Some(right) = self.right_text {
            let right_width = display_width(&right) as u16;
            let right_x = area.x + area.width.saturating_sub(right_width + 1);
            if right_x > area.x + line_width + 2 || right_width + 2 <= area.width {
                let right_span = Span::styled(right, self.right_style);
                buf.set_span(right_x, area.y, &right_span, right_width);
            }
        }
    }
}

/// Hints for the query log viewer
pub fn viewer_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("/", "Domain"),
        ("c", "Client"),
        ("t", "Type"),
        ("+/-", "Entries"),
        ("r", "Refresh"),
        ("?", "Help"),
        ("q", "Quit"),
    ]
}

/// Hints while a filter field is being edited
pub fn input_hints() -> Vec<(&'static str, &'static str)> {
    vec![("Enter", "Apply"), ("Esc", "Cancel"), ("Ctrl+u", "Clear")]
}
