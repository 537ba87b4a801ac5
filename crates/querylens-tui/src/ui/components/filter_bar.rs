use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::{AppState, InputField};
use crate::ui::Theme;
use crate::ui::text::sanitize;

/// Current filter values, or the input line while one is being edited
pub struct FilterBar<'a> {
    state: &'a AppState,
}

impl<'a> FilterBar<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn field(label: &'a str, value: &str, active: bool) -> Vec<Span<'a>> {
        let value_style = if active {
            Theme::text_highlight()
        } else if value.is_empty() {
            Theme::text_dim()
        } else {
            Theme::text()
        };
        let shown = if value.is_empty() {
            "any".to_string()
        } else {
            sanitize(value)
        };
        vec![
            Span::styled(format!("{}: ", label), Theme::title()),
            Span::styled(shown, value_style),
            Span::raw("   "),
        ]
    }

    fn summary(&self) -> Line<'a> {
        let state = self.state;
        let editing = state.ui_state.editing;
        let mut spans = Vec::new();
        spans.extend(Self::field(
            InputField::Domain.label(),
            &state.domain,
            editing == Some(InputField::Domain),
        ));
        spans.extend(Self::field(
            InputField::Client.label(),
            &state.client,
            editing == Some(InputField::Client),
        ));
        let mut type_field = Self::field("Type", state.query_type.as_deref().unwrap_or(""), false);
        if state.query_type_ignored() {
            type_field.insert(2, Span::styled(" (not logged)", Theme::warning()));
        }
        spans.extend(type_field);
        spans.extend(Self::field("Entries", &state.max_entries.to_string(), false));
        Line::from(spans)
    }

    fn input(&self, field: InputField) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{}: ", field.label()), Theme::text_highlight()),
            Span::styled(sanitize(&self.state.ui_state.input), Theme::text()),
            Span::styled("█", Theme::text_highlight()),
        ])
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (line, border) = match self.state.ui_state.editing {
            Some(field) => (self.input(field), Theme::border_focused()),
            None => (self.summary(), Theme::border()),
        };

        Paragraph::new(line)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(Span::styled(" Filters ", Theme::title())),
            )
            .render(area, buf);
    }
}
