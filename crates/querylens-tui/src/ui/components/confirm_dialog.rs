use std::path::Path;

use ratatui::{
    Frame,
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::text::sanitize;
use crate::ui::{Layout, Theme};

/// Confirmation before the query log is truncated
pub struct ConfirmDialog;

impl ConfirmDialog {
    pub fn render(frame: &mut Frame, log_path: &Path) {
        let popup_area = Layout::centered(frame.area(), 60, 8);

        frame.render_widget(Clear, popup_area);

        let text = vec![
            Line::from(Span::styled("Clear all logged queries?", Theme::warning())),
            Line::from(""),
            Line::from(Span::styled(
                sanitize(&log_path.display().to_string()),
                Theme::text_dim(),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("[y]", Theme::status_bar_key()),
                Span::styled(" Clear   ", Theme::text()),
                Span::styled("[n]", Theme::status_bar_key()),
                Span::styled(" Cancel", Theme::text()),
            ]),
        ];

        let dialog = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border_focused())
                    .title(Span::styled(" Clear Log ", Theme::error())),
            );

        frame.render_widget(dialog, popup_area);
    }
}
