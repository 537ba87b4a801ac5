use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application
pub struct Theme;

impl Theme {
    // Base colors
    pub const BG: Color = Color::Reset;
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Accent colors
    pub const PRIMARY: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::Yellow;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const DANGER: Color = Color::Red;

    // Border styles
    pub fn border() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::HIGHLIGHT)
    }

    // Text styles
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn text_highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    // Table
    pub fn table_header() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn query_type() -> Style {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    }

    pub fn domain_match() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    // Status bar
    pub fn status_bar() -> Style {
        Style::default().fg(Self::FG_DIM).bg(Color::DarkGray)
    }

    pub fn status_bar_key() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    // Messages
    pub fn error() -> Style {
        Style::default()
            .fg(Self::DANGER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warning() -> Style {
        Style::default()
            .fg(Self::WARNING)
            .add_modifier(Modifier::BOLD)
    }

    pub fn notice() -> Style {
        Style::default().fg(Self::SUCCESS)
    }
}

/// Display class of a record's status token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Danger,
    Neutral,
}

impl StatusClass {
    /// Classify a status: `OK` or anything containing `PASS` is success,
    /// anything containing `BLOCK` or `REJECT` is danger (case-insensitive).
    pub fn of(status: &str) -> Self {
        let upper = status.to_ascii_uppercase();
        if status == "OK" || upper.contains("PASS") {
            Self::Success
        } else if upper.contains("BLOCK") || upper.contains("REJECT") {
            Self::Danger
        } else {
            Self::Neutral
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Self::Success => Style::default().fg(Theme::SUCCESS),
            Self::Danger => Style::default()
                .fg(Theme::DANGER)
                .add_modifier(Modifier::BOLD),
            Self::Neutral => Theme::text(),
        }
    }
}
