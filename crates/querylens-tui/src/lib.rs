//! Terminal viewer for querylens
//!
//! State management, keybindings, event handling and rendering for the
//! interactive query log view.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, InputField, UiState};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{
    ConfirmDialog, FilterBar, HelpOverlay, StatusBar, input_hints, viewer_hints,
};
pub use ui::screens::QueryLogScreen;
pub use ui::text::{display_width, pad, sanitize, truncate};
pub use ui::{Layout, StatusClass, Theme};
