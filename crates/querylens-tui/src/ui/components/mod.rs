mod confirm_dialog;
mod filter_bar;
mod help_overlay;
mod status_bar;

pub use confirm_dialog::ConfirmDialog;
pub use filter_bar::FilterBar;
pub use help_overlay::HelpOverlay;
pub use status_bar::{StatusBar, input_hints, viewer_hints};
