pub mod components;
mod layout;
pub mod screens;
pub mod text;
mod theme;

pub use layout::{Layout, ScreenAreas};
pub use theme::{StatusClass, Theme};
