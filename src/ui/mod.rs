//! Terminal User Interface components

mod app;
mod keyboard_visual;
pub mod screen;
pub mod theme;
mod widgets;

pub use app::{terminal_key, App, AppState, Dialog};
pub use keyboard_visual::KeyboardVisual;
pub use screen::{draw, hit_test, ScreenLayout, Target};
pub use theme::ThemeColors;
pub use widgets::*;
