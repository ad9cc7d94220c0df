//! Charts module - Chart rendering

mod canvas;
mod renderer;
mod spec;
mod theme;

pub use canvas::Canvas;
pub use renderer::ChartRenderer;
pub use spec::{ChartKind, ChartSpec};
pub use theme::Theme;
