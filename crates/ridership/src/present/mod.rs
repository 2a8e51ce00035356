//! Presentation adapter: turns metric summaries into chart payloads, map
//! layers, CSV exports and narrative text. No drawing happens here.

pub mod charts;
pub mod dashboard;
pub mod export;
pub mod format;
pub mod map;
pub mod narrative;
pub mod theme;

pub use dashboard::{Report, Session, Tab};
pub use export::Export;
pub use theme::{Theme, ThemePalette};
