// Settings module
// JSON-backed application settings

#[allow(clippy::module_inception)]
pub mod settings;

pub use settings::{AppSettings, AudioSettings, ExportSettings};
