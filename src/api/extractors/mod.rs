//! Custom request extractors.

mod params;
mod validated_json;

pub use params::{AppPath, AppQuery};
pub use validated_json::ValidatedJson;
