mod location_service;
mod translation_index;

pub use location_service::{LocationService, NodeReferenceHolder};
pub use translation_index::{resolve_title, TranslationIndex};
