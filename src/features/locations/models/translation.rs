use serde::Serialize;
use uuid::Uuid;

use crate::features::locations::models::Locale;

/// Title of a node in one locale. At most one per (node, locale).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub node_id: Uuid,
    pub locale: Locale,
    pub title: String,
}
