use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::locations::models::{Locale, NodeKind};

/// One entry of the administrative hierarchy. All kinds share this record;
/// kind-specific rules live on [`NodeKind`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationNode {
    pub id: Uuid,
    pub kind: NodeKind,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocationNode {
    /// Primary title, if it carries anything besides whitespace
    pub fn primary_title(&self) -> Option<&str> {
        let title = self.title.trim();
        (!title.is_empty()).then_some(title)
    }

    /// Last-resort display title: `"<Kind> #<id>"`
    pub fn synthetic_title(&self) -> String {
        format!("{} #{}", self.kind.label(), self.id)
    }
}

/// Data for creating a new node. Translations are stored in the same write.
#[derive(Debug, Clone)]
pub struct NewLocationNode {
    pub kind: NodeKind,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub translations: Vec<(Locale, String)>,
}

/// Outcome of deleting nodes together with the references held to them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeRemoval {
    pub removed_nodes: u64,
    pub detached_addresses: u64,
}

/// Text edits applied to an existing node. Re-parenting is not supported.
#[derive(Debug, Clone, Default)]
pub struct NodeChanges {
    pub title: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
}

/// Filter for listing nodes of one kind
#[derive(Debug, Clone)]
pub struct NodeFilter {
    pub kind: NodeKind,
    pub parent_id: Option<Uuid>,
    pub search: Option<String>,
}
