use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Kind tag of a node in the administrative hierarchy, matching the database enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "location_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Province,
    City,
    District,
    Suburb,
    Settlement,
    Community,
    Village,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Province,
        NodeKind::City,
        NodeKind::District,
        NodeKind::Suburb,
        NodeKind::Settlement,
        NodeKind::Community,
        NodeKind::Village,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Province => "province",
            NodeKind::City => "city",
            NodeKind::District => "district",
            NodeKind::Suburb => "suburb",
            NodeKind::Settlement => "settlement",
            NodeKind::Community => "community",
            NodeKind::Village => "village",
        }
    }

    /// Collection segment used in routes, e.g. `/api/locations/cities`
    pub fn plural(&self) -> &'static str {
        match self {
            NodeKind::Province => "provinces",
            NodeKind::City => "cities",
            NodeKind::District => "districts",
            NodeKind::Suburb => "suburbs",
            NodeKind::Settlement => "settlements",
            NodeKind::Community => "communities",
            NodeKind::Village => "villages",
        }
    }

    /// Human label used when a node has no usable title at all
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Province => "Province",
            NodeKind::City => "City",
            NodeKind::District => "District",
            NodeKind::Suburb => "Suburb",
            NodeKind::Settlement => "Settlement",
            NodeKind::Community => "Community",
            NodeKind::Village => "Village",
        }
    }

    /// The only kind a node of this kind may hang under. `None` for roots.
    pub fn parent_kind(&self) -> Option<NodeKind> {
        match self {
            NodeKind::Province => None,
            NodeKind::City | NodeKind::District => Some(NodeKind::Province),
            NodeKind::Suburb => Some(NodeKind::City),
            NodeKind::Settlement | NodeKind::Community => Some(NodeKind::District),
            NodeKind::Village => Some(NodeKind::Settlement),
        }
    }

    pub fn child_kinds(&self) -> &'static [NodeKind] {
        match self {
            NodeKind::Province => &[NodeKind::City, NodeKind::District],
            NodeKind::City => &[NodeKind::Suburb],
            NodeKind::District => &[NodeKind::Settlement, NodeKind::Community],
            NodeKind::Settlement => &[NodeKind::Village],
            NodeKind::Suburb | NodeKind::Community | NodeKind::Village => &[],
        }
    }

    pub fn accepts_child(&self, child: NodeKind) -> bool {
        child.parent_kind() == Some(*self)
    }

    /// Cities and districts are served together with their immediate children
    /// so a picker can fill the next level without another round trip.
    pub fn embeds_children(&self) -> bool {
        matches!(self, NodeKind::City | NodeKind::District)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    /// Accepts the singular or plural form, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle || kind.plural() == needle)
            .ok_or_else(|| format!("Unknown location kind '{}'", s))
    }
}
