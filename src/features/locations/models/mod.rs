mod locale;
mod location_node;
mod node_kind;
mod translation;

pub use locale::Locale;
pub use location_node::{LocationNode, NewLocationNode, NodeChanges, NodeFilter, NodeRemoval};
pub use node_kind::NodeKind;
pub use translation::Translation;
