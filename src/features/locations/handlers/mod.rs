pub mod location_handler;

pub use location_handler::{
    __path_create_node, __path_delete_node, __path_delete_translation, __path_get_ancestors,
    __path_get_children, __path_get_node, __path_list_nodes, __path_list_translations,
    __path_update_node, __path_upsert_translation, create_node, delete_node, delete_translation,
    get_ancestors, get_children, get_node, list_nodes, list_translations, update_node,
    upsert_translation,
};
