pub mod address_handler;

pub use address_handler::{
    __path_attach_owner_address, __path_create_address, __path_delete_address,
    __path_detach_owner_address, __path_get_address, __path_get_owner_address,
    __path_patch_address, __path_preview_address, __path_replace_address,
    __path_set_owner_address, attach_owner_address, create_address, delete_address,
    detach_owner_address, get_address, get_owner_address, patch_address, preview_address,
    replace_address, set_owner_address,
};
