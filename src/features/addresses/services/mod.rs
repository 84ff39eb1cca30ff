mod address_formatter;
// Mirrors the client-side picker; the server only needs the validator
#[allow(dead_code)]
mod address_selector;
mod address_service;
mod address_validator;

pub use address_formatter::{
    persisted_placeholder, unspecified_placeholder, AddressFormatter, FormattedAddress,
};
#[allow(unused_imports)]
pub use address_selector::{AddressSelector, SelectorError, SelectorState};
pub use address_service::AddressService;
pub use address_validator::validate_selection;
