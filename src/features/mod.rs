pub mod addresses;
pub mod locations;
