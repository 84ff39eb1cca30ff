mod address_repository;
#[cfg(test)]
mod memory_address_repository;
mod pg_address_repository;

pub use address_repository::AddressRepository;
#[cfg(test)]
pub use memory_address_repository::InMemoryAddressRepository;
pub use pg_address_repository::PgAddressRepository;
