mod location_repository;
#[cfg(test)]
mod memory_location_repository;
mod pg_location_repository;

pub use location_repository::LocationRepository;
#[cfg(test)]
pub use memory_location_repository::{InMemoryLocationRepository, ReadPause};
pub(crate) use pg_location_repository::{delete_nodes, lock_nodes};
pub use pg_location_repository::PgLocationRepository;
