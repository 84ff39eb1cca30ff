//! Address aggregates attached to listings and users.
//!
//! A raw [`models::AddressSelection`] is checked by
//! [`services::validate_selection`] against the current hierarchy and stored
//! as a normalized [`models::AddressData`]. Deleting a location node clears
//! references instead of deleting addresses.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/addresses` | Create an address |
//! | POST | `/api/addresses/preview` | Validate and render without storing |
//! | GET | `/api/addresses/{id}` | Resolved address |
//! | PUT | `/api/addresses/{id}` | Whole replace |
//! | PATCH | `/api/addresses/{id}` | Merge and revalidate |
//! | DELETE | `/api/addresses/{id}` | Delete with attachments |
//! | GET/PUT/DELETE | `/api/owners/{ownerKind}/{ownerId}/address` | Owner's address |
//! | POST | `/api/owners/{ownerKind}/{ownerId}/address/{addressId}` | Attach an existing address |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgAddressRepository;
pub use services::AddressService;
