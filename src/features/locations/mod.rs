//! Administrative location hierarchy.
//!
//! Two branches hang off every province:
//!
//! - Province → City → Suburb
//! - Province → District → Settlement → Village, or District → Community
//!
//! Titles are resolved per request locale through [`services::TranslationIndex`].
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/locations/{kind}` | List nodes of a kind (`parentId`, `search`) |
//! | GET | `/api/locations/{kind}/{id}` | Get a node |
//! | GET | `/api/locations/nodes/{id}/children/{childKind}` | Children of a node |
//! | GET | `/api/locations/nodes/{id}/ancestors` | Province-first ancestor chain |
//! | GET | `/api/locations/nodes/{id}/translations` | Stored translations |
//! | POST | `/api/admin/locations` | Create a node |
//! | PATCH | `/api/admin/locations/{id}` | Edit title/description |
//! | DELETE | `/api/admin/locations/{id}` | Delete a subtree, detaching addresses |
//! | PUT | `/api/admin/locations/{id}/translations/{locale}` | Upsert a translation |
//! | DELETE | `/api/admin/locations/{id}/translations/{locale}` | Remove a translation |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgLocationRepository;
pub use services::{LocationService, NodeReferenceHolder, TranslationIndex};
