use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::addresses::models::{Address, AddressSelection, Owner};
use crate::features::locations::models::NodeRemoval;

/// Storage for address aggregates and their owner attachments.
///
/// Writes take the raw selection: the referenced nodes are read and locked,
/// the selection is validated against them and the result is stored, all in
/// one transaction. A rejected selection surfaces as
/// `AppError::AddressRejected`.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn insert(&self, selection: &AddressSelection) -> Result<Address>;

    async fn find(&self, id: Uuid) -> Result<Option<Address>>;

    /// Overwrite every field; `None` when the address does not exist
    async fn replace(&self, id: Uuid, selection: &AddressSelection) -> Result<Option<Address>>;

    /// Delete the address along with its attachments
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Delete the location nodes and clear every address reference to them in
    /// one transaction
    async fn delete_nodes(&self, node_ids: &[Uuid]) -> Result<NodeRemoval>;

    /// Point `owner` at `address_id`, replacing any previous attachment
    async fn attach(&self, owner: Owner, address_id: Uuid) -> Result<()>;

    async fn detach_owner(&self, owner: Owner) -> Result<bool>;

    async fn address_id_for(&self, owner: Owner) -> Result<Option<Uuid>>;

    /// How many owners share the address
    async fn attachment_count(&self, address_id: Uuid) -> Result<i64>;
}
