use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::addresses::models::{Address, AddressData, AddressSelection, Owner};
use crate::features::addresses::repositories::AddressRepository;
use crate::features::addresses::services::validate_selection;
use crate::features::locations::models::NodeRemoval;
use crate::features::locations::repositories::{InMemoryLocationRepository, LocationRepository};

/// In-memory address store for tests, validating against a shared node store
pub struct InMemoryAddressRepository {
    locations: Arc<InMemoryLocationRepository>,
    addresses: RwLock<HashMap<Uuid, Address>>,
    attachments: RwLock<HashMap<Owner, Uuid>>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("in-memory address store lock poisoned".to_string())
}

impl InMemoryAddressRepository {
    pub fn new(locations: Arc<InMemoryLocationRepository>) -> Self {
        Self {
            locations,
            addresses: RwLock::new(HashMap::new()),
            attachments: RwLock::new(HashMap::new()),
        }
    }

    async fn validated(&self, selection: &AddressSelection) -> Result<AddressData> {
        let nodes: HashMap<Uuid, _> = self
            .locations
            .find_many(&selection.referenced_ids())
            .await?
            .into_iter()
            .map(|node| (node.id, node))
            .collect();
        validate_selection(selection, &nodes).map_err(AppError::AddressRejected)
    }

    fn detach(&self, node_ids: &[Uuid]) -> Result<u64> {
        let removed: HashSet<Uuid> = node_ids.iter().copied().collect();
        let mut addresses = self.addresses.write().map_err(poisoned)?;

        let mut detached = 0;
        for address in addresses.values_mut() {
            if address.data.references_any(&removed) {
                address.data = address.data.detached(&removed);
                address.updated_at = Utc::now();
                detached += 1;
            }
        }
        Ok(detached)
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddressRepository {
    async fn insert(&self, selection: &AddressSelection) -> Result<Address> {
        let data = self.validated(selection).await?;
        let now = Utc::now();
        let address = Address {
            id: Uuid::new_v4(),
            data,
            created_at: now,
            updated_at: now,
        };
        let mut addresses = self.addresses.write().map_err(poisoned)?;
        addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Address>> {
        let addresses = self.addresses.read().map_err(poisoned)?;
        Ok(addresses.get(&id).cloned())
    }

    async fn replace(&self, id: Uuid, selection: &AddressSelection) -> Result<Option<Address>> {
        let exists = {
            let addresses = self.addresses.read().map_err(poisoned)?;
            addresses.contains_key(&id)
        };
        if !exists {
            return Ok(None);
        }
        let data = self.validated(selection).await?;

        let mut addresses = self.addresses.write().map_err(poisoned)?;
        let Some(address) = addresses.get_mut(&id) else {
            return Ok(None);
        };
        address.data = data;
        address.updated_at = Utc::now();
        Ok(Some(address.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut addresses = self.addresses.write().map_err(poisoned)?;
        let mut attachments = self.attachments.write().map_err(poisoned)?;
        attachments.retain(|_, address_id| *address_id != id);
        Ok(addresses.remove(&id).is_some())
    }

    async fn delete_nodes(&self, node_ids: &[Uuid]) -> Result<NodeRemoval> {
        let removed_nodes = self.locations.remove_nodes(node_ids)?;
        let detached_addresses = self.detach(node_ids)?;
        Ok(NodeRemoval {
            removed_nodes,
            detached_addresses,
        })
    }

    async fn attach(&self, owner: Owner, address_id: Uuid) -> Result<()> {
        let mut attachments = self.attachments.write().map_err(poisoned)?;
        attachments.insert(owner, address_id);
        Ok(())
    }

    async fn detach_owner(&self, owner: Owner) -> Result<bool> {
        let mut attachments = self.attachments.write().map_err(poisoned)?;
        Ok(attachments.remove(&owner).is_some())
    }

    async fn address_id_for(&self, owner: Owner) -> Result<Option<Uuid>> {
        let attachments = self.attachments.read().map_err(poisoned)?;
        Ok(attachments.get(&owner).copied())
    }

    async fn attachment_count(&self, address_id: Uuid) -> Result<i64> {
        let attachments = self.attachments.read().map_err(poisoned)?;
        Ok(attachments.values().filter(|id| **id == address_id).count() as i64)
    }
}
