use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::addresses::dtos::{AddressPreviewDto, AddressResponseDto};
use crate::features::addresses::models::{Address, AddressPatch, AddressSelection, Owner};
use crate::features::addresses::repositories::AddressRepository;
use crate::features::addresses::services::{
    persisted_placeholder, unspecified_placeholder, validate_selection, AddressFormatter,
};
use crate::features::locations::models::{LocationNode, NodeRemoval};
use crate::features::locations::repositories::LocationRepository;
use crate::features::locations::services::{NodeReferenceHolder, TranslationIndex};

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Service for address aggregates: validate, persist, attach, render
pub struct AddressService {
    repo: Arc<dyn AddressRepository>,
    nodes: Arc<dyn LocationRepository>,
    titles: Arc<TranslationIndex>,
}

impl AddressService {
    pub fn new(
        repo: Arc<dyn AddressRepository>,
        nodes: Arc<dyn LocationRepository>,
        titles: Arc<TranslationIndex>,
    ) -> Self {
        Self {
            repo,
            nodes,
            titles,
        }
    }

    async fn snapshot(&self, ids: Vec<Uuid>) -> Result<Vec<LocationNode>> {
        self.nodes.find_many(&dedup(ids)).await
    }

    async fn find_address(&self, id: Uuid) -> Result<Address> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Address '{}' not found", id)))
    }

    async fn resolve(&self, address: Address, locale: &str) -> Result<AddressResponseDto> {
        let nodes = self.snapshot(address.data.referenced_ids()).await?;
        let titles = self.titles.titles(&nodes, locale).await?;
        let formatted = AddressFormatter::new(&titles).format(
            &address.data.to_selection(),
            &persisted_placeholder(address.id),
        );
        Ok(AddressResponseDto::new(address, &titles, formatted))
    }

    pub async fn create(
        &self,
        selection: AddressSelection,
        locale: &str,
    ) -> Result<AddressResponseDto> {
        let address = self.repo.insert(&selection).await?;

        tracing::info!("Created address {}", address.id);
        self.resolve(address, locale).await
    }

    /// Validate and render a selection without storing anything
    pub async fn preview(
        &self,
        selection: AddressSelection,
        locale: &str,
    ) -> Result<AddressPreviewDto> {
        let nodes = self.snapshot(selection.referenced_ids()).await?;
        let titles = self.titles.titles(&nodes, locale).await?;
        let by_id: HashMap<Uuid, LocationNode> = nodes.into_iter().map(|n| (n.id, n)).collect();

        let violations = validate_selection(&selection, &by_id)
            .err()
            .unwrap_or_default();
        let placeholder = unspecified_placeholder(self.titles.effective_locale(locale));
        let formatted = AddressFormatter::new(&titles).format(&selection, placeholder);

        Ok(AddressPreviewDto {
            accepted: violations.is_empty(),
            full: formatted.full,
            short: formatted.short,
            violations,
        })
    }

    pub async fn get(&self, id: Uuid, locale: &str) -> Result<AddressResponseDto> {
        let address = self.find_address(id).await?;
        self.resolve(address, locale).await
    }

    /// Whole-object replace with full validation
    pub async fn replace(
        &self,
        id: Uuid,
        selection: AddressSelection,
        locale: &str,
    ) -> Result<AddressResponseDto> {
        let address = self
            .repo
            .replace(id, &selection)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Address '{}' not found", id)))?;

        tracing::info!("Replaced address {}", id);
        self.resolve(address, locale).await
    }

    /// Merge onto the stored selection, then validate the result as a whole
    pub async fn patch(
        &self,
        id: Uuid,
        patch: AddressPatch,
        locale: &str,
    ) -> Result<AddressResponseDto> {
        let current = self.find_address(id).await?;
        let merged = current.data.to_selection().merged(&patch);
        let address = self
            .repo
            .replace(id, &merged)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Address '{}' not found", id)))?;

        tracing::info!("Patched address {}", id);
        self.resolve(address, locale).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Address '{}' not found", id)));
        }
        tracing::info!("Deleted address {}", id);
        Ok(())
    }

    // ==================== Owners ====================

    pub async fn owner_address(&self, owner: Owner, locale: &str) -> Result<AddressResponseDto> {
        let address_id = self
            .repo
            .address_id_for(owner)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No address attached to {}", owner)))?;
        self.get(address_id, locale).await
    }

    /// Set the owner's address. An address held only by this owner is
    /// updated in place; a shared one is left alone and a new one is created.
    pub async fn set_owner_address(
        &self,
        owner: Owner,
        selection: AddressSelection,
        locale: &str,
    ) -> Result<AddressResponseDto> {
        let in_place = match self.repo.address_id_for(owner).await? {
            Some(current) if self.repo.attachment_count(current).await? <= 1 => {
                self.repo.replace(current, &selection).await?
            }
            _ => None,
        };

        let address = match in_place {
            Some(address) => {
                tracing::info!("Updated address {} of {}", address.id, owner);
                address
            }
            None => {
                let address = self.repo.insert(&selection).await?;
                self.repo.attach(owner, address.id).await?;
                tracing::info!("Attached new address {} to {}", address.id, owner);
                address
            }
        };

        self.resolve(address, locale).await
    }

    /// Attach an already stored address to the owner
    pub async fn attach_existing(
        &self,
        owner: Owner,
        address_id: Uuid,
        locale: &str,
    ) -> Result<AddressResponseDto> {
        let address = self.find_address(address_id).await?;
        self.repo.attach(owner, address_id).await?;

        tracing::info!("Attached address {} to {}", address_id, owner);
        self.resolve(address, locale).await
    }

    pub async fn detach_owner(&self, owner: Owner) -> Result<()> {
        if !self.repo.detach_owner(owner).await? {
            return Err(AppError::NotFound(format!(
                "No address attached to {}",
                owner
            )));
        }
        tracing::info!("Detached address from {}", owner);
        Ok(())
    }
}

#[async_trait]
impl NodeReferenceHolder for AddressService {
    async fn delete_nodes(&self, node_ids: &[Uuid]) -> Result<NodeRemoval> {
        let removal = self.repo.delete_nodes(node_ids).await?;
        if removal.detached_addresses > 0 {
            tracing::info!(
                "Cleared references to {} removed node(s) from {} address(es)",
                removal.removed_nodes,
                removal.detached_addresses
            );
        }
        Ok(removal)
    }
}
