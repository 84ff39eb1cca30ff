use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::types::patch_field;

/// Raw selection as it comes from the picker or the API. Nothing is required
/// at this stage; the validator decides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressSelection {
    pub province_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    #[serde(default)]
    pub suburb_ids: Vec<Uuid>,
    pub district_id: Option<Uuid>,
    pub settlement_id: Option<Uuid>,
    pub community_id: Option<Uuid>,
    pub village_id: Option<Uuid>,
    /// Street, building, apartment
    #[schema(example = "ул. Ленина 12, кв. 5")]
    pub line: Option<String>,
}

impl AddressSelection {
    /// Every id mentioned, in canonical order, duplicates included
    pub fn referenced_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = [self.province_id, self.city_id, self.district_id]
            .into_iter()
            .flatten()
            .collect();
        ids.extend(self.suburb_ids.iter().copied());
        ids.extend(
            [self.settlement_id, self.community_id, self.village_id]
                .into_iter()
                .flatten(),
        );
        ids
    }

    /// Apply a patch: absent fields keep their value, `null` clears
    pub fn merged(mut self, patch: &AddressPatch) -> Self {
        fn apply<T: Clone>(target: &mut Option<T>, change: &Option<Option<T>>) {
            if let Some(value) = change {
                *target = value.clone();
            }
        }

        apply(&mut self.province_id, &patch.province_id);
        apply(&mut self.city_id, &patch.city_id);
        apply(&mut self.district_id, &patch.district_id);
        apply(&mut self.settlement_id, &patch.settlement_id);
        apply(&mut self.community_id, &patch.community_id);
        apply(&mut self.village_id, &patch.village_id);
        apply(&mut self.line, &patch.line);
        if let Some(suburb_ids) = &patch.suburb_ids {
            self.suburb_ids = suburb_ids.clone().unwrap_or_default();
        }
        self
    }
}

/// Partial update of an address. An absent field keeps the stored value,
/// an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatch {
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<Uuid>)]
    pub province_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<Uuid>)]
    pub city_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<Vec<Uuid>>)]
    pub suburb_ids: Option<Option<Vec<Uuid>>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<Uuid>)]
    pub district_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<Uuid>)]
    pub settlement_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<Uuid>)]
    pub community_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<Uuid>)]
    pub village_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<String>)]
    pub line: Option<Option<String>>,
}

/// Leaf below a district
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistrictLeaf {
    Settlement {
        settlement_id: Uuid,
        village_id: Option<Uuid>,
    },
    Community {
        community_id: Uuid,
    },
}

/// Which side of the province an address lives on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    City {
        city_id: Uuid,
        suburb_ids: Vec<Uuid>,
    },
    District {
        district_id: Uuid,
        leaf: Option<DistrictLeaf>,
    },
}

/// Normalized, branch-consistent address.
///
/// `province_id` is only ever `None` on a persisted address whose province
/// was deleted; the validator never produces that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressData {
    pub province_id: Option<Uuid>,
    pub branch: Option<Branch>,
    pub line: Option<String>,
}

impl AddressData {
    /// Rebuild from flat storage columns. Stray deeper columns without their
    /// parent column are ignored.
    #[allow(clippy::too_many_arguments)]
    pub fn from_columns(
        province_id: Option<Uuid>,
        city_id: Option<Uuid>,
        suburb_ids: Vec<Uuid>,
        district_id: Option<Uuid>,
        settlement_id: Option<Uuid>,
        community_id: Option<Uuid>,
        village_id: Option<Uuid>,
        line: Option<String>,
    ) -> Self {
        let branch = match (city_id, district_id) {
            (Some(city_id), _) => Some(Branch::City {
                city_id,
                suburb_ids,
            }),
            (None, Some(district_id)) => {
                let leaf = match (settlement_id, community_id) {
                    (Some(settlement_id), _) => Some(DistrictLeaf::Settlement {
                        settlement_id,
                        village_id,
                    }),
                    (None, Some(community_id)) => Some(DistrictLeaf::Community { community_id }),
                    (None, None) => None,
                };
                Some(Branch::District { district_id, leaf })
            }
            (None, None) => None,
        };

        Self {
            province_id,
            branch,
            line,
        }
    }

    pub fn city_id(&self) -> Option<Uuid> {
        match &self.branch {
            Some(Branch::City { city_id, .. }) => Some(*city_id),
            _ => None,
        }
    }

    pub fn suburb_ids(&self) -> &[Uuid] {
        match &self.branch {
            Some(Branch::City { suburb_ids, .. }) => suburb_ids,
            _ => &[],
        }
    }

    pub fn district_id(&self) -> Option<Uuid> {
        match &self.branch {
            Some(Branch::District { district_id, .. }) => Some(*district_id),
            _ => None,
        }
    }

    fn leaf(&self) -> Option<&DistrictLeaf> {
        match &self.branch {
            Some(Branch::District { leaf, .. }) => leaf.as_ref(),
            _ => None,
        }
    }

    pub fn settlement_id(&self) -> Option<Uuid> {
        match self.leaf() {
            Some(DistrictLeaf::Settlement { settlement_id, .. }) => Some(*settlement_id),
            _ => None,
        }
    }

    pub fn community_id(&self) -> Option<Uuid> {
        match self.leaf() {
            Some(DistrictLeaf::Community { community_id }) => Some(*community_id),
            _ => None,
        }
    }

    pub fn village_id(&self) -> Option<Uuid> {
        match self.leaf() {
            Some(DistrictLeaf::Settlement { village_id, .. }) => *village_id,
            _ => None,
        }
    }

    /// Flat view, suitable for patching or re-validation
    pub fn to_selection(&self) -> AddressSelection {
        AddressSelection {
            province_id: self.province_id,
            city_id: self.city_id(),
            suburb_ids: self.suburb_ids().to_vec(),
            district_id: self.district_id(),
            settlement_id: self.settlement_id(),
            community_id: self.community_id(),
            village_id: self.village_id(),
            line: self.line.clone(),
        }
    }

    pub fn referenced_ids(&self) -> Vec<Uuid> {
        self.to_selection().referenced_ids()
    }

    pub fn references_any(&self, node_ids: &HashSet<Uuid>) -> bool {
        self.referenced_ids().iter().any(|id| node_ids.contains(id))
    }

    /// No administrative unit left; only the line (if any) survives
    pub fn is_orphaned(&self) -> bool {
        self.province_id.is_none() && self.branch.is_none()
    }

    /// Copy with every reference to `removed` cleared. Clearing a level
    /// clears everything below it; a removed suburb just drops out.
    pub fn detached(&self, removed: &HashSet<Uuid>) -> AddressData {
        let gone = |id: &Uuid| removed.contains(id);

        if self.province_id.as_ref().is_some_and(gone) {
            return AddressData {
                province_id: None,
                branch: None,
                line: self.line.clone(),
            };
        }

        let branch = match &self.branch {
            Some(Branch::City { city_id, .. }) if gone(city_id) => None,
            Some(Branch::City {
                city_id,
                suburb_ids,
            }) => Some(Branch::City {
                city_id: *city_id,
                suburb_ids: suburb_ids.iter().filter(|id| !gone(*id)).copied().collect(),
            }),
            Some(Branch::District { district_id, .. }) if gone(district_id) => None,
            Some(Branch::District { district_id, leaf }) => {
                let leaf = match leaf {
                    Some(DistrictLeaf::Settlement { settlement_id, .. }) if gone(settlement_id) => {
                        None
                    }
                    Some(DistrictLeaf::Settlement {
                        settlement_id,
                        village_id,
                    }) => Some(DistrictLeaf::Settlement {
                        settlement_id: *settlement_id,
                        village_id: village_id.filter(|id| !gone(id)),
                    }),
                    Some(DistrictLeaf::Community { community_id }) if gone(community_id) => None,
                    other => other.clone(),
                };
                Some(Branch::District {
                    district_id: *district_id,
                    leaf,
                })
            }
            None => None,
        };

        AddressData {
            province_id: self.province_id,
            branch,
            line: self.line.clone(),
        }
    }
}

/// Persisted address aggregate
#[derive(Debug, Clone)]
pub struct Address {
    pub id: Uuid,
    pub data: AddressData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
