use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::features::addresses::models::{AddressData, AddressSelection, Violation};
use crate::features::addresses::services::validate_selection;
use crate::features::locations::models::{LocationNode, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("Cannot choose a {level} before a {parent} is chosen")]
    ParentNotChosen { level: NodeKind, parent: NodeKind },
}

/// Where the picker currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Empty,
    ProvinceChosen,
    CityChosen,
    DistrictChosen,
    LeafChosen,
}

/// Cascading address picker, without any UI attached.
///
/// Changing a level resets everything below it. City and district exclude
/// each other, as do settlement and community. Choosing the value already
/// held does nothing.
#[derive(Debug, Clone, Default)]
pub struct AddressSelector {
    selection: AddressSelection,
}

impl AddressSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume editing from a stored address
    pub fn from_data(data: &AddressData) -> Self {
        Self {
            selection: data.to_selection(),
        }
    }

    pub fn selection(&self) -> &AddressSelection {
        &self.selection
    }

    pub fn state(&self) -> SelectorState {
        let s = &self.selection;
        if s.settlement_id.is_some() || s.community_id.is_some() {
            SelectorState::LeafChosen
        } else if s.district_id.is_some() {
            SelectorState::DistrictChosen
        } else if s.city_id.is_some() {
            SelectorState::CityChosen
        } else if s.province_id.is_some() {
            SelectorState::ProvinceChosen
        } else {
            SelectorState::Empty
        }
    }

    fn require(chosen: Option<Uuid>, level: NodeKind, parent: NodeKind) -> Result<(), SelectorError> {
        match chosen {
            Some(_) => Ok(()),
            None => Err(SelectorError::ParentNotChosen { level, parent }),
        }
    }

    fn clear_city_branch(&mut self) {
        self.selection.city_id = None;
        self.selection.suburb_ids.clear();
    }

    fn clear_district_leaf(&mut self) {
        self.selection.settlement_id = None;
        self.selection.community_id = None;
        self.selection.village_id = None;
    }

    fn clear_district_branch(&mut self) {
        self.selection.district_id = None;
        self.clear_district_leaf();
    }

    pub fn select_province(&mut self, province_id: Option<Uuid>) -> Result<(), SelectorError> {
        if self.selection.province_id == province_id {
            return Ok(());
        }
        self.selection.province_id = province_id;
        self.clear_city_branch();
        self.clear_district_branch();
        Ok(())
    }

    pub fn select_city(&mut self, city_id: Option<Uuid>) -> Result<(), SelectorError> {
        if self.selection.city_id == city_id {
            return Ok(());
        }
        Self::require(self.selection.province_id, NodeKind::City, NodeKind::Province)?;
        self.clear_city_branch();
        self.clear_district_branch();
        self.selection.city_id = city_id;
        Ok(())
    }

    /// Add the suburb if absent, remove it otherwise
    pub fn toggle_suburb(&mut self, suburb_id: Uuid) -> Result<(), SelectorError> {
        Self::require(self.selection.city_id, NodeKind::Suburb, NodeKind::City)?;
        let suburbs = &mut self.selection.suburb_ids;
        match suburbs.iter().position(|id| *id == suburb_id) {
            Some(index) => {
                suburbs.remove(index);
            }
            None => suburbs.push(suburb_id),
        }
        Ok(())
    }

    pub fn select_district(&mut self, district_id: Option<Uuid>) -> Result<(), SelectorError> {
        if self.selection.district_id == district_id {
            return Ok(());
        }
        Self::require(
            self.selection.province_id,
            NodeKind::District,
            NodeKind::Province,
        )?;
        self.clear_city_branch();
        self.clear_district_branch();
        self.selection.district_id = district_id;
        Ok(())
    }

    pub fn select_settlement(&mut self, settlement_id: Option<Uuid>) -> Result<(), SelectorError> {
        if self.selection.settlement_id == settlement_id {
            return Ok(());
        }
        Self::require(
            self.selection.district_id,
            NodeKind::Settlement,
            NodeKind::District,
        )?;
        self.clear_district_leaf();
        self.selection.settlement_id = settlement_id;
        Ok(())
    }

    pub fn select_community(&mut self, community_id: Option<Uuid>) -> Result<(), SelectorError> {
        if self.selection.community_id == community_id {
            return Ok(());
        }
        Self::require(
            self.selection.district_id,
            NodeKind::Community,
            NodeKind::District,
        )?;
        self.clear_district_leaf();
        self.selection.community_id = community_id;
        Ok(())
    }

    pub fn select_village(&mut self, village_id: Option<Uuid>) -> Result<(), SelectorError> {
        if self.selection.village_id == village_id {
            return Ok(());
        }
        Self::require(
            self.selection.settlement_id,
            NodeKind::Village,
            NodeKind::Settlement,
        )?;
        self.selection.village_id = village_id;
        Ok(())
    }

    pub fn set_line(&mut self, line: Option<String>) {
        self.selection.line = line;
    }

    /// Violations the current selection would be rejected with
    pub fn violations(&self, nodes: &HashMap<Uuid, LocationNode>) -> Vec<Violation> {
        validate_selection(&self.selection, nodes)
            .err()
            .unwrap_or_default()
    }

    pub fn is_accepting(&self, nodes: &HashMap<Uuid, LocationNode>) -> bool {
        validate_selection(&self.selection, nodes).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::NodeSnapshot;

    #[test]
    fn test_walk_city_branch() {
        let snap = NodeSnapshot::sample();
        let mut selector = AddressSelector::new();
        assert_eq!(selector.state(), SelectorState::Empty);
        assert!(!selector.is_accepting(&snap.nodes));

        selector.select_province(Some(snap.sughd)).unwrap();
        assert_eq!(selector.state(), SelectorState::ProvinceChosen);
        assert!(selector.is_accepting(&snap.nodes));

        selector.select_city(Some(snap.khujand)).unwrap();
        selector.toggle_suburb(snap.center).unwrap();
        assert_eq!(selector.state(), SelectorState::CityChosen);
        assert_eq!(selector.selection().suburb_ids, vec![snap.center]);
        assert!(selector.is_accepting(&snap.nodes));

        selector.toggle_suburb(snap.center).unwrap();
        assert!(selector.selection().suburb_ids.is_empty());
    }

    #[test]
    fn test_parent_not_chosen() {
        let snap = NodeSnapshot::sample();
        let mut selector = AddressSelector::new();

        assert_eq!(
            selector.select_city(Some(snap.khujand)),
            Err(SelectorError::ParentNotChosen {
                level: NodeKind::City,
                parent: NodeKind::Province
            })
        );
        assert!(selector.toggle_suburb(snap.center).is_err());

        selector.select_province(Some(snap.gbao)).unwrap();
        assert!(selector.select_settlement(Some(snap.khorog)).is_err());
        selector.select_district(Some(snap.roshtqala)).unwrap();
        assert!(selector.select_village(Some(snap.suchan)).is_err());
    }

    #[test]
    fn test_switching_branches_resets_deeper_levels() {
        let snap = NodeSnapshot::sample();
        let mut selector = AddressSelector::new();
        selector.select_province(Some(snap.sughd)).unwrap();
        selector.select_city(Some(snap.khujand)).unwrap();
        selector.toggle_suburb(snap.center).unwrap();

        selector.select_district(Some(snap.roshtqala)).unwrap();
        assert_eq!(selector.selection().city_id, None);
        assert!(selector.selection().suburb_ids.is_empty());
        assert_eq!(selector.state(), SelectorState::DistrictChosen);

        selector.select_settlement(Some(snap.khorog)).unwrap();
        selector.select_village(Some(snap.suchan)).unwrap();
        assert_eq!(selector.state(), SelectorState::LeafChosen);

        let community = Uuid::new_v4();
        selector.select_community(Some(community)).unwrap();
        assert_eq!(selector.selection().settlement_id, None);
        assert_eq!(selector.selection().village_id, None);
        assert_eq!(selector.selection().community_id, Some(community));

        selector.select_province(Some(snap.gbao)).unwrap();
        assert_eq!(selector.state(), SelectorState::ProvinceChosen);
        assert_eq!(selector.selection().district_id, None);
        assert_eq!(selector.selection().community_id, None);
    }

    #[test]
    fn test_reselecting_same_value_is_noop() {
        let snap = NodeSnapshot::sample();
        let mut selector = AddressSelector::new();
        selector.select_province(Some(snap.gbao)).unwrap();
        selector.select_district(Some(snap.roshtqala)).unwrap();
        selector.select_settlement(Some(snap.khorog)).unwrap();
        selector.set_line(Some("ул. Гагарина 3".to_string()));

        selector.select_district(Some(snap.roshtqala)).unwrap();
        selector.select_province(Some(snap.gbao)).unwrap();
        assert_eq!(selector.selection().settlement_id, Some(snap.khorog));
        assert_eq!(selector.state(), SelectorState::LeafChosen);
        assert!(selector.is_accepting(&snap.nodes));
    }

    #[test]
    fn test_deselecting_clears_deeper_levels() {
        let snap = NodeSnapshot::sample();
        let mut selector = AddressSelector::new();
        selector.select_province(Some(snap.gbao)).unwrap();
        selector.select_district(Some(snap.roshtqala)).unwrap();
        selector.select_settlement(Some(snap.khorog)).unwrap();

        selector.select_district(None).unwrap();
        assert_eq!(selector.state(), SelectorState::ProvinceChosen);
        assert_eq!(selector.selection().settlement_id, None);

        selector.select_province(None).unwrap();
        assert_eq!(selector.state(), SelectorState::Empty);
        assert_eq!(selector.violations(&snap.nodes).len(), 1);
    }

    #[test]
    fn test_resume_from_stored_address() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.sughd),
            city_id: Some(snap.khujand),
            suburb_ids: vec![snap.center],
            ..Default::default()
        };
        let data = validate_selection(&selection, &snap.nodes).unwrap();
        let selector = AddressSelector::from_data(&data);
        assert_eq!(selector.selection(), &selection);
        assert_eq!(selector.state(), SelectorState::CityChosen);
    }
}
