use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::features::addresses::models::{
    AddressData, AddressSelection, Branch, DistrictLeaf, Violation, ViolationKind,
};
use crate::features::locations::models::{LocationNode, NodeKind};
use crate::shared::constants::MAX_ADDRESS_LINE_LENGTH;

/// Rules that need nothing but the selection itself
fn structural_violations(selection: &AddressSelection) -> Vec<Violation> {
    let mut violations = Vec::new();

    if selection.province_id.is_none() {
        violations.push(Violation::missing("province"));
    }

    let city_branch = selection.city_id.is_some() || !selection.suburb_ids.is_empty();
    let district_branch = selection.district_id.is_some()
        || selection.settlement_id.is_some()
        || selection.community_id.is_some()
        || selection.village_id.is_some();
    if city_branch && district_branch {
        violations.push(Violation::conflict(
            "branch",
            "city and district branches are mutually exclusive",
        ));
    }

    if !selection.suburb_ids.is_empty() && selection.city_id.is_none() {
        violations.push(Violation::dependency("suburbs", "suburbs require city"));
    }
    if selection.village_id.is_some() && selection.settlement_id.is_none() {
        violations.push(Violation::dependency(
            "village",
            "village requires settlement",
        ));
    }
    if selection.settlement_id.is_some() && selection.community_id.is_some() {
        violations.push(Violation::conflict(
            "community",
            "settlement/community exclusive",
        ));
    }
    if selection.district_id.is_none() {
        if selection.settlement_id.is_some() {
            violations.push(Violation::dependency(
                "settlement",
                "settlement requires district",
            ));
        }
        if selection.community_id.is_some() {
            violations.push(Violation::dependency(
                "community",
                "community requires district",
            ));
        }
    }

    if let Some(line) = &selection.line {
        let length = line.trim().chars().count();
        if length > MAX_ADDRESS_LINE_LENGTH {
            violations.push(Violation::new(
                "line",
                ViolationKind::InvalidField,
                format!(
                    "must be at most {} characters, got {}",
                    MAX_ADDRESS_LINE_LENGTH, length
                ),
            ));
        }
    }

    violations
}

/// `id` must be a node of `kind` hanging directly under `parent`
fn check_reference(
    nodes: &HashMap<Uuid, LocationNode>,
    field: &str,
    id: Uuid,
    kind: NodeKind,
    parent: Option<Uuid>,
) -> Option<Violation> {
    let Some(node) = nodes.get(&id) else {
        return Some(Violation::invalid_reference(
            field,
            format!("{} '{}' does not exist", kind, id),
        ));
    };
    if node.kind != kind {
        return Some(Violation::invalid_reference(
            field,
            format!("'{}' is a {}, expected a {}", id, node.kind, kind),
        ));
    }
    if node.parent_id != parent {
        return Some(Violation::invalid_reference(
            field,
            format!(
                "{} '{}' does not belong to the selected {}",
                kind,
                id,
                kind.parent_kind().map(|k| k.as_str()).unwrap_or("parent")
            ),
        ));
    }
    None
}

fn reference_violations(
    selection: &AddressSelection,
    nodes: &HashMap<Uuid, LocationNode>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut check = |field: &str, id: Option<Uuid>, kind: NodeKind, parent: Option<Uuid>| {
        if let Some(id) = id {
            violations.extend(check_reference(nodes, field, id, kind, parent));
        }
    };

    check("province", selection.province_id, NodeKind::Province, None);
    check("city", selection.city_id, NodeKind::City, selection.province_id);
    check(
        "district",
        selection.district_id,
        NodeKind::District,
        selection.province_id,
    );
    let mut seen = HashSet::new();
    for (index, suburb_id) in selection.suburb_ids.iter().enumerate() {
        if seen.insert(*suburb_id) {
            check(
                &format!("suburbs[{}]", index),
                Some(*suburb_id),
                NodeKind::Suburb,
                selection.city_id,
            );
        }
    }
    check(
        "settlement",
        selection.settlement_id,
        NodeKind::Settlement,
        selection.district_id,
    );
    check(
        "community",
        selection.community_id,
        NodeKind::Community,
        selection.district_id,
    );
    check(
        "village",
        selection.village_id,
        NodeKind::Village,
        selection.settlement_id,
    );

    violations
}

/// Check a raw selection against a snapshot of the nodes it references and
/// build the normalized address.
///
/// Reference checks only run once the structural rules pass, so a
/// conflicting selection reports just its structural problems.
pub fn validate_selection(
    selection: &AddressSelection,
    nodes: &HashMap<Uuid, LocationNode>,
) -> Result<AddressData, Vec<Violation>> {
    let violations = structural_violations(selection);
    if !violations.is_empty() {
        return Err(violations);
    }

    let violations = reference_violations(selection, nodes);
    if !violations.is_empty() {
        return Err(violations);
    }

    let branch = if let Some(city_id) = selection.city_id {
        let mut seen = HashSet::new();
        let suburb_ids = selection
            .suburb_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        Some(Branch::City {
            city_id,
            suburb_ids,
        })
    } else {
        selection.district_id.map(|district_id| {
            let leaf = match (selection.settlement_id, selection.community_id) {
                (Some(settlement_id), _) => Some(DistrictLeaf::Settlement {
                    settlement_id,
                    village_id: selection.village_id,
                }),
                (None, Some(community_id)) => Some(DistrictLeaf::Community { community_id }),
                (None, None) => None,
            };
            Branch::District { district_id, leaf }
        })
    };

    Ok(AddressData {
        province_id: selection.province_id,
        branch,
        line: selection
            .line
            .as_deref()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::NodeSnapshot;

    #[test]
    fn test_city_branch_accepted_and_normalized() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.sughd),
            city_id: Some(snap.khujand),
            suburb_ids: vec![snap.center, snap.center],
            line: Some("  ул. Ленина 12  ".to_string()),
            ..Default::default()
        };

        let data = validate_selection(&selection, &snap.nodes).unwrap();
        assert_eq!(data.city_id(), Some(snap.khujand));
        assert_eq!(data.suburb_ids(), &[snap.center]);
        assert_eq!(data.line.as_deref(), Some("ул. Ленина 12"));
    }

    #[test]
    fn test_district_branch_with_village() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.gbao),
            district_id: Some(snap.roshtqala),
            settlement_id: Some(snap.khorog),
            village_id: Some(snap.suchan),
            ..Default::default()
        };

        let data = validate_selection(&selection, &snap.nodes).unwrap();
        assert_eq!(data.village_id(), Some(snap.suchan));
        assert_eq!(data.city_id(), None);
    }

    #[test]
    fn test_district_branch_with_community() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.gbao),
            district_id: Some(snap.roshtqala),
            community_id: Some(snap.tusiyon),
            ..Default::default()
        };

        let data = validate_selection(&selection, &snap.nodes).unwrap();
        assert_eq!(data.community_id(), Some(snap.tusiyon));
        assert_eq!(data.settlement_id(), None);
        assert_eq!(data.village_id(), None);
    }

    #[test]
    fn test_province_only_accepted() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.sughd),
            line: Some("   ".to_string()),
            ..Default::default()
        };
        let data = validate_selection(&selection, &snap.nodes).unwrap();
        assert_eq!(data.branch, None);
        assert_eq!(data.line, None);
    }

    #[test]
    fn test_both_branches_yield_single_conflict() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.sughd),
            city_id: Some(snap.khujand),
            district_id: Some(snap.roshtqala),
            ..Default::default()
        };

        let violations = validate_selection(&selection, &snap.nodes).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::BranchConflict);
        assert_eq!(violations[0].field, "branch");
    }

    #[test]
    fn test_village_without_settlement_rejected() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.gbao),
            district_id: Some(snap.roshtqala),
            village_id: Some(snap.suchan),
            ..Default::default()
        };

        let violations = validate_selection(&selection, &snap.nodes).unwrap_err();
        assert!(violations.iter().any(|v| v.kind == ViolationKind::DependencyViolation
            && v.field == "village"
            && v.message == "village requires settlement"));
    }

    #[test]
    fn test_settlement_and_community_conflict() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.gbao),
            district_id: Some(snap.roshtqala),
            settlement_id: Some(snap.khorog),
            community_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let violations = validate_selection(&selection, &snap.nodes).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_message(), "community: settlement/community exclusive");
    }

    #[test]
    fn test_missing_province() {
        let snap = NodeSnapshot::sample();
        let violations = validate_selection(&AddressSelection::default(), &snap.nodes).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::MissingRequiredField);
        assert_eq!(violations[0].field, "province");
    }

    #[test]
    fn test_wrong_parent_is_invalid_reference() {
        let snap = NodeSnapshot::sample();
        // Khujand belongs to Sughd, not GBAO
        let selection = AddressSelection {
            province_id: Some(snap.gbao),
            city_id: Some(snap.khujand),
            ..Default::default()
        };
        let violations = validate_selection(&selection, &snap.nodes).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::InvalidReference);
        assert_eq!(violations[0].field, "city");
    }

    #[test]
    fn test_unknown_and_mistyped_references() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.sughd),
            city_id: Some(snap.khujand),
            suburb_ids: vec![snap.center, Uuid::new_v4(), snap.khujand],
            ..Default::default()
        };
        let violations = validate_selection(&selection, &snap.nodes).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["suburbs[1]", "suburbs[2]"]);
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::InvalidReference));
    }

    #[test]
    fn test_line_too_long() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.sughd),
            line: Some("д".repeat(MAX_ADDRESS_LINE_LENGTH + 1)),
            ..Default::default()
        };
        let violations = validate_selection(&selection, &snap.nodes).unwrap_err();
        assert_eq!(violations[0].kind, ViolationKind::InvalidField);
        assert_eq!(violations[0].field, "line");
    }

    #[test]
    fn test_suburbs_without_city() {
        let snap = NodeSnapshot::sample();
        let selection = AddressSelection {
            province_id: Some(snap.sughd),
            suburb_ids: vec![snap.center],
            ..Default::default()
        };
        let violations = validate_selection(&selection, &snap.nodes).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "suburbs require city");
    }
}
