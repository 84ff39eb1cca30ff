//! Shared fixtures: a small slice of the Tajik hierarchy.
//!
//! ```text
//! Согдийская область ─ Худжанд ─ Центр
//! ГБАО ─ Рошткала ─ Хорог ─ Сучан
//!               └─ Тусиён      (snapshot only)
//! ```

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::LocaleConfig;
use crate::features::addresses::repositories::InMemoryAddressRepository;
use crate::features::addresses::AddressService;
use crate::features::locations::models::{LocationNode, NewLocationNode, NodeKind};
use crate::features::locations::repositories::{InMemoryLocationRepository, LocationRepository};
use crate::features::locations::{LocationService, TranslationIndex};

fn node(kind: NodeKind, parent: Option<&LocationNode>, title: &str) -> LocationNode {
    LocationNode {
        id: Uuid::new_v4(),
        kind,
        parent_id: parent.map(|p| p.id),
        title: title.to_string(),
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Nodes and their titles held in memory, for the pure address functions
pub struct NodeSnapshot {
    pub nodes: HashMap<Uuid, LocationNode>,
    pub titles: HashMap<Uuid, String>,
    pub sughd: Uuid,
    pub khujand: Uuid,
    pub center: Uuid,
    pub gbao: Uuid,
    pub roshtqala: Uuid,
    pub khorog: Uuid,
    pub suchan: Uuid,
    pub tusiyon: Uuid,
}

impl NodeSnapshot {
    pub fn sample() -> Self {
        let sughd = node(NodeKind::Province, None, "Согдийская область");
        let khujand = node(NodeKind::City, Some(&sughd), "Худжанд");
        let center = node(NodeKind::Suburb, Some(&khujand), "Центр");
        let gbao = node(NodeKind::Province, None, "ГБАО");
        let roshtqala = node(NodeKind::District, Some(&gbao), "Рошткала");
        let khorog = node(NodeKind::Settlement, Some(&roshtqala), "Хорог");
        let suchan = node(NodeKind::Village, Some(&khorog), "Сучан");
        let tusiyon = node(NodeKind::Community, Some(&roshtqala), "Тусиён");

        let ids = [
            sughd.id,
            khujand.id,
            center.id,
            gbao.id,
            roshtqala.id,
            khorog.id,
            suchan.id,
            tusiyon.id,
        ];
        let all = [sughd, khujand, center, gbao, roshtqala, khorog, suchan, tusiyon];
        let titles = all.iter().map(|n| (n.id, n.title.clone())).collect();
        let nodes = all.into_iter().map(|n| (n.id, n)).collect();

        Self {
            nodes,
            titles,
            sughd: ids[0],
            khujand: ids[1],
            center: ids[2],
            gbao: ids[3],
            roshtqala: ids[4],
            khorog: ids[5],
            suchan: ids[6],
            tusiyon: ids[7],
        }
    }
}

/// Services wired to in-memory repositories and seeded with the sample hierarchy
pub struct TestWorld {
    pub nodes: Arc<InMemoryLocationRepository>,
    pub locations: Arc<LocationService>,
    pub addresses: Arc<AddressService>,
    pub sughd: Uuid,
    pub khujand: Uuid,
    pub center: Uuid,
    pub gbao: Uuid,
    pub roshtqala: Uuid,
    pub khorog: Uuid,
    pub suchan: Uuid,
}

async fn seed(
    repo: &InMemoryLocationRepository,
    kind: NodeKind,
    parent_id: Option<Uuid>,
    title: &str,
) -> Uuid {
    repo.insert(NewLocationNode {
        kind,
        parent_id,
        title: title.to_string(),
        description: None,
        translations: Vec::new(),
    })
    .await
    .map(|n| n.id)
    .expect("seed node")
}

pub async fn seed_world() -> TestWorld {
    let nodes = Arc::new(InMemoryLocationRepository::new());
    let repo = nodes.as_ref();
    let sughd = seed(repo, NodeKind::Province, None, "Согдийская область").await;
    let khujand = seed(repo, NodeKind::City, Some(sughd), "Худжанд").await;
    let center = seed(repo, NodeKind::Suburb, Some(khujand), "Центр").await;
    let gbao = seed(repo, NodeKind::Province, None, "ГБАО").await;
    let roshtqala = seed(repo, NodeKind::District, Some(gbao), "Рошткала").await;
    let khorog = seed(repo, NodeKind::Settlement, Some(roshtqala), "Хорог").await;
    let suchan = seed(repo, NodeKind::Village, Some(khorog), "Сучан").await;

    let repo: Arc<dyn LocationRepository> = nodes.clone();
    let titles = Arc::new(TranslationIndex::new(
        Arc::clone(&repo),
        &LocaleConfig::default(),
    ));
    let addresses = Arc::new(AddressService::new(
        Arc::new(InMemoryAddressRepository::new(nodes.clone())),
        Arc::clone(&repo),
        Arc::clone(&titles),
    ));
    let locations = Arc::new(LocationService::new(repo, titles, addresses.clone()));

    TestWorld {
        nodes,
        locations,
        addresses,
        sughd,
        khujand,
        center,
        gbao,
        roshtqala,
        khorog,
        suchan,
    }
}
