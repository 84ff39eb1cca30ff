use std::collections::HashMap;
use uuid::Uuid;

use crate::features::addresses::models::AddressSelection;
use crate::features::locations::models::Locale;
use crate::shared::constants::ADDRESS_SEPARATOR;

/// Placeholder for a persisted address with nothing left to show
pub fn persisted_placeholder(address_id: Uuid) -> String {
    format!("Address #{}", address_id)
}

/// Placeholder for a selection still being edited
pub fn unspecified_placeholder(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Адрес не указан",
        Locale::Tg => "Суроға нишон дода нашудааст",
        Locale::En => "Address not specified",
    }
}

fn join(tokens: Vec<&str>) -> Option<String> {
    let mut tokens = tokens;
    tokens.dedup();
    (!tokens.is_empty()).then(|| tokens.join(ADDRESS_SEPARATOR))
}

/// Full and short renderings of an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedAddress {
    pub full: String,
    pub short: String,
}

/// Renders selections with titles already resolved for one locale.
///
/// Works the same for a stored address (via `AddressData::to_selection`) and
/// for an in-progress selection; ids without a title are skipped.
pub struct AddressFormatter<'a> {
    titles: &'a HashMap<Uuid, String>,
}

impl<'a> AddressFormatter<'a> {
    pub fn new(titles: &'a HashMap<Uuid, String>) -> Self {
        Self { titles }
    }

    fn title(&self, id: Option<Uuid>) -> Option<&'a str> {
        let titles = self.titles;
        id.and_then(|id| titles.get(&id))
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
    }

    /// Province, city, district, suburbs, settlement, community, village, line
    pub fn full(&self, selection: &AddressSelection, placeholder: &str) -> String {
        let mut tokens: Vec<&str> = Vec::new();
        tokens.extend(self.title(selection.province_id));
        tokens.extend(self.title(selection.city_id));
        tokens.extend(self.title(selection.district_id));
        tokens.extend(
            selection
                .suburb_ids
                .iter()
                .filter_map(|id| self.title(Some(*id))),
        );
        tokens.extend(self.title(selection.settlement_id));
        tokens.extend(self.title(selection.community_id));
        tokens.extend(self.title(selection.village_id));
        tokens.extend(
            selection
                .line
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty()),
        );

        join(tokens).unwrap_or_else(|| placeholder.to_string())
    }

    /// Branch head plus its first populated child level; the province alone
    /// when there is no branch. Village and line never appear.
    pub fn short(&self, selection: &AddressSelection, placeholder: &str) -> String {
        let first_suburb = selection
            .suburb_ids
            .iter()
            .find_map(|id| self.title(Some(*id)));

        let tokens: Vec<&str> = if let Some(city) = self.title(selection.city_id) {
            std::iter::once(city).chain(first_suburb).collect()
        } else if let Some(district) = self.title(selection.district_id) {
            let leaf = self
                .title(selection.settlement_id)
                .or_else(|| self.title(selection.community_id));
            std::iter::once(district).chain(leaf).collect()
        } else {
            self.title(selection.province_id).into_iter().collect()
        };

        join(tokens).unwrap_or_else(|| placeholder.to_string())
    }

    pub fn format(&self, selection: &AddressSelection, placeholder: &str) -> FormattedAddress {
        FormattedAddress {
            full: self.full(selection, placeholder),
            short: self.short(selection, placeholder),
        }
    }
}
