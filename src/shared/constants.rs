/// Upper bound for search results across all node kinds
pub const MAX_SEARCH_RESULTS: i64 = 100;

/// Maximum length of the free-form address line (street, building, apartment)
pub const MAX_ADDRESS_LINE_LENGTH: usize = 255;

/// Deepest ancestor chain the hierarchy allows (province → district → settlement → village)
pub const MAX_HIERARCHY_DEPTH: usize = 4;

/// Separator between tokens of a formatted address
pub const ADDRESS_SEPARATOR: &str = ", ";
