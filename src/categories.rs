// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::Lazy;

/// Static expense category. Not user-editable; presentation reads the icon
/// name and color, the store only cares about ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Id of the catch-all category. Fallback resolution goes through this id,
/// never through list position.
pub const OTHER_CATEGORY_ID: &str = "7";

/// Neutral color for breakdown entries whose category id cannot be resolved.
pub const FALLBACK_COLOR: &str = "#BDB76B";

pub static CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    vec![
        Category { id: "1", name: "Food & Dining", icon: "restaurant", color: "#FF6B6B" },
        Category { id: "2", name: "Transportation", icon: "car", color: "#4ECDC4" },
        Category { id: "3", name: "Shopping", icon: "cart", color: "#45B7D1" },
        Category { id: "4", name: "Entertainment", icon: "game-controller", color: "#FFA07A" },
        Category { id: "5", name: "Bills & Utilities", icon: "receipt", color: "#98D8C8" },
        Category { id: "6", name: "Healthcare", icon: "medical", color: "#F7DC6F" },
        Category { id: "7", name: "Other", icon: "ellipsis-horizontal", color: "#BDB76B" },
    ]
});

/// Looks up a category by id.
pub fn category_by_id(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// The "Other" category, used when an expense carries an id that no longer
/// resolves.
pub fn fallback_category() -> &'static Category {
    category_by_id(OTHER_CATEGORY_ID)
        .unwrap_or_else(|| &CATEGORIES[CATEGORIES.len() - 1])
}

/// Resolves an id to a category, falling back to "Other".
pub fn category_or_fallback(id: &str) -> &'static Category {
    category_by_id(id).unwrap_or_else(fallback_category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_position_independent() {
        let other = fallback_category();
        assert_eq!(other.id, OTHER_CATEGORY_ID);
        assert_eq!(other.name, "Other");
    }

    #[test]
    fn unknown_id_falls_back() {
        assert!(category_by_id("99").is_none());
        assert_eq!(category_or_fallback("99").name, "Other");
    }
}
