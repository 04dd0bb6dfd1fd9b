use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::IdSource;

/// Display colors cycled for user-created categories, keyed by
/// insertion index so repeated runs assign the same color.
const COLOR_PALETTE: [&str; 8] = [
    "#10b981", "#3b82f6", "#8b5cf6", "#f59e0b", "#ef4444", "#6366f1", "#ec4899", "#06b6d4",
];

const FALLBACK_ICON: &str = "\u{1F4DD}";

/// Supported category types. Both engines match exhaustively on this,
/// so a new kind cannot land without updating rollups and budgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryKind {
    Income,
    Expense,
}

/// Categorises ledger activity for rollups and budgeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    pub icon: String,
    pub color: String,
}

/// Owns the set of categories, partitioned by kind. Categories are
/// never deleted once referenced; only the id is unique, names may
/// repeat or be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the stock income and expense categories.
    pub fn with_defaults() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.clone(),
        }
    }

    /// Appends a new category with a fresh id and a palette color.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        kind: CategoryKind,
        ids: &mut dyn IdSource,
    ) -> &Category {
        let color = COLOR_PALETTE[self.categories.len() % COLOR_PALETTE.len()];
        let category = Category {
            id: ids.next_id(),
            name: name.into(),
            kind,
            icon: FALLBACK_ICON.to_string(),
            color: color.to_string(),
        };
        self.categories.push(category);
        self.categories.last().expect("just pushed")
    }

    pub fn resolve(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Ordered view of the categories matching `kind`.
    pub fn of_kind(&self, kind: CategoryKind) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |category| category.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Stock categories seeded into fresh ledgers. Ids derive from a name
/// namespace so every fresh install gets the same identities.
static DEFAULT_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    fn seed(name: &str, kind: CategoryKind, icon: &str, color: &str) -> Category {
        let slug = format!("fintrack:category:{}", name.to_ascii_lowercase());
        Category {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, slug.as_bytes()),
            name: name.to_string(),
            kind,
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }

    vec![
        seed("Salary", CategoryKind::Income, "\u{1F4B0}", "#10b981"),
        seed("Freelance", CategoryKind::Income, "\u{1F4BB}", "#3b82f6"),
        seed("Gifts", CategoryKind::Income, "\u{1F381}", "#8b5cf6"),
        seed("Food", CategoryKind::Expense, "\u{1F354}", "#f59e0b"),
        seed("Rent", CategoryKind::Expense, "\u{1F3E0}", "#ef4444"),
        seed("Transport", CategoryKind::Expense, "\u{1F697}", "#6366f1"),
        seed("Entertainment", CategoryKind::Expense, "\u{1F37F}", "#ec4899"),
        seed("Utilities", CategoryKind::Expense, "\u{26A1}", "#06b6d4"),
        seed("Shopping", CategoryKind::Expense, "\u{1F6CD}\u{FE0F}", "#8b5cf6"),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ids::SequentialIdSource;

    #[test]
    fn defaults_partition_by_kind() {
        let registry = CategoryRegistry::with_defaults();
        assert_eq!(registry.of_kind(CategoryKind::Income).count(), 3);
        assert_eq!(registry.of_kind(CategoryKind::Expense).count(), 6);
    }

    #[test]
    fn default_ids_are_stable_across_builds() {
        let a = CategoryRegistry::with_defaults();
        let b = CategoryRegistry::with_defaults();
        let ids_a: Vec<_> = a.iter().map(|c| c.id).collect();
        let ids_b: Vec<_> = b.iter().map(|c| c.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn add_assigns_palette_color_by_insertion_index() {
        let mut ids = SequentialIdSource::new();
        let mut registry = CategoryRegistry::new();
        let first = registry.add("Books", CategoryKind::Expense, &mut ids).clone();
        let second = registry.add("Books", CategoryKind::Expense, &mut ids).clone();
        assert_eq!(first.color, COLOR_PALETTE[0]);
        assert_eq!(second.color, COLOR_PALETTE[1]);
        // duplicate names are allowed, ids stay unique
        assert_ne!(first.id, second.id);
    }
}
