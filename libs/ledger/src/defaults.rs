//! Default category catalog and the seeding routine

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{LedgerError, LedgerResult},
    models::{Category, NewCategory},
    sentinel::{NO_CATEGORY_COLOR, NO_CATEGORY_ICON, NO_CATEGORY_NAME},
    store::Store,
};

/// One entry of the default catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultCategory {
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

impl DefaultCategory {
    pub fn to_new_category(&self) -> NewCategory {
        NewCategory::new(self.name, self.color, self.icon)
    }
}

/// Categories every new user starts with. The sentinel comes first.
pub const DEFAULT_CATEGORIES: [DefaultCategory; 12] = [
    DefaultCategory { name: NO_CATEGORY_NAME, color: NO_CATEGORY_COLOR, icon: NO_CATEGORY_ICON },
    DefaultCategory { name: "Food & Dining", color: "#EF4444", icon: "🍔" },
    DefaultCategory { name: "Transportation", color: "#3B82F6", icon: "🚗" },
    DefaultCategory { name: "Shopping", color: "#8B5CF6", icon: "🛍️" },
    DefaultCategory { name: "Entertainment", color: "#EC4899", icon: "🎬" },
    DefaultCategory { name: "Bills & Utilities", color: "#F59E0B", icon: "💡" },
    DefaultCategory { name: "Healthcare", color: "#10B981", icon: "⚕️" },
    DefaultCategory { name: "Education", color: "#06B6D4", icon: "📚" },
    DefaultCategory { name: "Travel", color: "#6366F1", icon: "✈️" },
    DefaultCategory { name: "Personal Care", color: "#EC4899", icon: "💆" },
    DefaultCategory { name: "Groceries", color: "#84CC16", icon: "🛒" },
    DefaultCategory { name: "Other", color: "#64748B", icon: "📌" },
];

/// Result of seeding a user's categories
#[derive(Debug, Clone)]
pub struct SeededCategories {
    pub sentinel_id: Uuid,
    pub categories: Vec<Category>,
}

/// Create the whole default catalog for a user in one all-or-nothing step.
///
/// Not idempotent: if the user already owns any catalog name the batch fails
/// and nothing is created.
pub async fn seed_default_categories<S: Store>(
    store: &S,
    user_id: Uuid,
) -> LedgerResult<SeededCategories> {
    let catalog: Vec<NewCategory> = DEFAULT_CATEGORIES
        .iter()
        .map(DefaultCategory::to_new_category)
        .collect();

    let categories = match store.create_categories(user_id, &catalog).await {
        Ok(categories) => categories,
        Err(e) => {
            error!(context = "create-default-categories", %user_id, error = %e, "Failed to create default categories");
            return Err(e);
        }
    };

    let sentinel_id = categories
        .iter()
        .find(|c| c.name == NO_CATEGORY_NAME)
        .map(|c| c.id)
        .ok_or_else(|| LedgerError::Store("seeded catalog has no sentinel".to_string()))?;

    info!(
        %user_id,
        categories_count = categories.len(),
        "Created {} default categories for user {}",
        categories.len(),
        user_id
    );

    Ok(SeededCategories {
        sentinel_id,
        categories,
    })
}
