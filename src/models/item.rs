use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use super::id_field;
use crate::database::ConstraintField;
use crate::validation::{self, FieldErrors, INVALID_CHOICE};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub owner_id: Uuid,
}

/// Row for the dashboard table.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryItemDisplay {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
    pub category: String,
    pub created_at: String,
    pub low: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryItem {
    pub name: String,
    pub quantity: i32,
    pub category_id: Option<i64>,
}

impl InventoryItem {
    pub const REFERENCE_FIELDS: &'static [ConstraintField] =
        &[("inventory_items_category_id_fkey", "category", INVALID_CHOICE)];

    /// Every item owned by `owner`, ordered by id.
    pub async fn for_owner<'e, E: PgExecutor<'e>>(db: E, owner: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE owner_id = $1 ORDER BY id")
            .bind(owner)
            .fetch_all(db)
            .await
    }

    /// Looks up an item, scoped to its owner. Another user's item is not found.
    pub async fn find_owned<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(db)
            .await
    }

    pub async fn create<'e, E: PgExecutor<'e>>(
        db: E,
        owner: Uuid,
        item: &NewInventoryItem,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO inventory_items (name, quantity, category_id, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.category_id)
        .bind(owner)
        .fetch_one(db)
        .await
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        owner: Uuid,
        item: &NewInventoryItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE inventory_items
            SET name = $1, quantity = $2, category_id = $3
            WHERE id = $4 AND owner_id = $5
            RETURNING *
            "#,
        )
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.category_id)
        .bind(id)
        .bind(owner)
        .fetch_optional(db)
        .await
    }

    pub async fn delete<'e, E: PgExecutor<'e>>(db: E, id: i64, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub category: String,
}

impl ItemForm {
    pub fn validate(&self) -> Result<NewInventoryItem, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = validation::required_text(&mut errors, "name", &self.name, 200);
        let quantity = validation::parse_integer(&mut errors, "quantity", &self.quantity);
        let category_id = validation::parse_reference(&mut errors, "category", &self.category, false);

        errors.finish(|| NewInventoryItem {
            name,
            quantity: quantity.unwrap_or_default(),
            category_id,
        })
    }
}

impl From<&InventoryItem> for ItemForm {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.to_string(),
            category: id_field(item.category_id),
        }
    }
}
