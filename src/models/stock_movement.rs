use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgExecutor};
use thiserror::Error;

use crate::validation::{self, FieldErrors};

/// Direction of a movement: `In` adds stock, `Out` removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementType {
    In,
    Out,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown movement type {0:?}")]
pub struct UnknownMovementType(String);

impl MovementType {
    pub const ALL: [MovementType; 2] = [MovementType::In, MovementType::Out];

    pub fn as_str(self) -> &'static str {
        match self {
            MovementType::In => "In",
            MovementType::Out => "Out",
        }
    }

    /// The movement that undoes this one.
    pub fn reversed(self) -> Self {
        match self {
            MovementType::In => MovementType::Out,
            MovementType::Out => MovementType::In,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = UnknownMovementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In" => Ok(MovementType::In),
            "Out" => Ok(MovementType::Out),
            other => Err(UnknownMovementType(other.to_string())),
        }
    }
}

impl TryFrom<String> for MovementType {
    type Error = UnknownMovementType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    #[sqlx(try_from = "String")]
    pub movement_type: MovementType,
    pub movement_date: NaiveDate,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovementDisplay {
    pub id: i64,
    pub product: String,
    pub quantity: i32,
    pub movement_type: String,
    pub movement_date: NaiveDate,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockMovement {
    pub product_id: i64,
    pub quantity: i32,
    pub movement_type: MovementType,
    pub notes: String,
}

impl StockMovement {
    pub async fn listing<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<StockMovementDisplay>, sqlx::Error> {
        sqlx::query_as::<_, StockMovementDisplay>(
            r#"
            SELECT m.id, p.name AS product, m.quantity, m.movement_type, m.movement_date, m.notes
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            ORDER BY m.movement_date DESC, m.id DESC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn for_product<'e, E: PgExecutor<'e>>(db: E, product_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, StockMovement>("SELECT * FROM stock_movements WHERE product_id = $1 ORDER BY id")
            .bind(product_id)
            .fetch_all(db)
            .await
    }

    pub async fn find<'e, E: PgExecutor<'e>>(db: E, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StockMovement>("SELECT * FROM stock_movements WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub(crate) async fn insert(conn: &mut PgConnection, movement: &NewStockMovement) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, quantity, movement_type, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(movement.product_id)
        .bind(movement.quantity)
        .bind(movement.movement_type.as_str())
        .bind(&movement.notes)
        .fetch_one(conn)
        .await
    }

    pub(crate) async fn remove(conn: &mut PgConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM stock_movements WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Only the notes of a posted movement can change.
    pub async fn update_notes<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        notes: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StockMovement>("UPDATE stock_movements SET notes = $1 WHERE id = $2 RETURNING *")
            .bind(notes)
            .bind(id)
            .fetch_optional(db)
            .await
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StockMovementForm {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub movement_type: String,
    #[serde(default)]
    pub notes: String,
}

impl StockMovementForm {
    pub fn validate(&self) -> Result<NewStockMovement, FieldErrors> {
        let mut errors = FieldErrors::new();
        let product_id = validation::parse_reference(&mut errors, "product", &self.product, true);
        let quantity = match validation::parse_integer(&mut errors, "quantity", &self.quantity) {
            Some(q) => match validation::positive_quantity("quantity", q) {
                Ok(q) => Some(q),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => None,
        };
        let movement_type = validation::parse_choice::<MovementType>(&mut errors, "movement_type", &self.movement_type);
        let notes = self.notes.trim().to_string();

        errors.finish(|| NewStockMovement {
            product_id: product_id.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            movement_type: movement_type.unwrap_or(MovementType::In),
            notes,
        })
    }
}

impl From<&StockMovement> for StockMovementForm {
    fn from(movement: &StockMovement) -> Self {
        Self {
            product: movement.product_id.to_string(),
            quantity: movement.quantity.to_string(),
            movement_type: movement.movement_type.to_string(),
            notes: movement.notes.clone(),
        }
    }
}
