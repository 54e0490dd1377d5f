//! Stock reconciliation: applying movements to a product's on-hand quantity.
//!
//! [`Product::apply_movement`] is the pure rule. [`post_movement`] and
//! [`reverse_movement`] run it inside one transaction that holds the product
//! row lock (`SELECT ... FOR UPDATE`), so the quantity update and the movement
//! log either both persist or neither does, and concurrent postings for the
//! same product are serialised on that row.

use thiserror::Error;

use crate::database::Database;
use crate::models::{MovementType, NewStockMovement, Product, StockMovement};
use crate::validation::{positive_quantity, ValidationError};

#[derive(Debug, Error)]
pub enum StockError {
    #[error("Not enough stock available for this movement.")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("product {0} does not exist")]
    ProductNotFound(i64),

    #[error("stock movement {0} does not exist")]
    MovementNotFound(i64),

    #[error("stock quantity would exceed the supported range")]
    Overflow,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl Product {
    /// Returns the product as it stands after the movement.
    ///
    /// `In` always adds. `Out` only succeeds when enough stock is on hand;
    /// the receiver is never modified.
    pub fn apply_movement(&self, quantity: i32, movement_type: MovementType) -> Result<Product, StockError> {
        let quantity = positive_quantity("quantity", quantity)?;

        let stock_quantity = match movement_type {
            MovementType::In => self
                .stock_quantity
                .checked_add(quantity)
                .ok_or(StockError::Overflow)?,
            MovementType::Out => {
                if self.stock_quantity < quantity {
                    return Err(StockError::InsufficientStock {
                        available: self.stock_quantity,
                        requested: quantity,
                    });
                }
                self.stock_quantity - quantity
            }
        };

        Ok(Product {
            stock_quantity,
            ..self.clone()
        })
    }
}

/// Records a movement and adjusts the product's stock as one unit.
pub async fn post_movement(
    db: &Database,
    movement: &NewStockMovement,
) -> Result<(Product, StockMovement), StockError> {
    let mut tx = db.begin().await?;

    let product = Product::lock(&mut *tx, movement.product_id)
        .await?
        .ok_or(StockError::ProductNotFound(movement.product_id))?;

    let updated = match product.apply_movement(movement.quantity, movement.movement_type) {
        Ok(updated) => updated,
        Err(err) => {
            log::warn!(
                "rejected {} movement of {} for product {}: {}",
                movement.movement_type,
                movement.quantity,
                product.id,
                err
            );
            return Err(err);
        }
    };

    updated.save_stock(&mut *tx).await?;
    let record = StockMovement::insert(&mut *tx, movement).await?;

    tx.commit().await?;

    log::info!(
        "posted {} movement {} of {} for product {} (stock {} -> {})",
        record.movement_type,
        record.id,
        record.quantity,
        updated.id,
        product.stock_quantity,
        updated.stock_quantity
    );
    Ok((updated, record))
}

/// Deletes a movement and undoes its effect on the product's stock.
///
/// Undoing an `In` whose stock has since been moved out fails with
/// [`StockError::InsufficientStock`] and leaves everything as it was.
pub async fn reverse_movement(db: &Database, id: i64) -> Result<Product, StockError> {
    let mut tx = db.begin().await?;

    let movement = StockMovement::find(&mut *tx, id)
        .await?
        .ok_or(StockError::MovementNotFound(id))?;

    let product = Product::lock(&mut *tx, movement.product_id)
        .await?
        .ok_or(StockError::ProductNotFound(movement.product_id))?;

    let updated = product.apply_movement(movement.quantity, movement.movement_type.reversed())?;

    updated.save_stock(&mut *tx).await?;
    StockMovement::remove(&mut *tx, movement.id).await?;

    tx.commit().await?;

    log::info!(
        "reversed {} movement {} for product {} (stock {} -> {})",
        movement.movement_type,
        movement.id,
        updated.id,
        product.stock_quantity,
        updated.stock_quantity
    );
    Ok(updated)
}
