use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use thiserror::Error;

use crate::database::ConstraintField;
use crate::validation::{self, FieldErrors, ValidationError, INVALID_CHOICE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sale order status {0:?}")]
pub struct UnknownStatus(String);

impl SaleStatus {
    pub const ALL: [SaleStatus; 3] = [SaleStatus::Pending, SaleStatus::Completed, SaleStatus::Cancelled];

    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Pending => "Pending",
            SaleStatus::Completed => "Completed",
            SaleStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SaleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for SaleStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SaleOrder {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub total_price: Decimal,
    pub sale_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: SaleStatus,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleOrderDisplay {
    pub id: i64,
    pub product: String,
    pub quantity: i32,
    pub total_price: Decimal,
    pub sale_date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSaleOrder {
    pub product_id: i64,
    pub quantity: i32,
    /// `None` means "price × quantity", filled in once the product is known.
    pub total_price: Option<Decimal>,
    pub status: SaleStatus,
}

impl NewSaleOrder {
    /// The total to store. A derived total is held to the same column limit
    /// as one typed into the form.
    pub fn total_for(&self, unit_price: Decimal) -> Result<Decimal, ValidationError> {
        match self.total_price {
            Some(total) => Ok(total),
            None => {
                let derived = unit_price
                    .checked_mul(Decimal::from(self.quantity))
                    .ok_or_else(|| ValidationError::new("total_price", "The total price is too large."))?;
                validation::amount_fits("total_price", derived.round_dp(2))
            }
        }
    }
}

impl SaleOrder {
    pub const REFERENCE_FIELDS: &'static [ConstraintField] =
        &[("sale_orders_product_id_fkey", "product", INVALID_CHOICE)];

    pub async fn listing<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<SaleOrderDisplay>, sqlx::Error> {
        sqlx::query_as::<_, SaleOrderDisplay>(
            r#"
            SELECT o.id, p.name AS product, o.quantity, o.total_price, o.sale_date, o.status
            FROM sale_orders o
            JOIN products p ON p.id = o.product_id
            ORDER BY o.sale_date DESC, o.id DESC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn find<'e, E: PgExecutor<'e>>(db: E, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SaleOrder>("SELECT * FROM sale_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create<'e, E: PgExecutor<'e>>(
        db: E,
        order: &NewSaleOrder,
        total_price: Decimal,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SaleOrder>(
            r#"
            INSERT INTO sale_orders (product_id, quantity, total_price, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order.product_id)
        .bind(order.quantity)
        .bind(total_price)
        .bind(order.status.as_str())
        .fetch_one(db)
        .await
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        order: &NewSaleOrder,
        total_price: Decimal,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SaleOrder>(
            r#"
            UPDATE sale_orders
            SET product_id = $1, quantity = $2, total_price = $3, status = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(order.product_id)
        .bind(order.quantity)
        .bind(total_price)
        .bind(order.status.as_str())
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn delete<'e, E: PgExecutor<'e>>(db: E, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sale_orders WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleOrderForm {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub total_price: String,
    #[serde(default)]
    pub status: String,
}

impl SaleOrderForm {
    pub fn validate(&self) -> Result<NewSaleOrder, FieldErrors> {
        let mut errors = FieldErrors::new();
        let product_id = validation::parse_reference(&mut errors, "product", &self.product, true);
        let quantity = validation::parse_integer(&mut errors, "quantity", &self.quantity);
        if let Some(quantity) = quantity {
            validation::check_min(&mut errors, "quantity", quantity, 1);
        }
        let total_price = if self.total_price.trim().is_empty() {
            None
        } else {
            validation::parse_amount(&mut errors, "total_price", &self.total_price)
        };
        let status = if self.status.trim().is_empty() {
            Some(SaleStatus::default())
        } else {
            validation::parse_choice::<SaleStatus>(&mut errors, "status", &self.status)
        };

        errors.finish(|| NewSaleOrder {
            product_id: product_id.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            total_price,
            status: status.unwrap_or_default(),
        })
    }
}

impl From<&SaleOrder> for SaleOrderForm {
    fn from(order: &SaleOrder) -> Self {
        Self {
            product: order.product_id.to_string(),
            quantity: order.quantity.to_string(),
            total_price: order.total_price.to_string(),
            status: order.status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_label() {
        for status in SaleStatus::ALL {
            assert_eq!(status.as_str().parse::<SaleStatus>(), Ok(status));
        }
        assert!("Shipped".parse::<SaleStatus>().is_err());
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
    }

    #[test]
    fn blank_status_defaults_to_pending() {
        let form = SaleOrderForm {
            product: "3".to_string(),
            quantity: "2".to_string(),
            total_price: "19.00".to_string(),
            status: String::new(),
        };
        let order = form.validate().unwrap();
        assert_eq!(order.status, SaleStatus::Pending);
        assert_eq!(order.total_price, Some(Decimal::new(1900, 2)));
    }

    #[test]
    fn blank_total_is_derived_from_unit_price() {
        let form = SaleOrderForm {
            product: "3".to_string(),
            quantity: "4".to_string(),
            total_price: String::new(),
            status: "Completed".to_string(),
        };
        let order = form.validate().unwrap();
        assert_eq!(order.total_price, None);
        assert_eq!(order.total_for(Decimal::new(1250, 2)), Ok(Decimal::new(5000, 2)));
    }

    #[test]
    fn derived_total_must_fit_the_column() {
        let order = NewSaleOrder {
            product_id: 3,
            quantity: 2,
            total_price: None,
            status: SaleStatus::Pending,
        };
        let err = order.total_for(Decimal::new(9_999_999_999, 2)).unwrap_err();
        assert_eq!(err.field, "total_price");
        assert_eq!(
            err.message,
            "Ensure that there are no more than 8 digits before the decimal point."
        );
        assert_eq!(order.total_for(Decimal::new(4_999_999_999, 2)), Ok(Decimal::new(9_999_999_998, 2)));
    }

    #[test]
    fn unknown_status_and_zero_quantity_are_rejected() {
        let form = SaleOrderForm {
            product: "3".to_string(),
            quantity: "0".to_string(),
            total_price: String::new(),
            status: "Shipped".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("quantity"));
        assert!(errors.has("status"));
    }
}
