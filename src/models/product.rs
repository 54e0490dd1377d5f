use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgExecutor};

use super::id_field;
use crate::database::{ConstraintField, Database};
use crate::validation::{self, FieldErrors, INVALID_CHOICE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub supplier_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductDisplay {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub supplier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category_id: i64,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub supplier_id: Option<i64>,
}

impl Product {
    pub const REFERENCE_FIELDS: &'static [ConstraintField] = &[
        ("products_category_id_fkey", "category", INVALID_CHOICE),
        ("products_supplier_id_fkey", "supplier", INVALID_CHOICE),
    ];

    pub async fn all<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name, id")
            .fetch_all(db)
            .await
    }

    pub async fn listing<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<ProductDisplay>, sqlx::Error> {
        sqlx::query_as::<_, ProductDisplay>(
            r#"
            SELECT
                p.id,
                p.name,
                p.description,
                COALESCE(c.name, '') AS category,
                p.price,
                p.stock_quantity,
                COALESCE(s.name, '') AS supplier
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            ORDER BY p.name, p.id
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn find<'e, E: PgExecutor<'e>>(db: E, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Reads the product and holds its row lock until the surrounding transaction ends.
    pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn save_stock(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE products SET stock_quantity = $1 WHERE id = $2")
            .bind(self.stock_quantity)
            .bind(self.id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn create<'e, E: PgExecutor<'e>>(db: E, product: &NewProduct) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, category_id, price, stock_quantity, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(product.supplier_id)
        .fetch_one(db)
        .await
    }

    /// Updates the catalogue fields. `stock_quantity` is left alone: after
    /// creation it only changes through posted stock movements.
    pub async fn update<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        product: &NewProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $1, description = $2, category_id = $3, price = $4, supplier_id = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.price)
        .bind(product.supplier_id)
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Deletes the product together with its sale orders and stock movements.
    pub async fn delete(db: &Database, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = db.begin().await?;

        if Self::lock(&mut *tx, id).await?.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM sale_orders WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM stock_movements WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock_quantity: String,
    #[serde(default)]
    pub supplier: String,
}

impl ProductForm {
    pub fn validate(&self) -> Result<NewProduct, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = validation::required_text(&mut errors, "name", &self.name, 255);
        let description = self.description.trim().to_string();
        let category_id = validation::parse_reference(&mut errors, "category", &self.category, true);
        let price = validation::parse_amount(&mut errors, "price", &self.price);
        let stock_quantity = validation::parse_integer(&mut errors, "stock_quantity", &self.stock_quantity);
        if let Some(quantity) = stock_quantity {
            validation::check_min(&mut errors, "stock_quantity", quantity, 0);
        }
        let supplier_id = validation::parse_reference(&mut errors, "supplier", &self.supplier, false);

        errors.finish(|| NewProduct {
            name,
            description,
            category_id: category_id.unwrap_or_default(),
            price: price.unwrap_or_default(),
            stock_quantity: stock_quantity.unwrap_or_default(),
            supplier_id,
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: id_field(product.category_id),
            price: product.price.to_string(),
            stock_quantity: product.stock_quantity.to_string(),
            supplier: id_field(product.supplier_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Hex bolt M8".to_string(),
            description: "Zinc plated".to_string(),
            category: "2".to_string(),
            price: "0.35".to_string(),
            stock_quantity: "500".to_string(),
            supplier: String::new(),
        }
    }

    #[test]
    fn valid_product_form() {
        let product = form().validate().unwrap();
        assert_eq!(product.category_id, 2);
        assert_eq!(product.price, Decimal::new(35, 2));
        assert_eq!(product.stock_quantity, 500);
        assert_eq!(product.supplier_id, None);
    }

    #[test]
    fn category_is_required() {
        let mut f = form();
        f.category = String::new();
        assert!(f.validate().unwrap_err().has("category"));
    }

    #[test]
    fn stock_quantity_cannot_be_negative() {
        let mut f = form();
        f.stock_quantity = "-1".to_string();
        let errors = f.validate().unwrap_err();
        assert_eq!(
            errors.message("stock_quantity"),
            "Ensure this value is greater than or equal to 0."
        );
    }

    #[test]
    fn price_keeps_two_decimal_places() {
        let mut f = form();
        f.price = "0.355".to_string();
        assert!(f.validate().unwrap_err().has("price"));
    }
}
