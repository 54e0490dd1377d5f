use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use crate::database::{ConstraintField, Database};
use crate::validation::{self, FieldErrors, REQUIRED};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSupplier {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Supplier {
    pub const UNIQUE_FIELDS: &'static [ConstraintField] = &[
        ("suppliers_email_key", "email", "Supplier with this Email already exists."),
        ("suppliers_phone_key", "phone", "Supplier with this Phone already exists."),
    ];

    pub async fn all<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name, id")
            .fetch_all(db)
            .await
    }

    pub async fn find<'e, E: PgExecutor<'e>>(db: E, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create<'e, E: PgExecutor<'e>>(db: E, supplier: &NewSupplier) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, email, phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .fetch_one(db)
        .await
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        supplier: &NewSupplier,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, email = $2, phone = $3, address = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Deletes the supplier after clearing it from the products it supplied.
    pub async fn delete(db: &Database, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE products SET supplier_id = NULL WHERE supplier_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SupplierForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl SupplierForm {
    pub fn validate(&self) -> Result<NewSupplier, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = validation::required_text(&mut errors, "name", &self.name, 255);
        let email = validation::required_email(&mut errors, "email", &self.email);
        let phone = validation::required_text(&mut errors, "phone", &self.phone, 10);

        let address = self.address.trim().to_string();
        if address.is_empty() {
            errors.add("address", REQUIRED);
        }

        errors.finish(|| NewSupplier {
            name,
            email,
            phone,
            address,
        })
    }
}

impl From<&Supplier> for SupplierForm {
    fn from(supplier: &Supplier) -> Self {
        Self {
            name: supplier.name.clone(),
            email: supplier.email.clone(),
            phone: supplier.phone.clone(),
            address: supplier.address.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::constraint_errors;

    fn form(email: &str, phone: &str) -> SupplierForm {
        SupplierForm {
            name: "Acme Components".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: "1 Foundry Lane".to_string(),
        }
    }

    #[test]
    fn valid_supplier() {
        let supplier = form("sales@acme.example", "5551234567").validate().unwrap();
        assert_eq!(supplier.email, "sales@acme.example");
        assert_eq!(supplier.phone, "5551234567");
    }

    #[test]
    fn phone_is_limited_to_ten_characters() {
        let errors = form("sales@acme.example", "555-123-4567").validate().unwrap_err();
        assert!(errors.has("phone"));
        assert!(!errors.has("email"));
    }

    #[test]
    fn email_must_be_well_formed() {
        let errors = form("sales at acme", "5551234567").validate().unwrap_err();
        assert_eq!(errors.message("email"), "Enter a valid email address.");
    }

    #[test]
    fn non_constraint_errors_are_not_translated() {
        assert!(constraint_errors(&sqlx::Error::RowNotFound, Supplier::UNIQUE_FIELDS).is_none());
    }
}
