use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::validation::{self, FieldErrors, NON_FIELD, REQUIRED};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl User {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_username<'e, E: PgExecutor<'e>>(
        db: E,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(db)
            .await
    }

    pub async fn create<'e, E: PgExecutor<'e>>(
        db: E,
        user: &CreateUser,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}

fn username_regex() -> &'static Regex {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    USERNAME.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern compiles"))
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<CreateUser, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = validation::required_text(&mut errors, "username", &self.username, 150);
        if !username.is_empty() && !username_regex().is_match(&username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        let email = validation::required_email(&mut errors, "email", &self.email);

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        } else {
            if self.password1.chars().count() < 8 {
                errors.add(
                    "password2",
                    "This password is too short. It must contain at least 8 characters.",
                );
            }
            if self.password1.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password2", "This password is entirely numeric.");
            }
        }

        errors.finish(|| CreateUser {
            username,
            email,
            password: self.password1.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.finish(|| ())
    }

    pub fn invalid_credentials() -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.add(
            NON_FIELD,
            "Please enter a correct username and password. Note that both fields may be case-sensitive.",
        );
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, password1: &str, password2: &str) -> SignupForm {
        SignupForm {
            username: username.to_string(),
            email: "ops@acme.example".to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn valid_signup_produces_create_user() {
        let user = signup("warehouse_lead", "correct horse", "correct horse")
            .validate()
            .unwrap();
        assert_eq!(user.username, "warehouse_lead");
        assert_eq!(user.email, "ops@acme.example");
        assert_eq!(user.password, "correct horse");
    }

    #[test]
    fn mismatched_passwords_are_reported_on_the_confirmation() {
        let errors = signup("lead", "correct horse", "battery staple")
            .validate()
            .unwrap_err();
        assert_eq!(errors.message("password2"), "The two password fields didn't match.");
    }

    #[test]
    fn weak_passwords_are_rejected() {
        let errors = signup("lead", "1234567", "1234567").validate().unwrap_err();
        let message = errors.message("password2");
        assert!(message.contains("too short"));
        assert!(message.contains("entirely numeric"));
    }

    #[test]
    fn usernames_are_restricted_to_word_characters() {
        let errors = signup("bad name!", "correct horse", "correct horse")
            .validate()
            .unwrap_err();
        assert!(errors.has("username"));
        assert!(!errors.has("password2"));
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("password"));
        assert!(LoginForm::invalid_credentials().has(NON_FIELD));
    }
}
