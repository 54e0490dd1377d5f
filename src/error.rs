use askama::Template;
use axum::{
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::middleware::{flash::flash_cookie, FlashMessage, Layout};
use crate::stock::StockError;

/// Failures that end a request. Validation problems are not errors here:
/// handlers re-render the form with its field errors instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("authentication required")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    /// A stock change the engine refused. Answered by sending the user back
    /// to the movement list with the reason, never with a server error.
    #[error("stock change rejected: {0}")]
    StockRejected(String),

    #[error("{0}")]
    Internal(&'static str),
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Database(e) => AppError::Database(e),
            StockError::ProductNotFound(_) | StockError::MovementNotFound(_) => AppError::NotFound,
            err @ StockError::InsufficientStock { .. } => AppError::StockRejected(err.to_string()),
            StockError::Overflow => AppError::Internal("stock quantity overflow"),
            StockError::Invalid(_) => AppError::Internal("unvalidated stock movement"),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    layout: Layout,
    status: u16,
    title: &'static str,
}

fn error_page(status: StatusCode, title: &'static str) -> Response {
    let template = ErrorTemplate {
        layout: Layout::default(),
        status: status.as_u16(),
        title,
    };
    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(_) => (status, title).into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => Redirect::to("/login/").into_response(),
            AppError::NotFound => error_page(StatusCode::NOT_FOUND, "Not Found"),
            AppError::StockRejected(reason) => {
                log::warn!("stock change rejected: {}", reason);
                let mut response = Redirect::to("/stock-movements/").into_response();
                let cookie = flash_cookie(&[FlashMessage::error(reason)]);
                if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                response
            }
            other => {
                log::error!("request failed: {}", other);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        }
    }
}
