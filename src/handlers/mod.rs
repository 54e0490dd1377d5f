pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod items;
pub mod products;
pub mod sale_orders;
pub mod stock_movements;
pub mod suppliers;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    middleware::{get_current_user, Layout},
    models::{Category, Product, SelectOption, Supplier},
    state::AppState,
};

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// Renders a page that answers a form submission.
pub fn render_response<T: Template>(template: &T) -> Result<Response, AppError> {
    Ok(render(template)?.into_response())
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    layout: Layout,
}

pub async fn index(State(state): State<AppState>, cookies: Cookies) -> Result<Html<String>, AppError> {
    let user = get_current_user(&cookies, &state).await;
    render(&IndexTemplate {
        layout: Layout::new(user.as_ref(), &cookies),
    })
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Shared "are you sure?" page. Posting to `action` performs the delete.
#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub layout: Layout,
    pub kind: &'static str,
    pub object: String,
    pub note: &'static str,
    pub action: String,
    pub cancel: &'static str,
}

pub(crate) fn category_options(categories: &[Category], current: &str) -> Vec<SelectOption> {
    categories
        .iter()
        .map(|c| SelectOption::new(c.id, c.name.clone(), current))
        .collect()
}

pub(crate) fn supplier_options(suppliers: &[Supplier], current: &str) -> Vec<SelectOption> {
    suppliers
        .iter()
        .map(|s| SelectOption::new(s.id, s.name.clone(), current))
        .collect()
}

pub(crate) fn product_options(products: &[Product], current: &str) -> Vec<SelectOption> {
    products
        .iter()
        .map(|p| SelectOption::new(p.id, p.name.clone(), current))
        .collect()
}
