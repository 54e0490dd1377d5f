use std::collections::HashMap;

use askama::Template;
use axum::{extract::State, response::Html};
use tower_cookies::Cookies;

use super::render;
use crate::{
    error::AppError,
    middleware::{CurrentUser, FlashMessage, Layout},
    models::{Category, InventoryItem, InventoryItemDisplay},
    monitor::LowInventoryAlert,
    state::AppState,
};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    layout: Layout,
    items: Vec<InventoryItemDisplay>,
    low_quantity: i32,
}

pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let items = InventoryItem::for_owner(&state.db, user.id).await?;
    let categories: HashMap<i64, String> = Category::all(&state.db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let threshold = state.settings.low_quantity;
    let alert = LowInventoryAlert::for_owner(&items, user.id, threshold);

    let items = items
        .into_iter()
        .map(|item| InventoryItemDisplay {
            id: item.id,
            low: alert.contains(item.id),
            category: item
                .category_id
                .and_then(|id| categories.get(&id).cloned())
                .unwrap_or_default(),
            created_at: item.created_at.format("%Y-%m-%d %H:%M").to_string(),
            name: item.name,
            quantity: item.quantity,
        })
        .collect();

    let mut layout = Layout::for_user(&user, &cookies);
    if let Some(message) = alert.message {
        layout.messages.push(FlashMessage::error(message));
    }

    render(&DashboardTemplate {
        layout,
        items,
        low_quantity: threshold,
    })
}
