use askama::Template;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use super::{category_options, render, render_response, ConfirmDeleteTemplate};
use crate::{
    database::constraint_errors,
    error::AppError,
    middleware::{push_flash, CurrentUser, FlashMessage, Layout},
    models::{Category, InventoryItem, ItemForm, SelectOption},
    state::AppState,
    validation::FieldErrors,
};

#[derive(Template)]
#[template(path = "item_form.html")]
struct ItemFormTemplate {
    layout: Layout,
    title: &'static str,
    action: String,
    form: ItemForm,
    errors: FieldErrors,
    categories: Vec<SelectOption>,
}

async fn form_page(
    state: &AppState,
    layout: Layout,
    title: &'static str,
    action: String,
    form: ItemForm,
    errors: FieldErrors,
) -> Result<Response, AppError> {
    let categories = Category::all(&state.db).await?;
    render_response(&ItemFormTemplate {
        layout,
        title,
        action,
        categories: category_options(&categories, &form.category),
        form,
        errors,
    })
}

pub async fn add_item_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Response, AppError> {
    let layout = Layout::for_user(&user, &cookies);
    form_page(&state, layout, "Add item", "/add-item/".to_string(), ItemForm::default(), FieldErrors::new()).await
}

pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Form(form): Form<ItemForm>,
) -> Result<Response, AppError> {
    let action = "/add-item/".to_string();
    let item = match form.validate() {
        Ok(item) => item,
        Err(errors) => {
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Add item", action, form, errors).await;
        }
    };
    let created = match InventoryItem::create(&state.db, user.id, &item).await {
        Ok(created) => created,
        Err(e) => {
            let errors = constraint_errors(&e, InventoryItem::REFERENCE_FIELDS).ok_or(e)?;
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Add item", action, form, errors).await;
        }
    };
    push_flash(&cookies, FlashMessage::success(format!("Item \"{}\" added.", created.name)));
    Ok(Redirect::to("/dashboard/").into_response())
}

pub async fn edit_item_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let item = InventoryItem::find_owned(&state.db, id, user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let layout = Layout::for_user(&user, &cookies);
    form_page(&state, layout, "Edit item", format!("/edit-item/{id}"), ItemForm::from(&item), FieldErrors::new()).await
}

pub async fn edit_item(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<ItemForm>,
) -> Result<Response, AppError> {
    InventoryItem::find_owned(&state.db, id, user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let action = format!("/edit-item/{id}");
    let item = match form.validate() {
        Ok(item) => item,
        Err(errors) => {
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Edit item", action, form, errors).await;
        }
    };
    let updated = match InventoryItem::update(&state.db, id, user.id, &item).await {
        Ok(updated) => updated.ok_or(AppError::NotFound)?,
        Err(e) => {
            let errors = constraint_errors(&e, InventoryItem::REFERENCE_FIELDS).ok_or(e)?;
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Edit item", action, form, errors).await;
        }
    };
    push_flash(&cookies, FlashMessage::success(format!("Item \"{}\" updated.", updated.name)));
    Ok(Redirect::to("/dashboard/").into_response())
}

pub async fn delete_item_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let item = InventoryItem::find_owned(&state.db, id, user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    render(&ConfirmDeleteTemplate {
        layout: Layout::for_user(&user, &cookies),
        kind: "item",
        object: item.name,
        note: "",
        action: format!("/delete-item/{id}"),
        cancel: "/dashboard/",
    })
}

pub async fn delete_item(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !InventoryItem::delete(&state.db, id, user.id).await? {
        return Err(AppError::NotFound);
    }
    push_flash(&cookies, FlashMessage::success("Item deleted."));
    Ok(Redirect::to("/dashboard/"))
}
