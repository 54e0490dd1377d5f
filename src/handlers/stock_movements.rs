use askama::Template;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{product_options, render, render_response, ConfirmDeleteTemplate};
use crate::{
    error::AppError,
    middleware::{push_flash, CurrentUser, FlashMessage, Layout},
    models::{MovementType, Product, SelectOption, StockMovement, StockMovementDisplay, StockMovementForm},
    state::AppState,
    stock::{self, StockError},
    validation::{FieldErrors, INVALID_CHOICE},
};

#[derive(Template)]
#[template(path = "stock_movement_list.html")]
struct StockMovementListTemplate {
    layout: Layout,
    movements: Vec<StockMovementDisplay>,
}

#[derive(Template)]
#[template(path = "stock_movement_form.html")]
struct StockMovementFormTemplate {
    layout: Layout,
    form: StockMovementForm,
    errors: FieldErrors,
    products: Vec<SelectOption>,
    movement_types: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "stock_movement_edit.html")]
struct StockMovementEditTemplate {
    layout: Layout,
    action: String,
    product: String,
    movement: StockMovement,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub notes: String,
}

async fn form_page(
    state: &AppState,
    layout: Layout,
    form: StockMovementForm,
    errors: FieldErrors,
) -> Result<Response, AppError> {
    let products = Product::all(&state.db).await?;
    let movement_types = MovementType::ALL
        .iter()
        .map(|t| SelectOption::new(t, t.as_str(), &form.movement_type))
        .collect();

    render_response(&StockMovementFormTemplate {
        layout,
        products: product_options(&products, &form.product),
        movement_types,
        form,
        errors,
    })
}

pub async fn list_stock_movements(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let movements = StockMovement::listing(&state.db).await?;
    render(&StockMovementListTemplate {
        layout: Layout::for_user(&user, &cookies),
        movements,
    })
}

pub async fn add_stock_movement_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Response, AppError> {
    let layout = Layout::for_user(&user, &cookies);
    form_page(&state, layout, StockMovementForm::default(), FieldErrors::new()).await
}

/// Posts a movement. A rejected `Out` leaves stock untouched and sends the
/// user back to the form with an error flash.
pub async fn add_stock_movement(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Form(form): Form<StockMovementForm>,
) -> Result<Response, AppError> {
    let movement = match form.validate() {
        Ok(movement) => movement,
        Err(errors) => {
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, form, errors).await;
        }
    };

    match stock::post_movement(&state.db, &movement).await {
        Ok((product, _)) => {
            push_flash(
                &cookies,
                FlashMessage::success(format!(
                    "Stock movement recorded. {} now has {} in stock.",
                    product.name, product.stock_quantity
                )),
            );
            Ok(Redirect::to("/stock-movements/").into_response())
        }
        Err(err @ StockError::InsufficientStock { .. }) => {
            push_flash(&cookies, FlashMessage::error(err.to_string()));
            Ok(Redirect::to("/add-stock-movement/").into_response())
        }
        Err(StockError::ProductNotFound(_)) => {
            let mut errors = FieldErrors::new();
            errors.add("product", INVALID_CHOICE);
            let layout = Layout::for_user(&user, &cookies);
            form_page(&state, layout, form, errors).await
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_stock_movement_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let movement = StockMovement::find(&state.db, id).await?.ok_or(AppError::NotFound)?;
    let product = Product::find(&state.db, movement.product_id)
        .await?
        .map(|p| p.name)
        .unwrap_or_default();

    render(&StockMovementEditTemplate {
        layout: Layout::for_user(&user, &cookies),
        action: format!("/stock-movements/edit/{id}/"),
        product,
        movement,
    })
}

/// Quantity, direction and product are fixed once posted; only notes change.
pub async fn edit_stock_movement(
    State(state): State<AppState>,
    _user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<NotesForm>,
) -> Result<Redirect, AppError> {
    StockMovement::update_notes(&state.db, id, form.notes.trim())
        .await?
        .ok_or(AppError::NotFound)?;

    push_flash(&cookies, FlashMessage::success("Stock movement updated."));
    Ok(Redirect::to("/stock-movements/"))
}

pub async fn delete_stock_movement_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let movement = StockMovement::find(&state.db, id).await?.ok_or(AppError::NotFound)?;
    let product = Product::find(&state.db, movement.product_id)
        .await?
        .map(|p| p.name)
        .unwrap_or_default();

    render(&ConfirmDeleteTemplate {
        layout: Layout::for_user(&user, &cookies),
        kind: "stock movement",
        object: format!("{} {} of {}", movement.movement_type, movement.quantity, product),
        note: "The product's stock will be adjusted to undo this movement.",
        action: format!("/stock-movements/delete/{id}/"),
        cancel: "/stock-movements/",
    })
}

pub async fn delete_stock_movement(
    State(state): State<AppState>,
    _user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    match stock::reverse_movement(&state.db, id).await {
        Ok(product) => {
            push_flash(
                &cookies,
                FlashMessage::success(format!(
                    "Stock movement deleted. {} now has {} in stock.",
                    product.name, product.stock_quantity
                )),
            );
        }
        Err(StockError::InsufficientStock { .. }) => {
            push_flash(
                &cookies,
                FlashMessage::error("This movement cannot be deleted: its stock has already been moved out."),
            );
        }
        Err(err) => return Err(err.into()),
    }
    Ok(Redirect::to("/stock-movements/"))
}
