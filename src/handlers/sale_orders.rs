use askama::Template;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tower_cookies::Cookies;

use super::{product_options, render, render_response, ConfirmDeleteTemplate};
use crate::{
    database::constraint_errors,
    error::AppError,
    filters,
    middleware::{push_flash, CurrentUser, FlashMessage, Layout},
    models::{NewSaleOrder, Product, SaleOrder, SaleOrderDisplay, SaleOrderForm, SaleStatus, SelectOption},
    state::AppState,
    validation::{FieldErrors, ValidationError, INVALID_CHOICE},
};

#[derive(Template)]
#[template(path = "sale_order_list.html")]
struct SaleOrderListTemplate {
    layout: Layout,
    orders: Vec<SaleOrderDisplay>,
}

#[derive(Template)]
#[template(path = "sale_order_form.html")]
struct SaleOrderFormTemplate {
    layout: Layout,
    title: &'static str,
    action: String,
    form: SaleOrderForm,
    errors: FieldErrors,
    products: Vec<SelectOption>,
    statuses: Vec<SelectOption>,
}

async fn form_page(
    state: &AppState,
    layout: Layout,
    title: &'static str,
    action: String,
    form: SaleOrderForm,
    errors: FieldErrors,
) -> Result<Response, AppError> {
    let products = Product::all(&state.db).await?;
    let current_status = if form.status.is_empty() {
        SaleStatus::default().as_str()
    } else {
        form.status.as_str()
    };
    let statuses = SaleStatus::ALL
        .iter()
        .map(|s| SelectOption::new(s, s.as_str(), current_status))
        .collect();

    render_response(&SaleOrderFormTemplate {
        layout,
        title,
        action,
        products: product_options(&products, &form.product),
        statuses,
        form,
        errors,
    })
}

type Resolved = Result<(NewSaleOrder, Decimal), FieldErrors>;

/// Validates the form and prices the order against the chosen product.
/// The outer error aborts the request; the inner one re-renders the form.
async fn resolve(state: &AppState, form: &SaleOrderForm) -> Result<Resolved, AppError> {
    let order = match form.validate() {
        Ok(order) => order,
        Err(errors) => return Ok(Err(errors)),
    };
    match Product::find(&state.db, order.product_id).await? {
        Some(product) => match order.total_for(product.price) {
            Ok(total) => Ok(Ok((order, total))),
            Err(e) => Ok(Err(e.into())),
        },
        None => Ok(Err(ValidationError::new("product", INVALID_CHOICE).into())),
    }
}

pub async fn list_sale_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let orders = SaleOrder::listing(&state.db).await?;
    render(&SaleOrderListTemplate {
        layout: Layout::for_user(&user, &cookies),
        orders,
    })
}

pub async fn add_sale_order_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Response, AppError> {
    let layout = Layout::for_user(&user, &cookies);
    form_page(
        &state,
        layout,
        "Add sale order",
        "/sale-orders/add/".to_string(),
        SaleOrderForm::default(),
        FieldErrors::new(),
    )
    .await
}

pub async fn add_sale_order(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Form(form): Form<SaleOrderForm>,
) -> Result<Response, AppError> {
    let action = "/sale-orders/add/".to_string();
    let (order, total) = match resolve(&state, &form).await? {
        Ok(resolved) => resolved,
        Err(errors) => {
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Add sale order", action, form, errors).await;
        }
    };

    let created = match SaleOrder::create(&state.db, &order, total).await {
        Ok(created) => created,
        Err(e) => {
            let errors = constraint_errors(&e, SaleOrder::REFERENCE_FIELDS).ok_or(e)?;
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Add sale order", action, form, errors).await;
        }
    };

    log::info!("sale order {} recorded for product {}", created.id, created.product_id);
    push_flash(&cookies, FlashMessage::success("Sale order added."));
    Ok(Redirect::to("/sale-orders/").into_response())
}

pub async fn edit_sale_order_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let order = SaleOrder::find(&state.db, id).await?.ok_or(AppError::NotFound)?;
    let layout = Layout::for_user(&user, &cookies);
    form_page(
        &state,
        layout,
        "Edit sale order",
        format!("/sale-orders/edit/{id}/"),
        SaleOrderForm::from(&order),
        FieldErrors::new(),
    )
    .await
}

pub async fn edit_sale_order(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<SaleOrderForm>,
) -> Result<Response, AppError> {
    SaleOrder::find(&state.db, id).await?.ok_or(AppError::NotFound)?;

    let action = format!("/sale-orders/edit/{id}/");
    let (order, total) = match resolve(&state, &form).await? {
        Ok(resolved) => resolved,
        Err(errors) => {
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Edit sale order", action, form, errors).await;
        }
    };

    match SaleOrder::update(&state.db, id, &order, total).await {
        Ok(updated) => {
            updated.ok_or(AppError::NotFound)?;
        }
        Err(e) => {
            let errors = constraint_errors(&e, SaleOrder::REFERENCE_FIELDS).ok_or(e)?;
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Edit sale order", action, form, errors).await;
        }
    }

    push_flash(&cookies, FlashMessage::success("Sale order updated."));
    Ok(Redirect::to("/sale-orders/").into_response())
}

pub async fn delete_sale_order_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let order = SaleOrder::find(&state.db, id).await?.ok_or(AppError::NotFound)?;
    let product = Product::find(&state.db, order.product_id)
        .await?
        .map(|p| p.name)
        .unwrap_or_default();

    render(&ConfirmDeleteTemplate {
        layout: Layout::for_user(&user, &cookies),
        kind: "sale order",
        object: format!("#{} ({} × {})", order.id, order.quantity, product),
        note: "",
        action: format!("/sale-orders/delete/{id}/"),
        cancel: "/sale-orders/",
    })
}

pub async fn delete_sale_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !SaleOrder::delete(&state.db, id).await? {
        return Err(AppError::NotFound);
    }
    push_flash(&cookies, FlashMessage::success("Sale order deleted."));
    Ok(Redirect::to("/sale-orders/"))
}
