use askama::Template;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use super::{category_options, render, render_response, supplier_options, ConfirmDeleteTemplate};
use crate::{
    database::constraint_errors,
    error::AppError,
    filters,
    middleware::{push_flash, CurrentUser, FlashMessage, Layout},
    models::{Category, Product, ProductDisplay, ProductForm, SelectOption, Supplier},
    state::AppState,
    validation::FieldErrors,
};

#[derive(Template)]
#[template(path = "product_list.html")]
struct ProductListTemplate {
    layout: Layout,
    products: Vec<ProductDisplay>,
}

#[derive(Template)]
#[template(path = "product_form.html")]
struct ProductFormTemplate {
    layout: Layout,
    title: &'static str,
    action: String,
    form: ProductForm,
    errors: FieldErrors,
    categories: Vec<SelectOption>,
    suppliers: Vec<SelectOption>,
    /// Set when editing; stock then only moves through stock movements.
    stock_locked: bool,
}

async fn form_page(
    state: &AppState,
    layout: Layout,
    title: &'static str,
    action: String,
    form: ProductForm,
    errors: FieldErrors,
    stock_locked: bool,
) -> Result<Response, AppError> {
    let categories = Category::all(&state.db).await?;
    let suppliers = Supplier::all(&state.db).await?;
    render_response(&ProductFormTemplate {
        layout,
        title,
        action,
        categories: category_options(&categories, &form.category),
        suppliers: supplier_options(&suppliers, &form.supplier),
        form,
        errors,
        stock_locked,
    })
}

pub async fn list_products(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let products = Product::listing(&state.db).await?;
    render(&ProductListTemplate {
        layout: Layout::for_user(&user, &cookies),
        products,
    })
}

pub async fn add_product_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Response, AppError> {
    let layout = Layout::for_user(&user, &cookies);
    form_page(
        &state,
        layout,
        "Add product",
        "/add-product/".to_string(),
        ProductForm::default(),
        FieldErrors::new(),
        false,
    )
    .await
}

pub async fn add_product(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let action = "/add-product/".to_string();
    let product = match form.validate() {
        Ok(product) => product,
        Err(errors) => {
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Add product", action, form, errors, false).await;
        }
    };

    let created = match Product::create(&state.db, &product).await {
        Ok(created) => created,
        Err(e) => {
            let errors = constraint_errors(&e, Product::REFERENCE_FIELDS).ok_or(e)?;
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Add product", action, form, errors, false).await;
        }
    };

    push_flash(&cookies, FlashMessage::success(format!("Product \"{}\" added.", created.name)));
    Ok(Redirect::to("/products/").into_response())
}

pub async fn edit_product_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let product = Product::find(&state.db, id).await?.ok_or(AppError::NotFound)?;
    let layout = Layout::for_user(&user, &cookies);
    form_page(
        &state,
        layout,
        "Edit product",
        format!("/edit-product/{id}/"),
        ProductForm::from(&product),
        FieldErrors::new(),
        true,
    )
    .await
}

pub async fn edit_product(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    Product::find(&state.db, id).await?.ok_or(AppError::NotFound)?;

    let action = format!("/edit-product/{id}/");
    let product = match form.validate() {
        Ok(product) => product,
        Err(errors) => {
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Edit product", action, form, errors, true).await;
        }
    };

    let updated = match Product::update(&state.db, id, &product).await {
        Ok(updated) => updated.ok_or(AppError::NotFound)?,
        Err(e) => {
            let errors = constraint_errors(&e, Product::REFERENCE_FIELDS).ok_or(e)?;
            let layout = Layout::for_user(&user, &cookies);
            return form_page(&state, layout, "Edit product", action, form, errors, true).await;
        }
    };

    push_flash(&cookies, FlashMessage::success(format!("Product \"{}\" updated.", updated.name)));
    Ok(Redirect::to("/products/").into_response())
}

pub async fn delete_product_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let product = Product::find(&state.db, id).await?.ok_or(AppError::NotFound)?;

    render(&ConfirmDeleteTemplate {
        layout: Layout::for_user(&user, &cookies),
        kind: "product",
        object: product.name,
        note: "Its sale orders and stock movements will be deleted as well.",
        action: format!("/delete-product/{id}/"),
        cancel: "/products/",
    })
}

pub async fn delete_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !Product::delete(&state.db, id).await? {
        return Err(AppError::NotFound);
    }
    push_flash(&cookies, FlashMessage::success("Product deleted."));
    Ok(Redirect::to("/products/"))
}
