use askama::Template;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use super::{render, render_response, ConfirmDeleteTemplate};
use crate::{
    database::constraint_errors,
    error::AppError,
    middleware::{push_flash, CurrentUser, FlashMessage, Layout},
    models::{Supplier, SupplierForm},
    state::AppState,
    validation::FieldErrors,
};

#[derive(Template)]
#[template(path = "supplier_list.html")]
struct SupplierListTemplate {
    layout: Layout,
    suppliers: Vec<Supplier>,
}

#[derive(Template)]
#[template(path = "supplier_form.html")]
struct SupplierFormTemplate {
    layout: Layout,
    title: &'static str,
    action: String,
    form: SupplierForm,
    errors: FieldErrors,
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let suppliers = Supplier::all(&state.db).await?;
    render(&SupplierListTemplate {
        layout: Layout::for_user(&user, &cookies),
        suppliers,
    })
}

pub async fn add_supplier_page(user: CurrentUser, cookies: Cookies) -> Result<Html<String>, AppError> {
    render(&SupplierFormTemplate {
        layout: Layout::for_user(&user, &cookies),
        title: "Add supplier",
        action: "/suppliers/add/".to_string(),
        form: SupplierForm::default(),
        errors: FieldErrors::new(),
    })
}

pub async fn add_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Form(form): Form<SupplierForm>,
) -> Result<Response, AppError> {
    let rerender = |form: SupplierForm, errors: FieldErrors| {
        render_response(&SupplierFormTemplate {
            layout: Layout::for_user(&user, &cookies),
            title: "Add supplier",
            action: "/suppliers/add/".to_string(),
            form,
            errors,
        })
    };

    let supplier = match form.validate() {
        Ok(supplier) => supplier,
        Err(errors) => return rerender(form, errors),
    };

    match Supplier::create(&state.db, &supplier).await {
        Ok(created) => {
            push_flash(&cookies, FlashMessage::success(format!("Supplier \"{}\" added.", created.name)));
            Ok(Redirect::to("/suppliers/").into_response())
        }
        Err(e) => match constraint_errors(&e, Supplier::UNIQUE_FIELDS) {
            Some(errors) => rerender(form, errors),
            None => Err(e.into()),
        },
    }
}

pub async fn edit_supplier_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let supplier = Supplier::find(&state.db, id).await?.ok_or(AppError::NotFound)?;
    render(&SupplierFormTemplate {
        layout: Layout::for_user(&user, &cookies),
        title: "Edit supplier",
        action: format!("/suppliers/edit/{id}/"),
        form: SupplierForm::from(&supplier),
        errors: FieldErrors::new(),
    })
}

pub async fn edit_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<SupplierForm>,
) -> Result<Response, AppError> {
    Supplier::find(&state.db, id).await?.ok_or(AppError::NotFound)?;

    let rerender = |form: SupplierForm, errors: FieldErrors| {
        render_response(&SupplierFormTemplate {
            layout: Layout::for_user(&user, &cookies),
            title: "Edit supplier",
            action: format!("/suppliers/edit/{id}/"),
            form,
            errors,
        })
    };

    let supplier = match form.validate() {
        Ok(supplier) => supplier,
        Err(errors) => return rerender(form, errors),
    };

    match Supplier::update(&state.db, id, &supplier).await {
        Ok(Some(updated)) => {
            push_flash(&cookies, FlashMessage::success(format!("Supplier \"{}\" updated.", updated.name)));
            Ok(Redirect::to("/suppliers/").into_response())
        }
        Ok(None) => Err(AppError::NotFound),
        Err(e) => match constraint_errors(&e, Supplier::UNIQUE_FIELDS) {
            Some(errors) => rerender(form, errors),
            None => Err(e.into()),
        },
    }
}

pub async fn delete_supplier_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let supplier = Supplier::find(&state.db, id).await?.ok_or(AppError::NotFound)?;

    render(&ConfirmDeleteTemplate {
        layout: Layout::for_user(&user, &cookies),
        kind: "supplier",
        object: supplier.name,
        note: "Products from this supplier will be kept without a supplier.",
        action: format!("/suppliers/delete/{id}/"),
        cancel: "/suppliers/",
    })
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    _user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !Supplier::delete(&state.db, id).await? {
        return Err(AppError::NotFound);
    }
    push_flash(&cookies, FlashMessage::success("Supplier deleted."));
    Ok(Redirect::to("/suppliers/"))
}
