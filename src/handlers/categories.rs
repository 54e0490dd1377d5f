use askama::Template;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use super::{render, render_response, ConfirmDeleteTemplate};
use crate::{
    error::AppError,
    middleware::{push_flash, CurrentUser, FlashMessage, Layout},
    models::{Category, CategoryForm},
    state::AppState,
    validation::FieldErrors,
};

#[derive(Template)]
#[template(path = "category_list.html")]
struct CategoryListTemplate {
    layout: Layout,
    categories: Vec<Category>,
}

#[derive(Template)]
#[template(path = "category_form.html")]
struct CategoryFormTemplate {
    layout: Layout,
    title: &'static str,
    action: String,
    form: CategoryForm,
    errors: FieldErrors,
}

pub async fn list_categories(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let categories = Category::all(&state.db).await?;
    render(&CategoryListTemplate {
        layout: Layout::for_user(&user, &cookies),
        categories,
    })
}

pub async fn add_category_page(user: CurrentUser, cookies: Cookies) -> Result<Html<String>, AppError> {
    render(&CategoryFormTemplate {
        layout: Layout::for_user(&user, &cookies),
        title: "Add category",
        action: "/categories/add/".to_string(),
        form: CategoryForm::default(),
        errors: FieldErrors::new(),
    })
}

pub async fn add_category(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Form(form): Form<CategoryForm>,
) -> Result<Response, AppError> {
    let name = match form.validate() {
        Ok(name) => name,
        Err(errors) => {
            return render_response(&CategoryFormTemplate {
                layout: Layout::for_user(&user, &cookies),
                title: "Add category",
                action: "/categories/add/".to_string(),
                form,
                errors,
            })
        }
    };

    let category = Category::create(&state.db, &name).await?;
    push_flash(&cookies, FlashMessage::success(format!("Category \"{}\" added.", category.name)));
    Ok(Redirect::to("/categories/").into_response())
}

pub async fn edit_category_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let category = Category::find(&state.db, id).await?.ok_or(AppError::NotFound)?;
    render(&CategoryFormTemplate {
        layout: Layout::for_user(&user, &cookies),
        title: "Edit category",
        action: format!("/categories/edit/{id}/"),
        form: CategoryForm::from(&category),
        errors: FieldErrors::new(),
    })
}

pub async fn edit_category(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> Result<Response, AppError> {
    let name = match form.validate() {
        Ok(name) => name,
        Err(errors) => {
            Category::find(&state.db, id).await?.ok_or(AppError::NotFound)?;
            return render_response(&CategoryFormTemplate {
                layout: Layout::for_user(&user, &cookies),
                title: "Edit category",
                action: format!("/categories/edit/{id}/"),
                form,
                errors,
            });
        }
    };

    let category = Category::update(&state.db, id, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    push_flash(&cookies, FlashMessage::success(format!("Category \"{}\" updated.", category.name)));
    Ok(Redirect::to("/categories/").into_response())
}

pub async fn delete_category_page(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let category = Category::find(&state.db, id).await?.ok_or(AppError::NotFound)?;

    render(&ConfirmDeleteTemplate {
        layout: Layout::for_user(&user, &cookies),
        kind: "category",
        object: category.name,
        note: "Products and items in this category will be kept without one.",
        action: format!("/categories/delete/{id}/"),
        cancel: "/categories/",
    })
}

pub async fn delete_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !Category::delete(&state.db, id).await? {
        return Err(AppError::NotFound);
    }
    push_flash(&cookies, FlashMessage::success("Category deleted."));
    Ok(Redirect::to("/categories/"))
}
