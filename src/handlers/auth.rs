use askama::Template;
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::{Cookie, Cookies};

use super::{render, render_response};
use crate::{
    database::constraint_errors,
    error::AppError,
    middleware::Layout,
    models::{LoginForm, SignupForm, User},
    state::AppState,
    utils::{
        auth::{AUTH_COOKIE, SESSION_HOURS},
        create_token, hash_password, verify_password,
    },
    validation::FieldErrors,
};

const USERNAME_TAKEN: &[crate::database::ConstraintField] =
    &[("users_username_key", "username", "A user with that username already exists.")];

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    layout: Layout,
    form: LoginForm,
    errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "signup.html")]
struct SignupTemplate {
    layout: Layout,
    form: SignupForm,
    errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "logout.html")]
struct LogoutTemplate {
    layout: Layout,
}

fn start_session(cookies: &Cookies, user: &User, secret: &str) -> Result<(), AppError> {
    let token = create_token(user.id, user.username.clone(), secret)?;

    let cookie = Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(SESSION_HOURS))
        .build();

    cookies.add(cookie);
    Ok(())
}

pub async fn login_page(cookies: Cookies) -> Result<Html<String>, AppError> {
    render(&LoginTemplate {
        layout: Layout::new(None, &cookies),
        form: LoginForm::default(),
        errors: FieldErrors::new(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return render_response(&LoginTemplate {
            layout: Layout::new(None, &cookies),
            form,
            errors,
        });
    }

    let user = User::find_by_username(&state.db, form.username.trim()).await?;
    let authenticated = match user {
        Some(user) if verify_password(&form.password, &user.password_hash)? => Some(user),
        _ => None,
    };

    match authenticated {
        Some(user) => {
            start_session(&cookies, &user, &state.settings.jwt_secret)?;
            log::info!("User {} logged in", user.username);
            Ok(Redirect::to("/dashboard/").into_response())
        }
        None => render_response(&LoginTemplate {
            layout: Layout::new(None, &cookies),
            form: LoginForm {
                password: String::new(),
                ..form
            },
            errors: LoginForm::invalid_credentials(),
        }),
    }
}

pub async fn signup_page(cookies: Cookies) -> Result<Html<String>, AppError> {
    render(&SignupTemplate {
        layout: Layout::new(None, &cookies),
        form: SignupForm::default(),
        errors: FieldErrors::new(),
    })
}

pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let new_user = match form.validate() {
        Ok(new_user) => new_user,
        Err(errors) => {
            return render_response(&SignupTemplate {
                layout: Layout::new(None, &cookies),
                form,
                errors,
            })
        }
    };

    let password_hash = hash_password(&new_user.password)?;

    let user = match User::create(&state.db, &new_user, &password_hash).await {
        Ok(user) => user,
        Err(e) => match constraint_errors(&e, USERNAME_TAKEN) {
            Some(errors) => {
                return render_response(&SignupTemplate {
                    layout: Layout::new(None, &cookies),
                    form,
                    errors,
                })
            }
            None => return Err(e.into()),
        },
    };

    log::info!("Registered user {}", user.username);
    start_session(&cookies, &user, &state.settings.jwt_secret)?;
    Ok(Redirect::to("/").into_response())
}

pub async fn logout(cookies: Cookies) -> Result<Html<String>, AppError> {
    cookies.remove(Cookie::build(AUTH_COOKIE).path("/").build());
    render(&LogoutTemplate {
        layout: Layout::new(None, &cookies),
    })
}
