use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::User,
    state::AppState,
    utils::{auth::AUTH_COOKIE, verify_token},
};

/// The signed-in user. Extracting it from a request of an anonymous visitor
/// rejects with [`AppError::Unauthorized`], which redirects to the login page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Resolves the session cookie to a user. Anonymous when the cookie is
/// missing, the token does not verify, or the user no longer exists.
pub async fn get_current_user(cookies: &Cookies, state: &AppState) -> Option<CurrentUser> {
    let token = cookies.get(AUTH_COOKIE)?.value().to_string();

    let claims = verify_token(&token, &state.settings.jwt_secret).ok()?;
    let user_id = claims.user_id()?;

    match User::find_by_id(&state.db, user_id).await {
        Ok(user) => user.map(CurrentUser::from),
        Err(e) => {
            log::error!("Failed to load user {}: {}", user_id, e);
            None
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Internal("cookie manager layer is not installed"))?;

        get_current_user(&cookies, state)
            .await
            .ok_or(AppError::Unauthorized)
    }
}
