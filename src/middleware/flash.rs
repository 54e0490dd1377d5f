//! One-shot messages carried to the next rendered page in a cookie.

use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};

use super::CurrentUser;

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        self.level.as_str()
    }
}

fn encode(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    urlencoding::encode(&json).into_owned()
}

fn decode(raw: &str) -> Vec<FlashMessage> {
    urlencoding::decode(raw)
        .ok()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

fn read(cookies: &Cookies) -> Vec<FlashMessage> {
    cookies
        .get(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

/// Queues a message for the next page.
pub fn push_flash(cookies: &Cookies, message: FlashMessage) {
    let mut messages = read(cookies);
    messages.push(message);

    cookies.add(flash_cookie(&messages));
}

/// The cookie carrying `messages`, for responses built without a cookie jar.
pub fn flash_cookie(messages: &[FlashMessage]) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, encode(messages)))
        .path("/")
        .http_only(true)
        .build()
}

/// Returns the queued messages and clears them.
pub fn take_flash(cookies: &Cookies) -> Vec<FlashMessage> {
    let messages = read(cookies);
    if cookies.get(FLASH_COOKIE).is_some() {
        cookies.remove(Cookie::build(FLASH_COOKIE).path("/").build());
    }
    messages
}

/// What the shared page layout needs: who is signed in and pending messages.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub username: String,
    pub messages: Vec<FlashMessage>,
}

impl Layout {
    pub fn new(user: Option<&CurrentUser>, cookies: &Cookies) -> Self {
        Self {
            username: user.map(|u| u.username.clone()).unwrap_or_default(),
            messages: take_flash(cookies),
        }
    }

    pub fn for_user(user: &CurrentUser, cookies: &Cookies) -> Self {
        Self::new(Some(user), cookies)
    }

    pub fn is_authenticated(&self) -> bool {
        !self.username.is_empty()
    }
}
