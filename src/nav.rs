use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::{auth::extractors::MaybeUser, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    /// Hidden from anonymous callers.
    pub protected: bool,
}

pub const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Dashboard",
        href: "/dashboard",
        protected: true,
    },
    NavItem {
        label: "View Doctor Reviews",
        href: "/view-reviews",
        protected: true,
    },
];

pub fn visible_items(logged_in: bool) -> Vec<NavItem> {
    NAV_ITEMS
        .iter()
        .filter(|item| logged_in || !item.protected)
        .copied()
        .collect()
}

/// Header buttons next to the menu.
pub fn account_actions(logged_in: bool) -> Vec<NavItem> {
    if logged_in {
        vec![NavItem {
            label: "Account",
            href: "/account",
            protected: true,
        }]
    } else {
        vec![
            NavItem {
                label: "Log In",
                href: "/login",
                protected: false,
            },
            NavItem {
                label: "Sign Up",
                href: "/signup",
                protected: false,
            },
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct NavResponse {
    pub logged_in: bool,
    pub items: Vec<NavItem>,
    pub actions: Vec<NavItem>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/nav", get(get_nav))
}

pub async fn get_nav(MaybeUser(user): MaybeUser) -> Json<NavResponse> {
    let logged_in = user.is_some();
    Json(NavResponse {
        logged_in,
        items: visible_items(logged_in),
        actions: account_actions(logged_in),
    })
}
