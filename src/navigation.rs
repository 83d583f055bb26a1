//! Navigation menus and link classification.
//!
//! Menu items come in three placements (main header, footer, social) and
//! three link kinds. The kind decides what a click does:
//!
//! | Kind | Example href | Click |
//! |------|--------------|-------|
//! | `page` | `/about/` | in-app navigation |
//! | `anchor` | `/#contact` | scroll to a section on the home page |
//! | `external` | `https://instagram.com/...` | leave the app (host opens it) |
//!
//! Older API revisions omit `kind`; [`MenuItem::link_kind`] then derives it
//! from the href.

use crate::route::{Route, parse_route};
use crate::types::null_as_default;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuPlacement {
    Main,
    Footer,
    Social,
}

impl MenuPlacement {
    pub fn code(self) -> &'static str {
        match self {
            MenuPlacement::Main => "main",
            MenuPlacement::Footer => "footer",
            MenuPlacement::Social => "social",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Page,
    Anchor,
    External,
}

/// Menu items grouped by placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Menus {
    #[serde(deserialize_with = "null_as_default")]
    pub main: Vec<MenuItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub footer: Vec<MenuItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub social: Vec<MenuItem>,
}

impl Menus {
    pub fn items(&self, placement: MenuPlacement) -> &[MenuItem] {
        match placement {
            MenuPlacement::Main => &self.main,
            MenuPlacement::Footer => &self.footer,
            MenuPlacement::Social => &self.social,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    /// Translation key overriding `label`, e.g. `nav.expeditions`.
    #[serde(deserialize_with = "null_as_default")]
    pub label_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub href: String,
    pub kind: Option<LinkKind>,
    pub page_slug: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub url_key: String,
    pub open_in_new_tab: bool,
}

impl MenuItem {
    pub fn link_kind(&self) -> LinkKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        let href = self.href.trim();
        if self.page_slug.is_some() {
            LinkKind::Page
        } else if href.starts_with("//") {
            LinkKind::External
        } else if href.starts_with('#') || href.starts_with("/#") {
            LinkKind::Anchor
        } else if href.starts_with('/') {
            LinkKind::Page
        } else {
            LinkKind::External
        }
    }

    /// Anchor id for anchor links: `url_key` if set, else the href fragment.
    pub fn anchor(&self) -> Option<String> {
        if !self.url_key.trim().is_empty() {
            return Some(self.url_key.trim().to_string());
        }
        self.href
            .split_once('#')
            .map(|(_, fragment)| fragment.trim().to_string())
            .filter(|fragment| !fragment.is_empty())
    }

    /// What activating this item should do.
    pub fn action(&self) -> NavAction {
        match self.link_kind() {
            LinkKind::Page => {
                let route = match &self.page_slug {
                    Some(slug) if !slug.trim().is_empty() => Route::Page(slug.trim().to_string()),
                    _ => parse_route(&self.href),
                };
                NavAction::Route(route)
            }
            LinkKind::Anchor => match self.anchor() {
                Some(anchor) => NavAction::Anchor(anchor),
                None => NavAction::Route(Route::home()),
            },
            LinkKind::External => NavAction::External {
                href: self.href.clone(),
                new_tab: self.open_in_new_tab,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    Route(Route),
    Anchor(String),
    External { href: String, new_tab: bool },
}
