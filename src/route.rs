//! URL path ⇄ route mapping.
//!
//! ## URL Scheme
//!
//! ```text
//! /                        → Page("home")
//! /about/                  → Page("about")
//! /expeditions/            → CollectionIndex(Expeditions)
//! /expeditions/{slug}/     → Detail(Expeditions, slug)
//! /focus/{slug}/           → Detail(Categories, slug)
//! /stories/{slug}/         → Detail(Stories, slug)
//! ```
//!
//! Parsing is total: any string maps to some route, and garbage maps to home.
//! Trailing slashes, doubled slashes, query strings and fragments are ignored,
//! so `/about`, `about/` and `//about/?lang=ru` all parse identically.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slug of the designated home page. The CMS resolves it to whichever page
/// carries the home flag.
pub const HOME_SLUG: &str = "home";

/// The three browsable collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Expeditions,
    Categories,
    Stories,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Expeditions,
        CollectionKind::Categories,
        CollectionKind::Stories,
    ];

    /// First URL segment for this collection.
    pub fn prefix(self) -> &'static str {
        match self {
            CollectionKind::Expeditions => "expeditions",
            CollectionKind::Categories => "focus",
            CollectionKind::Stories => "stories",
        }
    }

    /// Singular token used in translation keys and fallback slugs.
    pub fn type_token(self) -> &'static str {
        match self {
            CollectionKind::Expeditions => "expedition",
            CollectionKind::Categories => "category",
            CollectionKind::Stories => "story",
        }
    }

    pub fn from_prefix(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == segment)
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Page(String),
    CollectionIndex(CollectionKind),
    Detail(CollectionKind, String),
}

impl Route {
    pub fn home() -> Self {
        Route::Page(HOME_SLUG.to_string())
    }

    pub fn is_home(&self) -> bool {
        matches!(self, Route::Page(slug) if slug == HOME_SLUG)
    }

    /// Slug of the CMS page whose sections back this route.
    ///
    /// Collection routes are backed by the home page: its card, gallery and
    /// story sections carry the fallback items used when collection
    /// endpoints come back empty.
    pub fn page_slug(&self) -> &str {
        match self {
            Route::Page(slug) => slug,
            Route::CollectionIndex(_) | Route::Detail(..) => HOME_SLUG,
        }
    }

    pub fn collection(&self) -> Option<CollectionKind> {
        match self {
            Route::Page(_) => None,
            Route::CollectionIndex(kind) | Route::Detail(kind, _) => Some(*kind),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Page(slug) => write!(f, "page {slug}"),
            Route::CollectionIndex(kind) => write!(f, "{kind} index"),
            Route::Detail(kind, slug) => write!(f, "{kind} detail {slug}"),
        }
    }
}

/// Parse a URL path (optionally carrying `?query` or `#fragment`) into a route.
pub fn parse_route(path: &str) -> Route {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<String> = path
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(decode_segment)
        .filter(|segment| !segment.is_empty())
        .collect();

    let Some(first) = segments.first() else {
        return Route::home();
    };

    if let Some(kind) = CollectionKind::from_prefix(first) {
        return match segments.get(1) {
            Some(slug) => Route::Detail(kind, slug.clone()),
            None => Route::CollectionIndex(kind),
        };
    }

    Route::Page(segments.join("/"))
}

fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.trim().to_string(),
        Err(_) => segment.to_string(),
    }
}

/// Canonical path for a route.
///
/// Page slugs not present in `known_slugs` collapse to `/`, so a stale or
/// mistyped page link never produces a dead URL.
pub fn route_to_path<S: AsRef<str>>(route: &Route, known_slugs: &[S]) -> String {
    match route {
        Route::Page(slug) if slug == HOME_SLUG => "/".to_string(),
        Route::Page(slug) => {
            if known_slugs.iter().any(|known| known.as_ref() == slug) {
                format!("/{slug}/")
            } else {
                "/".to_string()
            }
        }
        Route::CollectionIndex(kind) => format!("/{}/", kind.prefix()),
        Route::Detail(kind, slug) => {
            format!("/{}/{}/", kind.prefix(), urlencoding::encode(slug))
        }
    }
}
