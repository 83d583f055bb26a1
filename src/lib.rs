//! # Studio Site
//!
//! Content client for a CMS-driven photography studio website. The CMS owns
//! every word and image; this crate fetches that content, decides which route
//! to show, resolves records into view models, drives the interactive state
//! of the site, and renders the current view to HTML.
//!
//! # Architecture
//!
//! ```text
//! path ──parse_route──▶ Route
//!                         │
//!        Shell ◀──────────┘  issues cancellable loads
//!          │                 (site data per locale, page data per slug+locale)
//!          ▼
//!     ContentApi  ──rayon──▶ results applied only while their token is live
//!          │
//!          ▼
//!     resolve::*  ──▶ View ──render──▶ HTML
//! ```
//!
//! The host (a browser binding, a prerenderer, the bundled CLI) stays outside
//! the core. History is an in-memory stack on the shell; page scroll, frame
//! scheduling and style writes are traits ([`lightbox::PageScroll`],
//! [`parallax::FrameScheduler`], [`parallax::StyleSink`]) so every state
//! machine runs without a DOM.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`route`] | Path ⇄ [`route::Route`] parsing and canonical formatting |
//! | [`slug`] | Slug generation with transliteration and collision suffixes |
//! | [`types`] | Raw CMS payloads, deserialized leniently |
//! | [`section`] | Typed page sections, validated at the API boundary |
//! | [`navigation`] | Menus and link classification (route, anchor, external) |
//! | [`cancel`] | Cancellation tokens and per-slot supersession |
//! | [`api`] | [`api::ContentApi`] trait and the blocking HTTP client |
//! | [`config`] | `site.toml` loading, merging, validation |
//! | [`prefs`] | Local preference store (theme, locale) |
//! | [`i18n`] | Locale negotiation, dictionary lookups with fallbacks |
//! | [`resolve`] | Collection records and detail media layouts |
//! | [`lightbox`] | Modal image viewer state |
//! | [`parallax`] | Hero zoom, header strength, header reveal |
//! | [`contact`] | Contact form state |
//! | [`shell`] | Routing, loading, history, and the current [`shell::View`] |
//! | [`render`] | Maud templates for the full document |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Blocking Fetches on Rayon
//!
//! Each load fans its requests out with `rayon::join` over a blocking
//! `reqwest` client. The shell never awaits; it begins a load, somebody runs
//! the fetch, and the shell applies the result if the load's token has not
//! been cancelled in the meantime. A locale switch or a page change cancels
//! the slot, so a slow response for the old key is dropped instead of
//! overwriting newer state.
//!
//! ## Fallbacks From the Home Page
//!
//! Collection records come from dedicated endpoints when those return
//! anything, and otherwise from the items of the matching home page section.
//! A site with an empty CMS collection still has index and detail pages.
//!
//! ## Maud Templates
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). All interpolation
//! is escaped; Markdown bodies go through pulldown-cmark and are the only
//! pre-escaped content.

pub mod api;
pub mod cancel;
pub mod config;
pub mod contact;
pub mod i18n;
pub mod lightbox;
pub mod navigation;
pub mod output;
pub mod parallax;
pub mod prefs;
pub mod render;
pub mod resolve;
pub mod route;
pub mod section;
pub mod shell;
pub mod slug;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
