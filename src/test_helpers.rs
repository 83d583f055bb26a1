//! Shared test utilities.
//!
//! Provides fixture builders for CMS payloads, a recording [`MockApi`] and
//! small recording implementations of the host frame scheduler and style
//! sink.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let api = MockApi::new()
//!     .with_page(home_page())
//!     .with_expeditions(vec![expedition("glacier", "Glacier")]);
//!
//! let mut shell = shell_at(api, "/expeditions/glacier/");
//! shell.refresh();
//! assert!(matches!(shell.view(), View::Detail { .. }));
//! ```

use crate::api::{ApiError, ContentApi, status_error};
use crate::cancel::CancellationToken;
use crate::config::SiteConfig;
use crate::i18n::Locale;
use crate::lightbox::MemoryScroll;
use crate::navigation::{MenuPlacement, Menus};
use crate::parallax::{FrameScheduler, StyleSink};
use crate::prefs::MemoryPreferences;
use crate::shell::Shell;
use crate::types::{
    CategoryData, ContactMessage, ContactReceipt, ContentResponse, ExpeditionData,
    ExpeditionMedia, NavigationResponse, Page, PageResponse, PageSection, PageSummary, StoryData,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Mutex;

// =========================================================================
// Fixtures
// =========================================================================

pub fn expedition(slug: &str, title: &str) -> ExpeditionData {
    ExpeditionData {
        slug: slug.to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}

/// A media item; `url` goes to the field matching `kind`.
pub fn media(kind: &str, url: &str) -> ExpeditionMedia {
    let mut item = ExpeditionMedia {
        kind: kind.to_string(),
        title: kind.to_string(),
        ..Default::default()
    };
    match kind {
        "video" => item.video_url = url.to_string(),
        "story" => item.body = url.to_string(),
        _ => item.image_url = url.to_string(),
    }
    item
}

pub fn section(key: &str, section_type: &str, payload: serde_json::Value) -> PageSection {
    PageSection {
        key: key.to_string(),
        section_type: section_type.to_string(),
        title: key.to_string(),
        payload: payload.as_object().cloned().unwrap_or_default(),
        ..Default::default()
    }
}

pub fn page(slug: &str, title: &str, sections: Vec<PageSection>) -> Page {
    Page {
        slug: slug.to_string(),
        title: title.to_string(),
        is_home: slug == "home",
        sections,
        ..Default::default()
    }
}

/// Home page with one section of every kind and section fallbacks for all
/// three collections.
pub fn home_page() -> Page {
    page(
        "home",
        "Home",
        vec![
            section("hero", "hero", json!({"kicker": "Travel & Expedition"})),
            section(
                "expeditions",
                "cards",
                json!({"items": [
                    {"title": "Glacier Crossing", "image": "glacier.jpg", "description": "Ice"},
                    {"title": "Desert Run", "image": "desert.jpg"}
                ]}),
            ),
            section(
                "focus",
                "gallery",
                json!({"items": [{"title": "Portraits", "image": "p.jpg", "size": "large"}]}),
            ),
            section(
                "stories",
                "stories",
                json!({"items": [{"title": "North Wind", "date": "May 2024"}]}),
            ),
            section("contact", "contact", json!({"email": "hello@studio.test"})),
        ],
    )
}

// =========================================================================
// MockApi
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Content(String),
    Navigation(String),
    Page { slug: String, lang: String },
    Expeditions(String),
    Categories(String),
    Stories(String),
    Contact(ContactMessage),
    SetLanguage(String),
}

/// In-memory [`ContentApi`] that records every call.
///
/// Uses Mutex (not RefCell) so it is Sync and works with rayon.
#[derive(Default)]
pub struct MockApi {
    pub content: BTreeMap<String, ContentResponse>,
    pub pages: BTreeMap<String, Page>,
    pub menus: Menus,
    pub expeditions: Vec<ExpeditionData>,
    pub categories: Vec<CategoryData>,
    pub stories: Vec<StoryData>,
    pub failing_pages: Vec<String>,
    pub contact_failure: Option<(u16, String)>,
    pub language_fails: bool,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.insert(page.slug.clone(), page);
        self
    }

    pub fn with_content(mut self, lang: &str, content: ContentResponse) -> Self {
        self.content.insert(lang.to_string(), content);
        self
    }

    pub fn with_menus(mut self, menus: Menus) -> Self {
        self.menus = menus;
        self
    }

    pub fn with_expeditions(mut self, expeditions: Vec<ExpeditionData>) -> Self {
        self.expeditions = expeditions;
        self
    }

    pub fn with_categories(mut self, categories: Vec<CategoryData>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_stories(mut self, stories: Vec<StoryData>) -> Self {
        self.stories = stories;
        self
    }

    /// Answer 500 for this page slug.
    pub fn failing_page(mut self, slug: &str) -> Self {
        self.failing_pages.push(slug.to_string());
        self
    }

    pub fn failing_contact(mut self, status: u16, body: &str) -> Self {
        self.contact_failure = Some((status, body.to_string()));
        self
    }

    pub fn failing_language(mut self) -> Self {
        self.language_fails = true;
        self
    }

    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn page_calls(&self) -> Vec<(String, String)> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Page { slug, lang } => Some((slug, lang)),
                _ => None,
            })
            .collect()
    }

    pub fn contact_calls(&self) -> Vec<ContactMessage> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Contact(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn language_calls(&self) -> Vec<String> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::SetLanguage(lang) => Some(lang),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn check(cancel: &CancellationToken) -> Result<(), ApiError> {
    if cancel.is_cancelled() {
        Err(ApiError::Cancelled)
    } else {
        Ok(())
    }
}

impl ContentApi for MockApi {
    fn content(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<ContentResponse, ApiError> {
        self.record(RecordedCall::Content(lang.to_string()));
        check(cancel)?;
        if let Some(content) = self.content.get(lang.as_str()) {
            return Ok(content.clone());
        }
        Ok(ContentResponse {
            lang: lang.to_string(),
            pages: self
                .pages
                .values()
                .map(|page| PageSummary {
                    slug: page.slug.clone(),
                    title: page.title.clone(),
                    is_home: page.is_home,
                    order: 0,
                })
                .collect(),
            ..Default::default()
        })
    }

    fn navigation(
        &self,
        lang: &Locale,
        _menu: Option<MenuPlacement>,
        cancel: &CancellationToken,
    ) -> Result<NavigationResponse, ApiError> {
        self.record(RecordedCall::Navigation(lang.to_string()));
        check(cancel)?;
        Ok(NavigationResponse {
            lang: lang.to_string(),
            menus: self.menus.clone(),
        })
    }

    fn page(
        &self,
        slug: &str,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<PageResponse, ApiError> {
        self.record(RecordedCall::Page {
            slug: slug.to_string(),
            lang: lang.to_string(),
        });
        check(cancel)?;
        if self.failing_pages.iter().any(|failing| failing == slug) {
            return Err(status_error(500, ""));
        }
        match self.pages.get(slug) {
            Some(page) => Ok(PageResponse {
                lang: lang.to_string(),
                page: page.clone(),
            }),
            None => Err(status_error(404, r#"{"detail":"Not found."}"#)),
        }
    }

    fn expeditions(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExpeditionData>, ApiError> {
        self.record(RecordedCall::Expeditions(lang.to_string()));
        check(cancel)?;
        Ok(self.expeditions.clone())
    }

    fn categories(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<CategoryData>, ApiError> {
        self.record(RecordedCall::Categories(lang.to_string()));
        check(cancel)?;
        Ok(self.categories.clone())
    }

    fn stories(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<StoryData>, ApiError> {
        self.record(RecordedCall::Stories(lang.to_string()));
        check(cancel)?;
        Ok(self.stories.clone())
    }

    fn send_contact(&self, message: &ContactMessage) -> Result<ContactReceipt, ApiError> {
        self.record(RecordedCall::Contact(message.clone()));
        match &self.contact_failure {
            Some((status, body)) => Err(status_error(*status, body)),
            None => Ok(ContactReceipt {
                status: "ok".to_string(),
                id: 1,
            }),
        }
    }

    fn set_language(&self, lang: &Locale) -> Result<(), ApiError> {
        self.record(RecordedCall::SetLanguage(lang.to_string()));
        if self.language_fails {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

// =========================================================================
// Host doubles
// =========================================================================

#[derive(Debug, Default)]
pub struct CountingScheduler {
    pub requests: usize,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub writes: Vec<(String, String)>,
}

impl StyleSink for RecordingSink {
    fn set_property(&mut self, name: &str, value: &str) {
        self.writes.push((name.to_string(), value.to_string()));
    }
}

// =========================================================================
// Shell
// =========================================================================

pub type TestShell = Shell<MockApi, MemoryPreferences, MemoryScroll>;

/// A shell at `url` with default config and no stored preferences.
pub fn shell_at(api: MockApi, url: &str) -> TestShell {
    Shell::new(
        SiteConfig::default(),
        api,
        MemoryPreferences::new(),
        MemoryScroll::new("auto"),
        url,
    )
}
