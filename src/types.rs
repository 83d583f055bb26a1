//! Raw CMS payloads, exactly as the API sends them.
//!
//! Every field carries a serde default: a missing or null field means "no
//! data", never a decode failure. Shape validation for section payloads
//! happens once, in [`crate::section`], rather than at every call site.

use crate::navigation::Menus;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat `null` like an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Site-wide settings from the bootstrap payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    #[serde(deserialize_with = "null_as_default")]
    pub brand_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contact_email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub footer_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub footer_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub footer_explore_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub footer_social_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub footer_newsletter_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub newsletter_note: String,
    #[serde(deserialize_with = "null_as_default")]
    pub seo_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub seo_description: String,
    /// Per-language UI strings (`loading_content`, `contact_success`, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub ui: BTreeMap<String, String>,
}

/// A language the CMS offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
    pub is_default: bool,
    pub order: u32,
}

/// Page metadata from the bootstrap page list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSummary {
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub is_home: bool,
    pub order: u32,
}

/// `GET /content/?lang=`: the bootstrap payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentResponse {
    pub lang: String,
    pub default_lang: String,
    #[serde(deserialize_with = "null_as_default")]
    pub languages: Vec<LanguageOption>,
    #[serde(deserialize_with = "null_as_default")]
    pub site: SiteSettings,
    /// Flat translation dictionary for `lang`.
    #[serde(deserialize_with = "null_as_default")]
    pub texts: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub pages: Vec<PageSummary>,
}

impl ContentResponse {
    /// Slug of the page flagged as home, if the CMS designates one.
    pub fn home_page_slug(&self) -> Option<&str> {
        self.pages
            .iter()
            .find(|page| page.is_home)
            .map(|page| page.slug.as_str())
    }
}

/// `GET /navigation/?lang=&menu=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationResponse {
    pub lang: String,
    #[serde(deserialize_with = "null_as_default")]
    pub menus: Menus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionImage {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alt_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub caption: String,
    pub order: u32,
}

/// One page section as sent by the API. `payload` is open-ended here; see
/// [`crate::section::Section`] for the validated form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSection {
    pub id: u64,
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub anchor: String,
    pub section_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub payload: serde_json::Map<String, serde_json::Value>,
    pub order: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<SectionImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub slug: String,
    pub is_home: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub seo_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub seo_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sections: Vec<PageSection>,
}

/// `GET /pages/{slug}/?lang=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageResponse {
    pub lang: String,
    pub page: Page,
}

/// One media item attached to an expedition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpeditionMedia {
    pub id: u64,
    /// `image`, `video` or `story`; anything else is ignored.
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub video_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alt_text: String,
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpeditionData {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub media_items: Vec<ExpeditionMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryGalleryItem {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alt_text: String,
}

/// Focus area ("category") of the portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryData {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    /// Grid tile size: `large`, `small` or `wide`.
    #[serde(deserialize_with = "null_as_default")]
    pub size: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gallery_items: Vec<CategoryGalleryItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryData {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
}

/// `POST /contact-messages/` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// `POST /contact-messages/` success response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactReceipt {
    pub status: String,
    pub id: u64,
}
