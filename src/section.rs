//! Typed page sections.
//!
//! The API sends each section with a free-form `payload` object whose shape
//! depends on `section_type`. This module validates that shape once, when a
//! page arrives, into a [`SectionContent`] variant. Known fields get typed
//! slots; anything else lands in `extra` so newer CMS fields survive a round
//! trip without code changes.
//!
//! ## Known Section Types
//!
//! | `section_type` | Payload fields |
//! |----------------|----------------|
//! | `hero` | `kicker`, `scroll_label`, `background_image` |
//! | `rich_text` | none (body is Markdown) |
//! | `cards` | `eyebrow`, `cta_label`, `items[]` → expedition fallbacks |
//! | `gallery` | `eyebrow`, `items[]` → focus-area fallbacks |
//! | `stories` | `eyebrow`, `cta_label`, `items[]` → story fallbacks |
//! | `contact` | `location`, `email`, `socials` |
//!
//! A payload that doesn't match its declared type degrades to an empty typed
//! payload and a warning, never a failed page load.

use crate::route::CollectionKind;
use crate::types::{Page, PageSection, SectionImage, null_as_default};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Hero,
    RichText,
    Cards,
    Gallery,
    Stories,
    Contact,
    #[serde(other)]
    Unknown,
}

impl SectionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "hero" => SectionKind::Hero,
            "rich_text" => SectionKind::RichText,
            "cards" => SectionKind::Cards,
            "gallery" => SectionKind::Gallery,
            "stories" => SectionKind::Stories,
            "contact" => SectionKind::Contact,
            _ => SectionKind::Unknown,
        }
    }

    /// Which collection this section's items stand in for.
    pub fn fallback_for(self) -> Option<CollectionKind> {
        match self {
            SectionKind::Cards => Some(CollectionKind::Expeditions),
            SectionKind::Gallery => Some(CollectionKind::Categories),
            SectionKind::Stories => Some(CollectionKind::Stories),
            _ => None,
        }
    }
}

/// A collection item embedded in a section payload.
///
/// Field names vary across CMS revisions (`image` vs `image_url`, `date` vs
/// `date_label`), so both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(alias = "date_label", deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(alias = "image_url", deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub kicker: String,
    #[serde(deserialize_with = "null_as_default")]
    pub scroll_label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub background_image: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Payload shared by the three list-style sections (cards, gallery, stories).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub eyebrow: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cta_label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<FallbackRecord>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub socials: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    Hero(HeroPayload),
    RichText { extra: Extra },
    Cards(ListPayload),
    Gallery(ListPayload),
    Stories(ListPayload),
    Contact(ContactPayload),
    Unknown { section_type: String, extra: Extra },
}

impl SectionContent {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionContent::Hero(_) => SectionKind::Hero,
            SectionContent::RichText { .. } => SectionKind::RichText,
            SectionContent::Cards(_) => SectionKind::Cards,
            SectionContent::Gallery(_) => SectionKind::Gallery,
            SectionContent::Stories(_) => SectionKind::Stories,
            SectionContent::Contact(_) => SectionKind::Contact,
            SectionContent::Unknown { .. } => SectionKind::Unknown,
        }
    }

    pub fn items(&self) -> &[FallbackRecord] {
        match self {
            SectionContent::Cards(list)
            | SectionContent::Gallery(list)
            | SectionContent::Stories(list) => &list.items,
            _ => &[],
        }
    }
}

/// A validated section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: u64,
    pub key: String,
    pub anchor: String,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub content: SectionContent,
    pub images: Vec<SectionImage>,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        self.content.kind()
    }

    /// Translation key for one of this section's text fields.
    ///
    /// For key `hero-main`, `text_key("title")` → `"section.hero_main.title"`.
    pub fn text_key(&self, field: &str) -> String {
        format!("section.{}.{}", self.key.replace('-', "_"), field)
    }
}

fn typed_or_default<T: DeserializeOwned + Default>(section: &PageSection) -> T {
    match serde_json::from_value(serde_json::Value::Object(section.payload.clone())) {
        Ok(typed) => typed,
        Err(err) => {
            warn!(
                section = %section.key,
                section_type = %section.section_type,
                "section payload does not match its type: {err}"
            );
            T::default()
        }
    }
}

/// Anchor for in-page links: explicit `payload.anchor`, else `journey` for
/// the hero, else the section key.
fn section_anchor(section: &PageSection) -> String {
    let explicit = section
        .payload
        .get("anchor")
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|anchor| !anchor.is_empty());
    if let Some(anchor) = explicit {
        return anchor.to_string();
    }
    if !section.anchor.trim().is_empty() {
        return section.anchor.trim().to_string();
    }
    if section.key == "hero" {
        return "journey".to_string();
    }
    section.key.clone()
}

pub fn parse_section(section: &PageSection) -> Section {
    let content = match SectionKind::parse(&section.section_type) {
        SectionKind::Hero => SectionContent::Hero(typed_or_default(section)),
        SectionKind::RichText => SectionContent::RichText {
            extra: section.payload.clone(),
        },
        SectionKind::Cards => SectionContent::Cards(typed_or_default(section)),
        SectionKind::Gallery => SectionContent::Gallery(typed_or_default(section)),
        SectionKind::Stories => SectionContent::Stories(typed_or_default(section)),
        SectionKind::Contact => SectionContent::Contact(typed_or_default(section)),
        SectionKind::Unknown => SectionContent::Unknown {
            section_type: section.section_type.clone(),
            extra: section.payload.clone(),
        },
    };

    let mut images = section.images.clone();
    images.sort_by_key(|image| (image.order, image.id));

    Section {
        id: section.id,
        key: section.key.clone(),
        anchor: section_anchor(section),
        title: section.title.clone(),
        subtitle: section.subtitle.clone(),
        body: section.body.clone(),
        content,
        images,
    }
}

/// Validated sections of a page, in API order, at most one per key.
pub fn parse_sections(page: &Page) -> Vec<Section> {
    let mut seen = HashSet::new();
    page.sections
        .iter()
        .filter(|section| {
            let fresh = seen.insert(section.key.clone());
            if !fresh {
                warn!(page = %page.slug, key = %section.key, "dropping duplicate section key");
            }
            fresh
        })
        .map(parse_section)
        .collect()
}

/// Fallback items for a collection, taken from the first section that
/// stands in for it.
pub fn fallback_records(sections: &[Section], kind: CollectionKind) -> Vec<FallbackRecord> {
    sections
        .iter()
        .find(|section| section.kind().fallback_for() == Some(kind))
        .map(|section| section.content.items().to_vec())
        .unwrap_or_default()
}
