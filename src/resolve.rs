//! View-model resolution for the three collections.
//!
//! Turns raw API records, or the fallback items embedded in home-page
//! sections, into [`ResolvedRecord`]s the renderer can use without further
//! checks: every record has a unique slug, a non-empty title and its detail
//! view's ordered [`MediaBlock`]s.
//!
//! ## Source Precedence
//!
//! API records are used exclusively whenever the API list is non-empty.
//! Section fallbacks are consulted only when the collection endpoint
//! returned nothing.
//!
//! ## Translation Keys
//!
//! Each text field can be overridden per record and language:
//!
//! ```text
//! expedition.glacial-highlands.title
//! category.portraits.description
//! story.north-wind.date
//! ```
//!
//! The slug used in the key is the resolved one, so records that only have a
//! title still get stable keys.
//!
//! ## Expedition Media
//!
//! [`resolve_media_blocks`] guarantees the detail layout:
//!
//! ```text
//! [image (cover if none given)] [story (field notes)] ... [video (placeholder if none)]
//! ```
//!
//! Source order is kept otherwise. Image items without a URL are skipped.

use crate::route::CollectionKind;
use crate::section::FallbackRecord;
use crate::slug::{SlugAllocator, candidate_slug, humanize};
use crate::types::{CategoryData, ExpeditionData, ExpeditionMedia, StoryData};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageBlock {
    pub url: String,
    pub alt: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaBlock {
    Image(ImageBlock),
    /// `url` is empty for the placeholder.
    Video {
        url: String,
        poster: String,
        title: String,
    },
    Story {
        title: String,
        body: String,
    },
}

impl MediaBlock {
    pub fn is_image(&self) -> bool {
        matches!(self, MediaBlock::Image(_))
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaBlock::Video { .. })
    }

    pub fn is_story(&self) -> bool {
        matches!(self, MediaBlock::Story { .. })
    }
}

/// Category grid tile size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileSize {
    Large,
    #[default]
    Small,
    Wide,
}

impl TileSize {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "large" => TileSize::Large,
            "wide" => TileSize::Wide,
            _ => TileSize::Small,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TileSize::Large => "large",
            TileSize::Small => "small",
            TileSize::Wide => "wide",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecord {
    pub kind: CollectionKind,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub description: String,
    pub image: String,
    pub size: TileSize,
    pub blocks: Vec<MediaBlock>,
}

impl ResolvedRecord {
    pub fn images(&self) -> Vec<ImageBlock> {
        lightbox_images(&self.blocks)
    }
}

/// Raw fields common to API records and section fallbacks.
struct RawFields<'a> {
    slug: &'a str,
    title: &'a str,
    subtitle: &'a str,
    date: &'a str,
    description: &'a str,
    image: &'a str,
    size: &'a str,
}

impl<'a> From<&'a FallbackRecord> for RawFields<'a> {
    fn from(record: &'a FallbackRecord) -> Self {
        RawFields {
            slug: &record.slug,
            title: &record.title,
            subtitle: &record.subtitle,
            date: &record.date,
            description: &record.description,
            image: &record.image,
            size: &record.size,
        }
    }
}

/// Translate `key`, using `raw` as the fallback. Empty when neither exists.
fn field<T>(t: &T, key: &str, raw: &str) -> String
where
    T: Fn(&str, Option<&str>) -> String,
{
    let value = t(key, Some(raw.trim()));
    if value == key {
        String::new()
    } else {
        value.trim().to_string()
    }
}

/// Resolve the shared text fields for one record. `blocks` is left empty.
fn resolve_fields<T>(
    kind: CollectionKind,
    raw: RawFields<'_>,
    index: usize,
    slugs: &mut SlugAllocator,
    t: &T,
) -> ResolvedRecord
where
    T: Fn(&str, Option<&str>) -> String,
{
    let type_token = kind.type_token();
    let explicit = raw.slug.trim();
    let slug = if explicit.is_empty() {
        slugs.allocate(candidate_slug("", raw.title, type_token, index), index)
    } else {
        slugs.claim(explicit.to_string(), index)
    };
    let key = |name: &str| format!("{type_token}.{slug}.{name}");

    let date = field(t, &key("date"), raw.date);
    let mut title = field(t, &key("title"), raw.title);
    if title.is_empty() {
        title = humanize(&slug);
    }
    let subtitle = field(t, &key("subtitle"), raw.subtitle);
    let description = field(t, &key("description"), raw.description);
    let (subtitle, description) = match (subtitle.is_empty(), description.is_empty()) {
        (true, false) => (description.clone(), description),
        (false, true) => (subtitle.clone(), subtitle),
        _ => (subtitle, description),
    };

    ResolvedRecord {
        kind,
        title,
        subtitle,
        date,
        description,
        image: raw.image.trim().to_string(),
        size: TileSize::parse(raw.size),
        slug,
        blocks: Vec::new(),
    }
}

pub fn resolve_expeditions<T>(
    api: &[ExpeditionData],
    fallback: &[FallbackRecord],
    t: &T,
) -> Vec<ResolvedRecord>
where
    T: Fn(&str, Option<&str>) -> String,
{
    let kind = CollectionKind::Expeditions;
    if !api.is_empty() {
        let mut slugs = SlugAllocator::reserving(api.iter().map(|data| data.slug.as_str()));
        return api
            .iter()
            .enumerate()
            .map(|(index, data)| {
                let raw = RawFields {
                    slug: &data.slug,
                    title: &data.title,
                    subtitle: &data.subtitle,
                    date: &data.date_label,
                    description: &data.description,
                    image: &data.image_url,
                    size: "",
                };
                let mut record = resolve_fields(kind, raw, index, &mut slugs, t);
                record.blocks = resolve_media_blocks(&record, &data.media_items, t);
                record
            })
            .collect();
    }
    let mut slugs = SlugAllocator::reserving(fallback.iter().map(|item| item.slug.as_str()));
    fallback
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut record = resolve_fields(kind, item.into(), index, &mut slugs, t);
            record.blocks = resolve_media_blocks(&record, &[], t);
            record
        })
        .collect()
}

pub fn resolve_categories<T>(
    api: &[CategoryData],
    fallback: &[FallbackRecord],
    t: &T,
) -> Vec<ResolvedRecord>
where
    T: Fn(&str, Option<&str>) -> String,
{
    let kind = CollectionKind::Categories;
    if !api.is_empty() {
        let mut slugs = SlugAllocator::reserving(api.iter().map(|data| data.slug.as_str()));
        return api
            .iter()
            .enumerate()
            .map(|(index, data)| {
                let raw = RawFields {
                    slug: &data.slug,
                    title: &data.title,
                    subtitle: &data.subtitle,
                    date: "",
                    description: &data.description,
                    image: &data.image_url,
                    size: &data.size,
                };
                let mut record = resolve_fields(kind, raw, index, &mut slugs, t);
                record.blocks = category_blocks(&record, data);
                record
            })
            .collect();
    }
    let mut slugs = SlugAllocator::reserving(fallback.iter().map(|item| item.slug.as_str()));
    fallback
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut record = resolve_fields(kind, item.into(), index, &mut slugs, t);
            record.blocks = category_blocks(&record, &CategoryData::default());
            record
        })
        .collect()
}

pub fn resolve_stories<T>(
    api: &[StoryData],
    fallback: &[FallbackRecord],
    t: &T,
) -> Vec<ResolvedRecord>
where
    T: Fn(&str, Option<&str>) -> String,
{
    let kind = CollectionKind::Stories;
    if !api.is_empty() {
        let mut slugs = SlugAllocator::reserving(api.iter().map(|data| data.slug.as_str()));
        return api
            .iter()
            .enumerate()
            .map(|(index, data)| {
                let raw = RawFields {
                    slug: &data.slug,
                    title: &data.title,
                    subtitle: "",
                    date: &data.date_label,
                    description: &data.description,
                    image: &data.image_url,
                    size: "",
                };
                let mut record = resolve_fields(kind, raw, index, &mut slugs, t);
                let body = field(t, &format!("story.{}.body", record.slug), &data.body);
                record.blocks = story_blocks(&record, &body);
                record
            })
            .collect();
    }
    let mut slugs = SlugAllocator::reserving(fallback.iter().map(|item| item.slug.as_str()));
    fallback
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut record = resolve_fields(kind, item.into(), index, &mut slugs, t);
            record.blocks = story_blocks(&record, "");
            record
        })
        .collect()
}

fn cover_block(record: &ResolvedRecord) -> Option<MediaBlock> {
    (!record.image.is_empty()).then(|| {
        MediaBlock::Image(ImageBlock {
            url: record.image.clone(),
            alt: record.title.clone(),
            caption: String::new(),
        })
    })
}

fn media_block(item: &ExpeditionMedia) -> Option<MediaBlock> {
    match item.kind.trim() {
        "image" => {
            let url = item.image_url.trim();
            (!url.is_empty()).then(|| {
                let alt = if item.alt_text.trim().is_empty() {
                    item.title.trim()
                } else {
                    item.alt_text.trim()
                };
                MediaBlock::Image(ImageBlock {
                    url: url.to_string(),
                    alt: alt.to_string(),
                    caption: item.title.trim().to_string(),
                })
            })
        }
        "video" => Some(MediaBlock::Video {
            url: item.video_url.trim().to_string(),
            poster: item.image_url.trim().to_string(),
            title: item.title.trim().to_string(),
        }),
        "story" => Some(MediaBlock::Story {
            title: item.title.trim().to_string(),
            body: item.body.trim().to_string(),
        }),
        _ => None,
    }
}

/// Ordered detail blocks for an expedition.
pub fn resolve_media_blocks<T>(
    record: &ResolvedRecord,
    media: &[ExpeditionMedia],
    t: &T,
) -> Vec<MediaBlock>
where
    T: Fn(&str, Option<&str>) -> String,
{
    let mut blocks: Vec<MediaBlock> = media.iter().filter_map(media_block).collect();

    if !blocks.iter().any(MediaBlock::is_image) {
        if let Some(cover) = cover_block(record) {
            blocks.insert(0, cover);
        }
    }

    if !blocks.iter().any(MediaBlock::is_story) {
        let story = MediaBlock::Story {
            title: t("detail.field_notes", Some("Field notes")),
            body: record.description.clone(),
        };
        match blocks.iter().position(MediaBlock::is_image) {
            Some(first_image) => blocks.insert(first_image + 1, story),
            None => blocks.push(story),
        }
    }

    match blocks.iter().rposition(MediaBlock::is_video) {
        None => blocks.push(MediaBlock::Video {
            url: String::new(),
            poster: record.image.clone(),
            title: t("detail.video_placeholder", Some("Film coming soon")),
        }),
        Some(last_video) if last_video + 1 != blocks.len() => {
            let video = blocks.remove(last_video);
            blocks.push(video);
        }
        Some(_) => {}
    }

    blocks
}

/// Gallery items as image blocks; the cover stands in for an empty gallery.
pub fn category_blocks(record: &ResolvedRecord, data: &CategoryData) -> Vec<MediaBlock> {
    let blocks: Vec<MediaBlock> = data
        .gallery_items
        .iter()
        .filter(|item| !item.image_url.trim().is_empty())
        .map(|item| {
            let alt = if item.alt_text.trim().is_empty() {
                item.title.trim()
            } else {
                item.alt_text.trim()
            };
            MediaBlock::Image(ImageBlock {
                url: item.image_url.trim().to_string(),
                alt: alt.to_string(),
                caption: item.title.trim().to_string(),
            })
        })
        .collect();
    if blocks.is_empty() {
        return cover_block(record).into_iter().collect();
    }
    blocks
}

/// Cover image followed by the story text (`body`, else the description).
pub fn story_blocks(record: &ResolvedRecord, body: &str) -> Vec<MediaBlock> {
    let body = if body.trim().is_empty() {
        record.description.clone()
    } else {
        body.trim().to_string()
    };
    cover_block(record)
        .into_iter()
        .chain(std::iter::once(MediaBlock::Story {
            title: record.title.clone(),
            body,
        }))
        .collect()
}

/// The image blocks of a detail view, in display order.
pub fn lightbox_images(blocks: &[MediaBlock]) -> Vec<ImageBlock> {
    blocks
        .iter()
        .filter_map(|block| match block {
            MediaBlock::Image(image) => Some(image.clone()),
            _ => None,
        })
        .collect()
}

pub fn find_record<'a>(records: &'a [ResolvedRecord], slug: &str) -> Option<&'a ResolvedRecord> {
    records.iter().find(|record| record.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{Dictionary, lookup};
    use crate::test_helpers::{expedition, media};

    fn no_dict(key: &str, fallback: Option<&str>) -> String {
        lookup(&Dictionary::new(), key, fallback)
    }

    fn kinds(blocks: &[MediaBlock]) -> Vec<&'static str> {
        blocks
            .iter()
            .map(|block| match block {
                MediaBlock::Image(_) => "image",
                MediaBlock::Video { .. } => "video",
                MediaBlock::Story { .. } => "story",
            })
            .collect()
    }

    fn fallback(title: &str) -> FallbackRecord {
        FallbackRecord {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn api_records_win_exclusively() {
        let api = vec![expedition("glacier", "Glacier")];
        let records = resolve_expeditions(&api, &[fallback("Desert")], &no_dict);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].slug, "glacier");
    }

    #[test]
    fn fallback_used_when_api_empty() {
        let records = resolve_expeditions(&[], &[fallback("Desert Run")], &no_dict);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].slug, "desert-run");
        assert_eq!(records[0].title, "Desert Run");
    }

    #[test]
    fn duplicate_titles_get_unique_slugs() {
        let records = resolve_stories(&[], &[fallback("Same"), fallback("Same")], &no_dict);
        assert_eq!(records[0].slug, "same");
        assert_eq!(records[1].slug, "same-2");
    }

    #[test]
    fn explicit_slug_keeps_its_record() {
        let first = expedition("glacier", "Glacier");
        let again = expedition("glacier", "Glacier again");
        let second_glacier = expedition("glacier-2", "Second Glacier");
        let records = resolve_expeditions(&[first, again, second_glacier], &[], &no_dict);

        let slugs: Vec<&str> = records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["glacier", "glacier-2-2", "glacier-2"]);
        assert_eq!(
            find_record(&records, "glacier-2").map(|r| r.title.as_str()),
            Some("Second Glacier")
        );
    }

    #[test]
    fn untitled_record_gets_token_and_humanized_title() {
        let records = resolve_categories(&[], &[fallback(""), fallback("!!!")], &no_dict);
        assert_eq!(records[0].slug, "category-1");
        assert_eq!(records[0].title, "Category 1");
        assert_eq!(records[1].slug, "category-2");
    }

    #[test]
    fn subtitle_and_description_fall_back_to_each_other() {
        let only_description = FallbackRecord {
            title: "A".into(),
            description: "Long text".into(),
            ..Default::default()
        };
        let only_subtitle = FallbackRecord {
            title: "B".into(),
            subtitle: "Short".into(),
            ..Default::default()
        };
        let records = resolve_expeditions(&[], &[only_description, only_subtitle], &no_dict);
        assert_eq!(records[0].subtitle, "Long text");
        assert_eq!(records[1].description, "Short");
    }

    #[test]
    fn translation_keys_use_resolved_slug() {
        let mut dict = Dictionary::new();
        dict.insert("expedition.glacier.title".into(), "Ледник".into());
        dict.insert("expedition.glacier.date".into(), "Май 2024".into());
        let t = |key: &str, fallback: Option<&str>| lookup(&dict, key, fallback);

        let records = resolve_expeditions(&[expedition("glacier", "Glacier")], &[], &t);
        assert_eq!(records[0].title, "Ледник");
        assert_eq!(records[0].date, "Май 2024");
        assert_eq!(records[0].slug, "glacier");
    }

    #[test]
    fn sparse_expedition_gets_full_layout() {
        let mut data = expedition("glacier", "Glacier");
        data.image_url = "cover.jpg".into();
        data.description = "Ice".into();
        let records = resolve_expeditions(&[data], &[], &no_dict);
        assert_eq!(kinds(&records[0].blocks), ["image", "story", "video"]);
        match &records[0].blocks[1] {
            MediaBlock::Story { body, .. } => assert_eq!(body, "Ice"),
            other => panic!("expected story, got {other:?}"),
        }
    }

    #[test]
    fn no_images_at_all() {
        let record = &resolve_expeditions(&[expedition("x", "X")], &[], &no_dict)[0];
        assert_eq!(kinds(&record.blocks), ["story", "video"]);
        assert!(record.images().is_empty());
    }

    #[test]
    fn image_items_without_url_skipped() {
        let mut data = expedition("x", "X");
        data.image_url = "cover.jpg".into();
        data.media_items = vec![media("image", ""), media("image", "a.jpg")];
        let record = &resolve_expeditions(&[data], &[], &no_dict)[0];
        let images = record.images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "a.jpg");
    }

    #[test]
    fn story_inserted_after_first_image() {
        let mut data = expedition("x", "X");
        data.media_items = vec![
            media("image", "a.jpg"),
            media("image", "b.jpg"),
            media("video", "clip.mp4"),
        ];
        let record = &resolve_expeditions(&[data], &[], &no_dict)[0];
        assert_eq!(kinds(&record.blocks), ["image", "story", "image", "video"]);
    }

    #[test]
    fn existing_story_kept_and_video_moved_last() {
        let mut data = expedition("x", "X");
        data.media_items = vec![
            media("video", "clip.mp4"),
            media("story", ""),
            media("image", "a.jpg"),
        ];
        let record = &resolve_expeditions(&[data], &[], &no_dict)[0];
        assert_eq!(kinds(&record.blocks), ["story", "image", "video"]);
        assert_eq!(record.blocks.iter().filter(|b| b.is_video()).count(), 1);
    }

    #[test]
    fn unknown_media_kinds_ignored() {
        let mut data = expedition("x", "X");
        data.media_items = vec![media("audio", "a.mp3")];
        let record = &resolve_expeditions(&[data], &[], &no_dict)[0];
        assert_eq!(kinds(&record.blocks), ["story", "video"]);
    }

    #[test]
    fn category_gallery_and_cover() {
        let data = CategoryData {
            title: "Portraits".into(),
            image_url: "cover.jpg".into(),
            size: "WIDE".into(),
            ..Default::default()
        };
        let record = &resolve_categories(std::slice::from_ref(&data), &[], &no_dict)[0];
        assert_eq!(record.size, TileSize::Wide);
        assert_eq!(record.images()[0].url, "cover.jpg");

        let mut with_gallery = data;
        with_gallery.gallery_items = vec![crate::types::CategoryGalleryItem {
            image_url: "g1.jpg".into(),
            title: "One".into(),
            ..Default::default()
        }];
        let record = &resolve_categories(&[with_gallery], &[], &no_dict)[0];
        let images = record.images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "g1.jpg");
        assert_eq!(images[0].alt, "One");
    }

    #[test]
    fn story_body_prefers_body_over_description() {
        let data = StoryData {
            title: "North Wind".into(),
            description: "Short".into(),
            body: "The whole tale".into(),
            image_url: "c.jpg".into(),
            ..Default::default()
        };
        let record = &resolve_stories(&[data], &[], &no_dict)[0];
        assert_eq!(record.slug, "north-wind");
        assert_eq!(kinds(&record.blocks), ["image", "story"]);
        match &record.blocks[1] {
            MediaBlock::Story { body, .. } => assert_eq!(body, "The whole tale"),
            other => panic!("expected story, got {other:?}"),
        }
    }

    #[test]
    fn find_record_by_slug() {
        let records = resolve_stories(&[], &[fallback("One"), fallback("Two")], &no_dict);
        assert_eq!(find_record(&records, "two").map(|r| r.title.as_str()), Some("Two"));
        assert!(find_record(&records, "three").is_none());
    }
}
