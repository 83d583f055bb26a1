//! Stable slugs for collection records.
//!
//! Every resolved record needs a slug: it keys the record's URL
//! (`/expeditions/{slug}/`) and its translation lookups
//! (`expedition.{slug}.title`). The CMS usually sends one, but section
//! fallback items and hand-edited records often don't.
//!
//! ## Resolution Order
//!
//! - Explicit `slug` field (trimmed)
//! - `slugify(title)`: `"Glacial Highlands"` → `"glacial-highlands"`
//! - Enumerated token: third expedition with no usable title → `"expedition-3"`
//!
//! Titles that slugify to nothing (`"!!!"`, whitespace) fall through to the
//! enumerated token. Non-Latin titles are transliterated by the `slug` crate,
//! so `"Ледник"` becomes `"lednik"` rather than falling through.
//!
//! ## Uniqueness
//!
//! Two records in one response can produce the same slug (identical titles,
//! or an explicit slug colliding with a derived one). Explicit slugs are
//! reserved first, so the record that names a slug always gets it.
//! [`SlugAllocator`] hands out the first occurrence unchanged and suffixes
//! later ones with `-{index+1}`, then `-{index+1}-2`, ... skipping anything
//! taken or reserved.

use std::collections::HashSet;

/// Lowercase, ASCII-transliterated, dash-separated form of `text`.
///
/// Returns an empty string when nothing alphanumeric survives.
pub fn slugify(text: &str) -> String {
    ::slug::slugify(text.trim())
}

/// Enumerated fallback token: `fallback_token("story", 0)` → `"story-1"`.
pub fn fallback_token(type_token: &str, index: usize) -> String {
    format!("{}-{}", type_token, index + 1)
}

/// Candidate slug for one record before uniqueness is enforced.
pub fn candidate_slug(explicit: &str, title: &str, type_token: &str, index: usize) -> String {
    let explicit = explicit.trim();
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    let derived = slugify(title);
    if !derived.is_empty() {
        return derived;
    }
    fallback_token(type_token, index)
}

/// Hands out slugs that are unique within one resolution pass.
///
/// Explicit CMS slugs are reserved up front with [`SlugAllocator::reserving`],
/// so a derived or suffixed slug never lands on a slug a later record asks
/// for by name.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    taken: HashSet<String>,
    reserved: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator that holds every non-empty explicit slug for its owner.
    pub fn reserving<'a>(explicit: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            taken: HashSet::new(),
            reserved: explicit
                .into_iter()
                .map(str::trim)
                .filter(|slug| !slug.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Take an explicit slug. Only a repeat of one already handed out is
    /// suffixed.
    pub fn claim(&mut self, explicit: String, index: usize) -> String {
        if self.taken.insert(explicit.clone()) {
            return explicit;
        }
        self.suffixed(&explicit, index)
    }

    /// Take a derived `candidate`, or a suffixed variant of it if it is
    /// already taken or reserved.
    pub fn allocate(&mut self, candidate: String, index: usize) -> String {
        if self.is_free(&candidate) {
            self.taken.insert(candidate.clone());
            return candidate;
        }
        self.suffixed(&candidate, index)
    }

    fn is_free(&self, slug: &str) -> bool {
        !self.taken.contains(slug) && !self.reserved.contains(slug)
    }

    fn suffixed(&mut self, candidate: &str, index: usize) -> String {
        let base = format!("{}-{}", candidate, index + 1);
        let mut next = base.clone();
        let mut n = 2;
        while !self.is_free(&next) {
            next = format!("{base}-{n}");
            n += 1;
        }
        self.taken.insert(next.clone());
        next
    }
}

/// Turn a slug back into something readable: `"glacial-highlands"` → `"Glacial highlands"`.
pub fn humanize(slug: &str) -> String {
    let spaced = slug.replace(['-', '_'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
