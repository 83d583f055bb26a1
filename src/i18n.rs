//! Localization store.
//!
//! Holds the current [`Locale`], the flat key → string dictionary for it, and
//! the bootstrap payload the dictionary came from. Lookups never fail:
//!
//! ```text
//! t("contact.submit", Some("Send message"))
//!   dictionary has a non-empty value  → that value
//!   else fallback is non-empty        → "Send message"
//!   else                              → "contact.submit"
//! ```
//!
//! ## Locale Changes
//!
//! [`LocaleStore::set_locale`] clears the dictionary before the new one is
//! fetched, so while loading every lookup shows its fallback text rather
//! than a string in the previous language. The shell feeds the next
//! bootstrap payload back through [`LocaleStore::apply_content`].

use crate::api::ContentApi;
use crate::prefs::{LOCALE_KEY, PreferenceStore};
use crate::types::ContentResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

pub type Dictionary = BTreeMap<String, String>;

/// A validated locale code: lowercase letters, digits and hyphens, 2-12 chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Normalize (trim, lowercase) and validate a locale code.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        let valid_len = (2..=12).contains(&normalized.len());
        let valid_chars = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        (valid_len && valid_chars).then_some(Locale(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Locale {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::parse(&value).ok_or_else(|| format!("invalid locale code: {value:?}"))
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// Pick the starting locale: `?lang=` query value, then the saved
/// preference, then the configured default.
pub fn initial_locale(
    query_lang: Option<&str>,
    prefs: &impl PreferenceStore,
    default: &Locale,
) -> Locale {
    query_lang
        .and_then(Locale::parse)
        .or_else(|| prefs.get(LOCALE_KEY).as_deref().and_then(Locale::parse))
        .unwrap_or_else(|| default.clone())
}

/// Look `key` up in `dictionary` with the fallback chain described above.
pub fn lookup(dictionary: &Dictionary, key: &str, fallback: Option<&str>) -> String {
    if let Some(value) = dictionary.get(key).filter(|value| !value.is_empty()) {
        return value.clone();
    }
    match fallback {
        Some(fallback) if !fallback.is_empty() => fallback.to_string(),
        _ => key.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LocaleStore {
    locale: Locale,
    dictionary: Dictionary,
    content: Option<ContentResponse>,
    loading: bool,
}

impl LocaleStore {
    /// A store for `locale` with no dictionary yet (loading).
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            dictionary: Dictionary::new(),
            content: None,
            loading: true,
        }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Value for the document's `lang` attribute.
    pub fn html_lang(&self) -> &str {
        self.locale.as_str()
    }

    pub fn content(&self) -> Option<&ContentResponse> {
        self.content.as_ref()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn t(&self, key: &str, fallback: Option<&str>) -> String {
        lookup(&self.dictionary, key, fallback)
    }

    /// Borrowing translator for resolvers and renderers.
    pub fn translator(&self) -> impl Fn(&str, Option<&str>) -> String + '_ {
        move |key, fallback| self.t(key, fallback)
    }

    /// Switch to `code`.
    ///
    /// Returns `false` and changes nothing when `code` is not a valid locale.
    /// Telling the backend about the new preference is best-effort: a failure
    /// is logged and the switch still happens client-side.
    pub fn set_locale(
        &mut self,
        code: &str,
        api: &impl ContentApi,
        prefs: &mut impl PreferenceStore,
    ) -> bool {
        let Some(next) = Locale::parse(code) else {
            debug!(code, "ignoring invalid locale code");
            return false;
        };
        if next == self.locale {
            return true;
        }

        if let Err(err) = api.set_language(&next) {
            debug!(locale = %next, "language preference not recorded: {err}");
        }
        if let Err(err) = prefs.set(LOCALE_KEY, next.as_str()) {
            warn!(locale = %next, "could not persist locale choice: {err}");
        }

        self.locale = next;
        self.dictionary.clear();
        self.content = None;
        self.loading = true;
        true
    }

    /// Install a freshly fetched bootstrap payload for the current locale.
    pub fn apply_content(&mut self, content: ContentResponse) {
        self.dictionary = content.texts.clone();
        self.content = Some(content);
        self.loading = false;
    }

    /// The bootstrap fetch failed: keep fallbacks, stop loading.
    pub fn apply_failure(&mut self) {
        self.dictionary.clear();
        self.content = None;
        self.loading = false;
    }
}
