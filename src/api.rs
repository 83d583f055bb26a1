//! CMS content fetchers.
//!
//! The [`ContentApi`] trait is the seam between the site logic and the
//! network: one method per resource, each returning a typed payload or an
//! [`ApiError`]. The production implementation is [`HttpApi`]; tests use an
//! in-memory double.
//!
//! ## Endpoints
//!
//! ```text
//! GET  {base}/content/?lang=            bootstrap: site settings, texts, pages, languages
//! GET  {base}/navigation/?lang=&menu=   menus grouped by placement
//! GET  {base}/pages/{slug}/?lang=       one page with its sections
//! GET  {base}/expeditions/?lang=        collection records
//! GET  {base}/categories/?lang=
//! GET  {base}/stories/?lang=
//! POST {base}/contact-messages/         {name, email, message} → {status, id}
//! POST {base}/i18n/set-language/        {lang}
//! ```
//!
//! ## Errors
//!
//! A non-2xx response becomes [`ApiError::Status`]. Its message is the
//! server's `{"detail": ...}` when the body carries one, otherwise
//! `Request failed (<status>)`. Fetches never retry.
//!
//! ## Cancellation
//!
//! Read methods take a [`CancellationToken`]. A token cancelled before the
//! request goes out, or before the decoded body is handed back, yields
//! [`ApiError::Cancelled`] so callers never act on a stale payload.

use crate::cancel::CancellationToken;
use crate::i18n::Locale;
use crate::navigation::MenuPlacement;
use crate::types::{
    CategoryData, ContactMessage, ContactReceipt, ContentResponse, ExpeditionData,
    NavigationResponse, PageResponse, StoryData,
};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("{}", status_message(.status, .detail))]
    Status { status: u16, detail: Option<String> },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Invalid API base URL: {0}")]
    InvalidBase(String),
}

fn status_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("Request failed ({status})"),
    }
}

impl ApiError {
    /// Server-provided detail message, if this is a status error that had one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// Everything the site reads from or writes to the CMS.
///
/// `Sync` so loads can fan out across rayon workers.
pub trait ContentApi: Sync {
    fn content(&self, lang: &Locale, cancel: &CancellationToken)
    -> Result<ContentResponse, ApiError>;

    fn navigation(
        &self,
        lang: &Locale,
        menu: Option<MenuPlacement>,
        cancel: &CancellationToken,
    ) -> Result<NavigationResponse, ApiError>;

    fn page(
        &self,
        slug: &str,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<PageResponse, ApiError>;

    fn expeditions(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExpeditionData>, ApiError>;

    fn categories(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<CategoryData>, ApiError>;

    fn stories(&self, lang: &Locale, cancel: &CancellationToken)
    -> Result<Vec<StoryData>, ApiError>;

    fn send_contact(&self, message: &ContactMessage) -> Result<ContactReceipt, ApiError>;

    /// Record the visitor's language preference server-side.
    fn set_language(&self, lang: &Locale) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// [`ContentApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base: Url,
    client: Client,
}

impl HttpApi {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let trimmed = base.trim().trim_end_matches('/');
        let base = Url::parse(&format!("{trimmed}/"))
            .map_err(|e| ApiError::InvalidBase(format!("{base}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { base, client })
    }

    /// Absolute URL for `path` under the API base, with non-empty params
    /// appended as a query string.
    pub fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let relative = path.trim_start_matches('/');
        let mut url = self
            .base
            .join(relative)
            .map_err(|e| ApiError::InvalidBase(e.to_string()))?;
        let present: Vec<_> = params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        if !present.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in present {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        let url = self.url(path, params)?;
        debug!(%url, "GET");
        let value = send_json(self.client.get(url))?;
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        Ok(value)
    }

    fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        debug!(%url, "POST");
        send_json(self.client.post(url).json(body))
    }
}

fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request
        .send()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status();
    let text = response
        .text()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    if !status.is_success() {
        return Err(status_error(status.as_u16(), &text));
    }
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Build the error for a non-2xx response body.
pub fn status_error(status: u16, body: &str) -> ApiError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.detail)
        .map(|detail| detail.trim().to_string())
        .filter(|detail| !detail.is_empty());
    ApiError::Status { status, detail }
}

impl ContentApi for HttpApi {
    fn content(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<ContentResponse, ApiError> {
        self.get_json("content/", &[("lang", lang.as_str())], cancel)
    }

    fn navigation(
        &self,
        lang: &Locale,
        menu: Option<MenuPlacement>,
        cancel: &CancellationToken,
    ) -> Result<NavigationResponse, ApiError> {
        let menu = menu.map(MenuPlacement::code).unwrap_or_default();
        self.get_json(
            "navigation/",
            &[("lang", lang.as_str()), ("menu", menu)],
            cancel,
        )
    }

    fn page(
        &self,
        slug: &str,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<PageResponse, ApiError> {
        let path = format!("pages/{}/", urlencoding::encode(slug));
        self.get_json(&path, &[("lang", lang.as_str())], cancel)
    }

    fn expeditions(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExpeditionData>, ApiError> {
        self.get_json("expeditions/", &[("lang", lang.as_str())], cancel)
    }

    fn categories(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<CategoryData>, ApiError> {
        self.get_json("categories/", &[("lang", lang.as_str())], cancel)
    }

    fn stories(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<StoryData>, ApiError> {
        self.get_json("stories/", &[("lang", lang.as_str())], cancel)
    }

    fn send_contact(&self, message: &ContactMessage) -> Result<ContactReceipt, ApiError> {
        self.post_json("contact-messages/", message)
    }

    fn set_language(&self, lang: &Locale) -> Result<(), ApiError> {
        #[derive(serde::Serialize)]
        struct Body<'a> {
            lang: &'a str,
        }
        let _: serde_json::Value = self.post_json(
            "i18n/set-language/",
            &Body {
                lang: lang.as_str(),
            },
        )?;
        Ok(())
    }
}
