//! The application shell.
//!
//! Owns every piece of live site state (locale, route, history, loaded data,
//! lightbox, parallax, contact form, theme) and is the only thing that
//! mutates it. Hosts drive it with user events and read back a [`View`].
//!
//! ## Loads
//!
//! Two kinds of data are loaded, each with its own cancellation slot:
//!
//! | Load | Keyed by | Fetches |
//! |------|----------|---------|
//! | site | locale | bootstrap content, navigation, expeditions, categories, stories |
//! | page | page slug + locale | the CMS page backing the route |
//!
//! Every load runs in three phases so a host (or a test) can interleave
//! them:
//!
//! ```text
//! let load = shell.begin_page_load();     // cancels the previous page load
//! let result = load.fetch(shell.api());   // network, no shell access
//! shell.finish_page_load(load, result);   // applied only if still current
//! ```
//!
//! A result is dropped when its token was cancelled or its key no longer
//! matches the current route and locale, so a slow response for an old
//! locale can never overwrite a newer one. [`Shell::refresh`] runs both
//! loads in parallel.
//!
//! ## Routing
//!
//! - `navigate` pushes a history entry and asks the host to scroll to top.
//! - `pop_history` mirrors browser back/forward without pushing.
//! - Once the page list is known, a page route with an unknown slug is
//!   replaced by home.
//! - A failed page load for any slug but home replaces the route with home;
//!   a failed home load leaves the site unavailable.

use crate::api::{ApiError, ContentApi};
use crate::cancel::{CancelSlot, CancellationToken};
use crate::config::SiteConfig;
use crate::contact::{ContactForm, ContactStatus};
use crate::i18n::{Locale, LocaleStore, initial_locale};
use crate::lightbox::{Lightbox, LightboxKey, PageScroll};
use crate::navigation::{MenuItem, MenuPlacement, Menus, NavAction};
use crate::parallax::{FrameScheduler, FrameStyle, HeaderReveal, HeroMetrics, Parallax, StyleSink};
use crate::prefs::{PreferenceStore, THEME_KEY, Theme};
use crate::resolve::{
    ResolvedRecord, find_record, resolve_categories, resolve_expeditions, resolve_stories,
};
use crate::route::{CollectionKind, HOME_SLUG, Route, parse_route, route_to_path};
use crate::section::{Section, fallback_records, parse_sections};
use crate::types::{
    CategoryData, ContentResponse, ExpeditionData, NavigationResponse, Page, PageResponse,
    StoryData,
};
use std::time::Instant;
use tracing::{debug, info, warn};

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Replace,
}

/// Mirror of the browser session history.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Push `url`, discarding any forward entries.
    pub fn push(&mut self, url: String) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(url);
        self.cursor = self.entries.len() - 1;
    }

    pub fn replace(&mut self, url: String) {
        self.entries[self.cursor] = url;
    }

    /// Move to an existing entry (back/forward); unknown URLs replace the
    /// current entry.
    fn pop_to(&mut self, url: &str) {
        match self.entries.iter().rposition(|entry| entry == url) {
            Some(position) => self.cursor = position,
            None => self.replace(url.to_string()),
        }
    }
}

/// Split a location into its path and `lang` query value.
///
/// `"/about/?lang=ru#team"` → `("/about/", Some("ru"))`
pub fn split_url(url: &str) -> (&str, Option<String>) {
    let without_fragment = url.split_once('#').map_or(url, |(before, _)| before);
    let Some((path, query)) = without_fragment.split_once('?') else {
        return (without_fragment, None);
    };
    let lang = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "lang")
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        });
    (path, lang)
}

/// Scroll the host should perform after the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollRequest {
    /// Smooth scroll to the top of the page.
    Top,
    /// Smooth scroll to the element with this id.
    Anchor(String),
}

// ============================================================================
// Loaded data
// ============================================================================

/// Site-wide data for one locale.
#[derive(Debug, Clone, Default)]
pub struct SiteData {
    pub locale: Option<Locale>,
    pub menus: Menus,
    pub expeditions: Vec<ExpeditionData>,
    pub categories: Vec<CategoryData>,
    pub stories: Vec<StoryData>,
    pub error: Option<String>,
}

/// The CMS page backing the current route.
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub key: Option<(String, Locale)>,
    pub page: Option<Page>,
    pub sections: Vec<Section>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct SiteLoad {
    locale: Locale,
    token: CancellationToken,
}

#[derive(Debug)]
pub struct SiteResult {
    pub content: Result<ContentResponse, ApiError>,
    pub navigation: Result<NavigationResponse, ApiError>,
    pub expeditions: Result<Vec<ExpeditionData>, ApiError>,
    pub categories: Result<Vec<CategoryData>, ApiError>,
    pub stories: Result<Vec<StoryData>, ApiError>,
}

impl SiteLoad {
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Fetch all five site resources in parallel.
    pub fn fetch(&self, api: &impl ContentApi) -> SiteResult {
        let lang = &self.locale;
        let cancel = &self.token;
        let ((content, navigation), (expeditions, (categories, stories))) = rayon::join(
            || {
                rayon::join(
                    || api.content(lang, cancel),
                    || api.navigation(lang, None, cancel),
                )
            },
            || {
                rayon::join(
                    || api.expeditions(lang, cancel),
                    || {
                        rayon::join(
                            || api.categories(lang, cancel),
                            || api.stories(lang, cancel),
                        )
                    },
                )
            },
        );
        SiteResult {
            content,
            navigation,
            expeditions,
            categories,
            stories,
        }
    }
}

#[derive(Debug)]
pub struct PageLoad {
    slug: String,
    locale: Locale,
    token: CancellationToken,
}

impl PageLoad {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn fetch(&self, api: &impl ContentApi) -> Result<PageResponse, ApiError> {
        api.page(&self.slug, &self.locale, &self.token)
    }
}

fn keep<T: Default>(result: Result<T, ApiError>, errors: &mut Vec<ApiError>) -> T {
    result.unwrap_or_else(|err| {
        errors.push(err);
        T::default()
    })
}

// ============================================================================
// View
// ============================================================================

/// Resolved records of all three collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub expeditions: Vec<ResolvedRecord>,
    pub categories: Vec<ResolvedRecord>,
    pub stories: Vec<ResolvedRecord>,
}

impl Collections {
    pub fn get(&self, kind: CollectionKind) -> &[ResolvedRecord] {
        match kind {
            CollectionKind::Expeditions => &self.expeditions,
            CollectionKind::Categories => &self.categories,
            CollectionKind::Stories => &self.stories,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub slug: String,
    pub title: String,
    pub seo_title: String,
    pub seo_description: String,
    pub sections: Vec<Section>,
    pub collections: Collections,
}

/// What the current route shows.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    Unavailable {
        message: String,
    },
    Page(PageView),
    CollectionIndex {
        kind: CollectionKind,
        records: Vec<ResolvedRecord>,
    },
    Detail {
        kind: CollectionKind,
        record: ResolvedRecord,
    },
}

// ============================================================================
// Shell
// ============================================================================

pub struct Shell<A: ContentApi, P: PreferenceStore, S: PageScroll> {
    config: SiteConfig,
    api: A,
    prefs: P,
    scroll: S,
    i18n: LocaleStore,
    route: Route,
    history: History,
    lang_in_url: bool,
    site: SiteData,
    page: PageData,
    site_slot: CancelSlot,
    page_slot: CancelSlot,
    lightbox: Lightbox,
    parallax: Parallax,
    header: HeaderReveal,
    contact: ContactForm,
    theme: Theme,
    scroll_request: Option<ScrollRequest>,
}

impl<A: ContentApi, P: PreferenceStore, S: PageScroll> Shell<A, P, S> {
    /// A shell positioned at `url` (path plus optional `?lang=`). Nothing is
    /// fetched until [`Shell::refresh`].
    pub fn new(config: SiteConfig, api: A, prefs: P, scroll: S, url: &str) -> Self {
        let (path, query_lang) = split_url(url);
        let default_locale = Locale::parse(&config.default_locale).unwrap_or_default();
        let locale = initial_locale(query_lang.as_deref(), &prefs, &default_locale);
        let route = parse_route(path);
        let theme = Theme::load(&prefs);

        let mut parallax = Parallax::new(&config.parallax);
        parallax.set_home(route.is_home());
        let mut header = HeaderReveal::new(&config.parallax);
        header.enter_route(route.is_home());
        let lightbox = Lightbox::new(config.lightbox.swipe_threshold_px);

        debug!(%route, %locale, "shell created");
        Self {
            config,
            api,
            prefs,
            scroll,
            i18n: LocaleStore::new(locale),
            route,
            history: History::new(url),
            lang_in_url: query_lang.is_some(),
            site: SiteData::default(),
            page: PageData::default(),
            site_slot: CancelSlot::new(),
            page_slot: CancelSlot::new(),
            lightbox,
            parallax,
            header,
            contact: ContactForm::new(),
            theme,
            scroll_request: None,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn scroll(&self) -> &S {
        &self.scroll
    }

    pub fn i18n(&self) -> &LocaleStore {
        &self.i18n
    }

    pub fn locale(&self) -> &Locale {
        self.i18n.locale()
    }

    pub fn t(&self, key: &str, fallback: Option<&str>) -> String {
        self.i18n.t(key, fallback)
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn site(&self) -> &SiteData {
        &self.site
    }

    pub fn page_data(&self) -> &PageData {
        &self.page
    }

    pub fn menu(&self, placement: MenuPlacement) -> &[MenuItem] {
        self.site.menus.items(placement)
    }

    /// Fetch errors to show as inline warnings.
    pub fn errors(&self) -> Vec<&str> {
        self.site
            .error
            .iter()
            .chain(self.page.error.iter())
            .map(String::as_str)
            .collect()
    }

    /// Take the scroll the host should perform, if any.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll_request.take()
    }

    // ------------------------------------------------------------------
    // Loads
    // ------------------------------------------------------------------

    pub fn needs_site_load(&self) -> bool {
        self.site.locale.as_ref() != Some(self.i18n.locale())
    }

    pub fn needs_page_load(&self) -> bool {
        match &self.page.key {
            Some((slug, locale)) => {
                slug != self.route.page_slug() || locale != self.i18n.locale()
            }
            None => true,
        }
    }

    pub fn begin_site_load(&mut self) -> SiteLoad {
        SiteLoad {
            locale: self.i18n.locale().clone(),
            token: self.site_slot.issue(),
        }
    }

    /// Apply a site load. Returns `false` if the result was stale.
    pub fn finish_site_load(&mut self, load: SiteLoad, result: SiteResult) -> bool {
        if load.token.is_cancelled() || &load.locale != self.i18n.locale() {
            debug!(locale = %load.locale, "dropping stale site data");
            return false;
        }

        let mut errors = Vec::new();
        match result.content {
            Ok(content) => self.i18n.apply_content(content),
            Err(err) => {
                self.i18n.apply_failure();
                errors.push(err);
            }
        }
        let menus = keep(result.navigation, &mut errors).menus;
        let expeditions = keep(result.expeditions, &mut errors);
        let categories = keep(result.categories, &mut errors);
        let stories = keep(result.stories, &mut errors);

        if errors.iter().any(ApiError::is_cancelled) {
            debug!(locale = %load.locale, "site load cancelled mid-flight");
            return false;
        }
        for err in &errors {
            warn!(locale = %load.locale, "site data incomplete: {err}");
        }

        self.site = SiteData {
            locale: Some(load.locale),
            menus,
            expeditions,
            categories,
            stories,
            error: errors.first().map(ToString::to_string),
        };
        self.guard_route();
        true
    }

    pub fn begin_page_load(&mut self) -> PageLoad {
        PageLoad {
            slug: self.route.page_slug().to_string(),
            locale: self.i18n.locale().clone(),
            token: self.page_slot.issue(),
        }
    }

    /// Apply a page load. Returns `false` if the result was stale.
    pub fn finish_page_load(
        &mut self,
        load: PageLoad,
        result: Result<PageResponse, ApiError>,
    ) -> bool {
        let current = load.slug == self.route.page_slug() && &load.locale == self.i18n.locale();
        if load.token.is_cancelled() || !current {
            debug!(slug = %load.slug, locale = %load.locale, "dropping stale page data");
            return false;
        }

        match result {
            Ok(response) => {
                let sections = parse_sections(&response.page);
                self.page = PageData {
                    key: Some((load.slug, load.locale)),
                    page: Some(response.page),
                    sections,
                    error: None,
                };
                self.header.content_loaded(Instant::now());
            }
            Err(err) if err.is_cancelled() => {
                debug!(slug = %load.slug, "page load cancelled mid-flight");
                return false;
            }
            Err(err) if load.slug != HOME_SLUG => {
                warn!(slug = %load.slug, "page load failed, falling back to home: {err}");
                self.goto(Route::home(), HistoryMode::Replace);
            }
            Err(err) => {
                warn!("home page load failed: {err}");
                self.page = PageData {
                    key: Some((load.slug, load.locale)),
                    page: None,
                    sections: Vec::new(),
                    error: Some(err.to_string()),
                };
                self.header.content_loaded(Instant::now());
            }
        }
        true
    }

    /// Load page data until it matches the current route, following the
    /// home fallback if a page fails.
    pub fn load_page(&mut self) {
        while self.needs_page_load() {
            let load = self.begin_page_load();
            let result = load.fetch(&self.api);
            if !self.finish_page_load(load, result) {
                break;
            }
        }
    }

    /// Reload site and page data for the current route and locale.
    pub fn refresh(&mut self) {
        let site_load = self.begin_site_load();
        let page_load = self.begin_page_load();
        let api = &self.api;
        let (site, page) = rayon::join(|| site_load.fetch(api), || page_load.fetch(api));
        self.finish_site_load(site_load, site);
        self.finish_page_load(page_load, page);
        self.load_page();
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    fn known_slugs(&self) -> Vec<String> {
        self.i18n
            .content()
            .map(|content| content.pages.iter().map(|page| page.slug.clone()).collect())
            .unwrap_or_default()
    }

    /// Location for `route`, carrying `?lang=` once the visitor picked one.
    pub fn url_for(&self, route: &Route) -> String {
        let mut known = self.known_slugs();
        if known.is_empty() {
            known.push(route.page_slug().to_string());
        }
        let path = route_to_path(route, &known);
        if self.lang_in_url {
            format!("{path}?lang={}", self.i18n.locale())
        } else {
            path
        }
    }

    fn enter(&mut self, route: Route) {
        if route.page_slug() != self.route.page_slug() {
            self.page_slot.cancel();
        }
        self.parallax.set_home(route.is_home());
        self.header.enter_route(route.is_home());
        self.lightbox.close(&mut self.scroll);
        self.route = route;
        // No fetch follows when the home page data is already loaded.
        if self.route.is_home() && !self.needs_page_load() {
            self.header.content_loaded(Instant::now());
        }
    }

    fn goto(&mut self, route: Route, mode: HistoryMode) {
        let url = self.url_for(&route);
        match mode {
            HistoryMode::Push => self.history.push(url),
            HistoryMode::Replace => self.history.replace(url),
        }
        self.enter(route);
    }

    /// Redirect an unknown page slug home once the page list is known.
    fn guard_route(&mut self) {
        let Route::Page(slug) = &self.route else {
            return;
        };
        if slug == HOME_SLUG {
            return;
        }
        let known = self.known_slugs();
        if known.is_empty() || known.contains(slug) {
            return;
        }
        info!(slug = %slug, "unknown page, redirecting home");
        self.goto(Route::home(), HistoryMode::Replace);
    }

    pub fn navigate(&mut self, path: &str) {
        self.navigate_to(parse_route(path));
    }

    pub fn navigate_to(&mut self, route: Route) {
        info!(%route, "navigate");
        self.goto(route, HistoryMode::Push);
        self.scroll_request = Some(ScrollRequest::Top);
        self.guard_route();
        self.load_page();
    }

    /// Browser back/forward landed on `url`.
    pub fn pop_history(&mut self, url: &str) {
        let (path, _) = split_url(url);
        let route = parse_route(path);
        info!(%route, "history pop");
        self.history.pop_to(url);
        self.enter(route);
        self.guard_route();
        self.load_page();
    }

    /// Follow a menu item. External links are handed back to the host.
    pub fn activate(&mut self, item: &MenuItem) -> Option<NavAction> {
        match item.action() {
            NavAction::Route(route) => {
                self.navigate_to(route);
                None
            }
            NavAction::Anchor(anchor) => {
                if !self.route.is_home() {
                    self.navigate_to(Route::home());
                }
                self.scroll_request = Some(ScrollRequest::Anchor(anchor));
                None
            }
            external @ NavAction::External { .. } => Some(external),
        }
    }

    // ------------------------------------------------------------------
    // Locale and theme
    // ------------------------------------------------------------------

    /// Switch locale without fetching. Cancels both in-flight loads.
    /// Returns `false` for an invalid code.
    pub fn change_locale(&mut self, code: &str) -> bool {
        let previous = self.i18n.locale().clone();
        if !self.i18n.set_locale(code, &self.api, &mut self.prefs) {
            return false;
        }
        if self.i18n.locale() == &previous {
            return true;
        }
        self.lang_in_url = true;
        let url = self.url_for(&self.route);
        self.history.replace(url);
        self.site_slot.cancel();
        self.page_slot.cancel();
        info!(locale = %self.i18n.locale(), "locale changed");
        true
    }

    /// Switch locale and reload content for it.
    pub fn set_locale(&mut self, code: &str) -> bool {
        if !self.change_locale(code) {
            return false;
        }
        if self.needs_site_load() || self.needs_page_load() {
            self.refresh();
        }
        true
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(err) = self.prefs.set(THEME_KEY, theme.as_str()) {
            warn!(theme = theme.as_str(), "could not persist theme: {err}");
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    // ------------------------------------------------------------------
    // Contact form
    // ------------------------------------------------------------------

    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    pub fn contact_mut(&mut self) -> &mut ContactForm {
        &mut self.contact
    }

    pub fn submit_contact(&mut self) -> ContactStatus {
        let t = self.i18n.translator();
        self.contact.submit(&self.api, &t).clone()
    }

    // ------------------------------------------------------------------
    // Lightbox
    // ------------------------------------------------------------------

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// Open the lightbox on the active detail view's `index`th image.
    pub fn open_lightbox(&mut self, index: usize) {
        let images = match self.view() {
            View::Detail { record, .. } => record.images(),
            _ => Vec::new(),
        };
        self.lightbox.set_images(images, &mut self.scroll);
        self.lightbox.open(index, &mut self.scroll);
    }

    pub fn close_lightbox(&mut self) {
        self.lightbox.close(&mut self.scroll);
    }

    pub fn lightbox_next(&mut self) {
        self.lightbox.next();
    }

    pub fn lightbox_previous(&mut self) {
        self.lightbox.previous();
    }

    pub fn lightbox_key(&mut self, key: LightboxKey) -> bool {
        self.lightbox.handle_key(key, &mut self.scroll)
    }

    /// A complete touch gesture from `start` to `end`.
    pub fn lightbox_swipe(&mut self, start: (f64, f64), end: (f64, f64)) -> bool {
        self.lightbox.touch_start(start.0, start.1);
        self.lightbox.touch_end(end.0, end.1)
    }

    // ------------------------------------------------------------------
    // Parallax
    // ------------------------------------------------------------------

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.parallax.set_reduced_motion(reduced);
        self.header.set_reduced_motion(reduced);
    }

    pub fn on_scroll(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        self.parallax.on_scroll(scheduler)
    }

    pub fn on_resize(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        self.parallax.on_resize(scheduler)
    }

    pub fn on_hero_resize(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        self.parallax.on_hero_resize(scheduler)
    }

    pub fn run_frame(&mut self, metrics: &HeroMetrics, sink: &mut impl StyleSink) -> FrameStyle {
        self.parallax.run_frame(metrics, sink)
    }

    /// Advance the header reveal timer to `now`.
    pub fn header_revealed(&mut self, now: Instant) -> bool {
        self.header.poll(now)
    }

    /// Header state as of the last poll.
    pub fn header_visible(&self) -> bool {
        self.header.is_revealed()
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    pub fn collections(&self) -> Collections {
        let t = self.i18n.translator();
        let sections = &self.page.sections;
        Collections {
            expeditions: resolve_expeditions(
                &self.site.expeditions,
                &fallback_records(sections, CollectionKind::Expeditions),
                &t,
            ),
            categories: resolve_categories(
                &self.site.categories,
                &fallback_records(sections, CollectionKind::Categories),
                &t,
            ),
            stories: resolve_stories(
                &self.site.stories,
                &fallback_records(sections, CollectionKind::Stories),
                &t,
            ),
        }
    }

    pub fn view(&self) -> View {
        if self.needs_site_load() || self.needs_page_load() {
            return View::Loading;
        }
        let Some(page) = &self.page.page else {
            return View::Unavailable {
                message: self.t(
                    "page.unavailable",
                    Some("This content is unavailable right now."),
                ),
            };
        };

        let mut collections = self.collections();
        match &self.route {
            Route::Page(_) => View::Page(PageView {
                slug: page.slug.clone(),
                title: page.title.clone(),
                seo_title: page.seo_title.clone(),
                seo_description: page.seo_description.clone(),
                sections: self.page.sections.clone(),
                collections,
            }),
            Route::CollectionIndex(kind) => View::CollectionIndex {
                kind: *kind,
                records: match kind {
                    CollectionKind::Expeditions => std::mem::take(&mut collections.expeditions),
                    CollectionKind::Categories => std::mem::take(&mut collections.categories),
                    CollectionKind::Stories => std::mem::take(&mut collections.stories),
                },
            },
            Route::Detail(kind, slug) => match find_record(collections.get(*kind), slug) {
                Some(record) => View::Detail {
                    kind: *kind,
                    record: record.clone(),
                },
                None => View::Unavailable {
                    message: self.t("detail.not_found", Some("This item could not be found.")),
                },
            },
        }
    }
}
