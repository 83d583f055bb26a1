//! End-to-end scenarios against an in-memory CMS: routing, loading,
//! localization, lightbox and contact flows through the public shell API.

use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Mutex;
use studio_site::api::{ApiError, ContentApi, status_error};
use studio_site::cancel::CancellationToken;
use studio_site::config::SiteConfig;
use studio_site::contact::ContactStatus;
use studio_site::i18n::Locale;
use studio_site::lightbox::{LightboxKey, MemoryScroll};
use studio_site::navigation::MenuPlacement;
use studio_site::prefs::{LOCALE_KEY, MemoryPreferences, PreferenceStore};
use studio_site::render::render_document;
use studio_site::resolve::MediaBlock;
use studio_site::route::Route;
use studio_site::shell::{Shell, View};
use studio_site::types::{
    CategoryData, ContactMessage, ContactReceipt, ContentResponse, ExpeditionData,
    ExpeditionMedia, NavigationResponse, Page, PageResponse, PageSection, PageSummary, StoryData,
};

// ============================================================================
// In-memory CMS
// ============================================================================

#[derive(Default)]
struct Cms {
    texts: BTreeMap<String, BTreeMap<String, String>>,
    pages: Vec<Page>,
    expeditions: Vec<ExpeditionData>,
    contact_failure: Option<(u16, String)>,
    contacts: Mutex<Vec<ContactMessage>>,
    page_requests: Mutex<Vec<String>>,
}

impl Cms {
    fn studio() -> Self {
        let mut texts = BTreeMap::new();
        texts.insert("en".to_string(), BTreeMap::new());
        texts.insert(
            "ru".to_string(),
            BTreeMap::from([
                ("expedition.glacier.title".to_string(), "Ледник".to_string()),
                ("brand.name".to_string(), "Студия".to_string()),
            ]),
        );
        Cms {
            texts,
            pages: vec![home(), about()],
            expeditions: vec![glacier()],
            ..Default::default()
        }
    }

    fn failing_contact(mut self, status: u16, body: &str) -> Self {
        self.contact_failure = Some((status, body.to_string()));
        self
    }

    fn page_requests(&self) -> Vec<String> {
        self.page_requests.lock().unwrap().clone()
    }
}

fn live(cancel: &CancellationToken) -> Result<(), ApiError> {
    if cancel.is_cancelled() {
        Err(ApiError::Cancelled)
    } else {
        Ok(())
    }
}

impl ContentApi for Cms {
    fn content(
        &self,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<ContentResponse, ApiError> {
        live(cancel)?;
        Ok(ContentResponse {
            lang: lang.to_string(),
            default_lang: "en".to_string(),
            texts: self.texts.get(lang.as_str()).cloned().unwrap_or_default(),
            pages: self
                .pages
                .iter()
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
        live(cancel)?;
        Ok(NavigationResponse {
            lang: lang.to_string(),
            ..Default::default()
        })
    }

    fn page(
        &self,
        slug: &str,
        lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<PageResponse, ApiError> {
        self.page_requests
            .lock()
            .unwrap()
            .push(format!("{slug}@{lang}"));
        live(cancel)?;
        match self.pages.iter().find(|page| page.slug == slug) {
            Some(page) => Ok(PageResponse {
                lang: lang.to_string(),
                page: page.clone(),
            }),
            None => Err(status_error(404, r#"{"detail":"Not found."}"#)),
        }
    }

    fn expeditions(
        &self,
        _lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExpeditionData>, ApiError> {
        live(cancel)?;
        Ok(self.expeditions.clone())
    }

    fn categories(
        &self,
        _lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<CategoryData>, ApiError> {
        live(cancel)?;
        Ok(Vec::new())
    }

    fn stories(
        &self,
        _lang: &Locale,
        cancel: &CancellationToken,
    ) -> Result<Vec<StoryData>, ApiError> {
        live(cancel)?;
        Ok(Vec::new())
    }

    fn send_contact(&self, message: &ContactMessage) -> Result<ContactReceipt, ApiError> {
        self.contacts.lock().unwrap().push(message.clone());
        match &self.contact_failure {
            Some((status, body)) => Err(status_error(*status, body)),
            None => Ok(ContactReceipt {
                status: "ok".to_string(),
                id: 7,
            }),
        }
    }

    fn set_language(&self, _lang: &Locale) -> Result<(), ApiError> {
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn section(key: &str, section_type: &str, payload: serde_json::Value) -> PageSection {
    PageSection {
        key: key.to_string(),
        section_type: section_type.to_string(),
        title: key.to_string(),
        payload: payload.as_object().cloned().unwrap_or_default(),
        ..Default::default()
    }
}

fn home() -> Page {
    Page {
        slug: "home".to_string(),
        title: "Home".to_string(),
        is_home: true,
        sections: vec![
            section("hero", "hero", json!({"kicker": "Travel & Expedition"})),
            section(
                "stories",
                "stories",
                json!({"items": [{"title": "North Wind", "date": "May 2024"}]}),
            ),
            section("contact", "contact", json!({"email": "hello@studio.test"})),
        ],
        ..Default::default()
    }
}

fn about() -> Page {
    Page {
        slug: "about".to_string(),
        title: "About".to_string(),
        ..Default::default()
    }
}

fn media(kind: &str, url: &str) -> ExpeditionMedia {
    let mut item = ExpeditionMedia {
        kind: kind.to_string(),
        ..Default::default()
    };
    match kind {
        "video" => item.video_url = url.to_string(),
        "story" => item.body = url.to_string(),
        _ => item.image_url = url.to_string(),
    }
    item
}

fn glacier() -> ExpeditionData {
    ExpeditionData {
        slug: "glacier".to_string(),
        title: "Glacier Crossing".to_string(),
        description: "Ten days on the ice.".to_string(),
        image_url: "glacier.jpg".to_string(),
        media_items: vec![
            media("image", "ice-1.jpg"),
            media("video", "crossing.mp4"),
            media("image", "ice-2.jpg"),
            media("story", "We left before dawn."),
        ],
        ..Default::default()
    }
}

type CmsShell = Shell<Cms, MemoryPreferences, MemoryScroll>;

fn shell_with(cms: Cms, prefs: MemoryPreferences, url: &str) -> CmsShell {
    Shell::new(
        SiteConfig::default(),
        cms,
        prefs,
        MemoryScroll::new("auto"),
        url,
    )
}

fn loaded(url: &str) -> CmsShell {
    let mut shell = shell_with(Cms::studio(), MemoryPreferences::new(), url);
    shell.refresh();
    shell
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn detail_view_ends_with_video_and_renders() {
    let shell = loaded("/expeditions/glacier/");
    let View::Detail { record, .. } = shell.view() else {
        panic!("expected a detail view");
    };
    assert_eq!(record.title, "Glacier Crossing");
    assert!(record.blocks.first().is_some_and(MediaBlock::is_image));
    assert!(record.blocks.last().is_some_and(MediaBlock::is_video));
    assert_eq!(record.images().len(), 2);

    let html = render_document(&shell).into_string();
    assert!(html.contains("Glacier Crossing"));
    assert!(html.contains("crossing.mp4"));
}

#[test]
fn unknown_detail_slug_is_unavailable() {
    let shell = loaded("/expeditions/unknown-slug/");
    assert!(matches!(shell.view(), View::Unavailable { .. }));
    let html = render_document(&shell).into_string();
    assert!(html.contains("This item could not be found."));
}

#[test]
fn unknown_page_redirects_home() {
    let shell = loaded("/ghost/");
    assert_eq!(shell.route(), &Route::home());
    assert_eq!(shell.history().current(), "/");
    assert!(matches!(shell.view(), View::Page(_)));
}

#[test]
fn section_fallback_backs_story_routes() {
    let shell = loaded("/stories/");
    let View::CollectionIndex { records, .. } = shell.view() else {
        panic!("expected an index view");
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "North Wind");
    assert_eq!(records[0].date, "May 2024");
}

#[test]
fn moving_between_details_does_not_refetch() {
    let mut shell = loaded("/expeditions/glacier/");
    shell.navigate("/stories/");
    shell.navigate("/expeditions/glacier/");
    assert_eq!(shell.api().page_requests(), vec!["home@en"]);
    assert_eq!(shell.history().entries().len(), 3);
}

#[test]
fn stale_results_after_locale_switch_are_dropped() {
    let mut shell = shell_with(Cms::studio(), MemoryPreferences::new(), "/expeditions/glacier/");

    let site_load = shell.begin_site_load();
    let page_load = shell.begin_page_load();
    let site = site_load.fetch(shell.api());
    let page = page_load.fetch(shell.api());

    assert!(shell.change_locale("ru"));
    assert!(!shell.finish_site_load(site_load, site));
    assert!(!shell.finish_page_load(page_load, page));
    assert!(matches!(shell.view(), View::Loading));

    shell.refresh();
    let View::Detail { record, .. } = shell.view() else {
        panic!("expected a detail view");
    };
    assert_eq!(record.title, "Ледник");
    assert_eq!(shell.history().current(), "/expeditions/glacier/?lang=ru");
    assert_eq!(shell.prefs().get(LOCALE_KEY).as_deref(), Some("ru"));
}

#[test]
fn stored_locale_is_used_and_query_wins() {
    let mut prefs = MemoryPreferences::new();
    prefs.set(LOCALE_KEY, "ru").unwrap();
    let shell = shell_with(Cms::studio(), prefs.clone(), "/");
    assert_eq!(shell.locale().as_str(), "ru");

    let shell = shell_with(Cms::studio(), prefs, "/?lang=en");
    assert_eq!(shell.locale().as_str(), "en");
}

#[test]
fn lightbox_wraps_and_navigation_restores_scroll() {
    let mut shell = loaded("/expeditions/glacier/");
    shell.open_lightbox(0);
    assert_eq!(shell.scroll().overflow, "hidden");

    shell.lightbox_previous();
    assert_eq!(shell.lightbox().index(), Some(1));
    assert!(shell.lightbox_swipe((200.0, 10.0), (20.0, 15.0)));
    assert_eq!(shell.lightbox().index(), Some(0));

    shell.navigate("/");
    assert!(!shell.lightbox().is_open());
    assert_eq!(shell.scroll().overflow, "auto");
}

#[test]
fn escape_closes_lightbox() {
    let mut shell = loaded("/expeditions/glacier/");
    shell.open_lightbox(1);
    assert!(shell.lightbox_key(LightboxKey::Escape));
    assert!(!shell.lightbox().is_open());
    assert_eq!(shell.scroll().overflow, "auto");
}

#[test]
fn contact_success_clears_fields() {
    let mut shell = loaded("/");
    let form = shell.contact_mut();
    form.name = "Ada".into();
    form.email = "ada@example.com".into();
    form.message = "Hello".into();

    let status = shell.submit_contact();
    assert_eq!(
        status,
        ContactStatus::Success("Thank you! Your message has been sent.".into())
    );
    assert!(shell.contact().email.is_empty());
    assert_eq!(shell.api().contacts.lock().unwrap().len(), 1);
}

#[test]
fn contact_rejection_keeps_fields() {
    let cms = Cms::studio().failing_contact(400, r#"{"detail":"Invalid email"}"#);
    let mut shell = shell_with(cms, MemoryPreferences::new(), "/");
    shell.refresh();
    let form = shell.contact_mut();
    form.name = "Ada".into();
    form.email = "not-an-email".into();
    form.message = "Hello".into();

    assert_eq!(
        shell.submit_contact(),
        ContactStatus::Error("Invalid email".into())
    );
    assert_eq!(shell.contact().email, "not-an-email");
    let html = render_document(&shell).into_string();
    assert!(html.contains("Invalid email"));
}
