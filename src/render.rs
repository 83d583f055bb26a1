//! HTML rendering of the shell's current view.
//!
//! One full document per call: header (brand, main menu, language
//! switcher, theme toggle), inline fetch warnings, the view itself, the
//! footer and, when open, the lightbox overlay.
//!
//! ## Views
//!
//! | View | Markup |
//! |------|--------|
//! | `Loading` | localized loading notice |
//! | `Unavailable` | full-page notice |
//! | `Page` | one `<section id=anchor>` per page section |
//! | `CollectionIndex` | card grid linking to detail routes |
//! | `Detail` | ordered media blocks (image, story, video) |
//!
//! Rich-text bodies are Markdown, converted with pulldown-cmark. Everything
//! else goes through maud's escaping.
//!
//! The stylesheet is embedded at compile time from `static/site.css`.

use crate::api::ContentApi;
use crate::contact::{ContactForm, ContactStatus};
use crate::lightbox::{Lightbox, PageScroll};
use crate::navigation::{MenuItem, MenuPlacement, NavAction};
use crate::prefs::{PreferenceStore, Theme};
use crate::resolve::{MediaBlock, ResolvedRecord};
use crate::route::{CollectionKind, Route, route_to_path};
use crate::section::{Section, SectionContent};
use crate::shell::{Collections, PageView, Shell, View};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

const CSS: &str = include_str!("../static/site.css");

/// Translator shared by every render function.
type Tr<'a> = &'a dyn Fn(&str, Option<&str>) -> String;

fn markdown(source: &str) -> Markup {
    let parser = Parser::new(source);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    PreEscaped(body_html)
}

fn href_for(route: &Route) -> String {
    route_to_path(route, &[route.page_slug()])
}

/// Percent-encode the characters that could end a quoted CSS `url('...')`.
fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\'' => out.push_str("%27"),
            '"' => out.push_str("%22"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '\\' => out.push_str("%5C"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Document `<title>`: page title, then the brand.
pub fn document_title(view: &View, brand: &str) -> String {
    let title = match view {
        View::Page(page) if !page.seo_title.is_empty() => page.seo_title.clone(),
        View::Page(page) => page.title.clone(),
        View::Detail { record, .. } => record.title.clone(),
        _ => String::new(),
    };
    match (title.is_empty(), brand.is_empty()) {
        (true, _) => brand.to_string(),
        (false, true) => title,
        (false, false) => format!("{title} · {brand}"),
    }
}

/// Render the shell's current state as a complete HTML document.
pub fn render_document<A, P, S>(shell: &Shell<A, P, S>) -> Markup
where
    A: ContentApi,
    P: PreferenceStore,
    S: PageScroll,
{
    let tr = shell.i18n().translator();
    let t: Tr<'_> = &tr;
    let view = shell.view();
    let settings = shell.i18n().content().map(|content| &content.site);
    let brand = settings
        .map(|site| site.brand_name.as_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| t("brand.name", Some("Studio")));
    let description = match &view {
        View::Page(page) if !page.seo_description.is_empty() => page.seo_description.clone(),
        _ => settings
            .map(|site| site.seo_description.clone())
            .unwrap_or_default(),
    };

    let content = html! {
        (site_header(shell, &brand, t))
        @for error in shell.errors() {
            p.inline-warning role="status" { (error) }
        }
        main {
            (render_view(&view, shell.contact(), t))
        }
        (site_footer(shell, &brand, t))
        (render_lightbox(shell.lightbox(), t))
    };

    base_document(
        shell.i18n().html_lang(),
        &document_title(&view, &brand),
        &description,
        shell.theme(),
        content,
    )
}

fn base_document(lang: &str, title: &str, description: &str, theme: Theme, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) data-theme=(theme.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header<A, P, S>(shell: &Shell<A, P, S>, brand: &str, t: Tr<'_>) -> Markup
where
    A: ContentApi,
    P: PreferenceStore,
    S: PageScroll,
{
    let languages = shell
        .i18n()
        .content()
        .map(|content| content.languages.as_slice())
        .unwrap_or_default();
    let current = shell.locale().as_str();
    let theme_label = match shell.theme() {
        Theme::Light => t("theme.dark", Some("Dark mode")),
        Theme::Dark => t("theme.light", Some("Light mode")),
    };
    html! {
        header.site-header.is-hidden[!shell.header_visible()] {
            a.brand href="/" { (brand) }
            nav.site-nav aria-label=(t("nav.main", Some("Main"))) {
                (render_menu(shell.menu(MenuPlacement::Main), t))
            }
            @if languages.len() > 1 {
                ul.language-switcher {
                    @for language in languages {
                        @let active = language.code == current;
                        li class=[active.then_some("current")] {
                            a href={ "?lang=" (language.code) } hreflang=(language.code) {
                                (language.name)
                            }
                        }
                    }
                }
            }
            button.theme-toggle type="button" data-theme-toggle { (theme_label) }
        }
    }
}

fn menu_label(item: &MenuItem, t: Tr<'_>) -> String {
    if item.label_key.trim().is_empty() {
        item.label.clone()
    } else {
        t(item.label_key.trim(), Some(&item.label))
    }
}

pub fn render_menu(items: &[MenuItem], t: Tr<'_>) -> Markup {
    html! {
        ul {
            @for item in items {
                li { (render_menu_item(item, t)) }
            }
        }
    }
}

fn render_menu_item(item: &MenuItem, t: Tr<'_>) -> Markup {
    let label = menu_label(item, t);
    match item.action() {
        NavAction::Route(route) => html! {
            a href=(href_for(&route)) { (label) }
        },
        NavAction::Anchor(anchor) => html! {
            a href={ "/#" (anchor) } { (label) }
        },
        NavAction::External { href, new_tab } => html! {
            @if new_tab {
                a href=(href) target="_blank" rel="noopener noreferrer" { (label) }
            } @else {
                a href=(href) { (label) }
            }
        },
    }
}

pub fn render_view(view: &View, contact: &ContactForm, t: Tr<'_>) -> Markup {
    match view {
        View::Loading => html! {
            p.loading aria-busy="true" { (t("ui.loading", Some("Loading content…"))) }
        },
        View::Unavailable { message } => html! {
            section.unavailable {
                h1 { (t("ui.unavailable_title", Some("Content unavailable"))) }
                p { (message) }
                a href="/" { (t("nav.home", Some("Home"))) }
            }
        },
        View::Page(page) => render_page(page, contact, t),
        View::CollectionIndex { kind, records } => html! {
            section.collection-index {
                h1 { (collection_title(*kind, t)) }
                (render_cards(records))
            }
        },
        View::Detail { record, .. } => render_detail(record, t),
    }
}

fn collection_title(kind: CollectionKind, t: Tr<'_>) -> String {
    match kind {
        CollectionKind::Expeditions => t("nav.expeditions", Some("Expeditions")),
        CollectionKind::Categories => t("nav.focus", Some("Focus areas")),
        CollectionKind::Stories => t("nav.stories", Some("Stories")),
    }
}

fn render_page(page: &PageView, contact: &ContactForm, t: Tr<'_>) -> Markup {
    html! {
        @for section in &page.sections {
            (render_section(section, &page.collections, contact, t))
        }
    }
}

/// Translated section field, `None` when neither a translation nor raw text
/// exists.
fn section_text(section: &Section, field: &str, raw: &str, t: Tr<'_>) -> Option<String> {
    let key = section.text_key(field);
    let value = t(&key, Some(raw));
    (value != key && !value.trim().is_empty()).then_some(value)
}

fn render_section(
    section: &Section,
    collections: &Collections,
    contact: &ContactForm,
    t: Tr<'_>,
) -> Markup {
    let title = section_text(section, "title", &section.title, t).unwrap_or_default();
    let subtitle = section_text(section, "subtitle", &section.subtitle, t);
    let body = section_text(section, "body", &section.body, t);

    match &section.content {
        SectionContent::Hero(hero) => {
            let background = section
                .images
                .first()
                .map(|image| image.image_url.as_str())
                .unwrap_or(&hero.background_image);
            html! {
                section.hero id=(section.anchor) {
                    @if !background.is_empty() {
                        div.hero-media style={ "background-image: url('" (css_url(background)) "')" } {}
                    }
                    div.hero-text {
                        @if !hero.kicker.is_empty() {
                            p.kicker { (hero.kicker) }
                        }
                        h1 { (title) }
                        @if let Some(subtitle) = &subtitle {
                            p.subtitle { (subtitle) }
                        }
                        @if !hero.scroll_label.is_empty() {
                            a.scroll-cue href="#expeditions" { (hero.scroll_label) }
                        }
                    }
                }
            }
        }
        SectionContent::RichText { .. } => html! {
            section.rich-text id=(section.anchor) {
                h2 { (title) }
                @if let Some(body) = &body {
                    (markdown(body))
                }
            }
        },
        SectionContent::Cards(list) | SectionContent::Stories(list) => {
            let kind = section
                .kind()
                .fallback_for()
                .unwrap_or(CollectionKind::Expeditions);
            html! {
                section.collection id=(section.anchor) {
                    @if !list.eyebrow.is_empty() {
                        p.eyebrow { (list.eyebrow) }
                    }
                    h2 { (title) }
                    @if let Some(subtitle) = &subtitle {
                        p.subtitle { (subtitle) }
                    }
                    (render_cards(collections.get(kind)))
                    @if !list.cta_label.is_empty() {
                        a.cta href=(href_for(&Route::CollectionIndex(kind))) { (list.cta_label) }
                    }
                }
            }
        }
        SectionContent::Gallery(list) => html! {
            section.gallery id=(section.anchor) {
                @if !list.eyebrow.is_empty() {
                    p.eyebrow { (list.eyebrow) }
                }
                h2 { (title) }
                div.tile-grid {
                    @for record in collections.get(CollectionKind::Categories) {
                        a class={ "tile tile-" (record.size.as_str()) }
                            href=(href_for(&Route::Detail(record.kind, record.slug.clone()))) {
                            @if !record.image.is_empty() {
                                img src=(record.image) alt=(record.title) loading="lazy";
                            }
                            span.tile-title { (record.title) }
                        }
                    }
                }
            }
        },
        SectionContent::Contact(payload) => html! {
            section.contact id=(section.anchor) {
                h2 { (title) }
                @if let Some(body) = &body {
                    p { (body) }
                }
                @if !payload.location.is_empty() {
                    p.location { (payload.location) }
                }
                @if !payload.email.is_empty() {
                    a.email href={ "mailto:" (payload.email) } { (payload.email) }
                }
                (render_contact_form(contact, t))
            }
        },
        SectionContent::Unknown { .. } => html! {},
    }
}

fn render_cards(records: &[ResolvedRecord]) -> Markup {
    html! {
        div.card-grid {
            @for record in records {
                article.card {
                    a href=(href_for(&Route::Detail(record.kind, record.slug.clone()))) {
                        @if !record.image.is_empty() {
                            img src=(record.image) alt=(record.title) loading="lazy";
                        }
                        h3 { (record.title) }
                    }
                    @if !record.date.is_empty() {
                        p.date { (record.date) }
                    }
                    @if !record.subtitle.is_empty() {
                        p.subtitle { (record.subtitle) }
                    }
                }
            }
        }
    }
}

pub fn render_detail(record: &ResolvedRecord, t: Tr<'_>) -> Markup {
    // Pair each block with the lightbox index of the next image.
    let mut images_seen = 0;
    let blocks: Vec<(usize, &MediaBlock)> = record
        .blocks
        .iter()
        .map(|block| {
            let index = images_seen;
            if block.is_image() {
                images_seen += 1;
            }
            (index, block)
        })
        .collect();
    html! {
        article.detail {
            a.back href=(href_for(&Route::CollectionIndex(record.kind))) {
                "← " (collection_title(record.kind, t))
            }
            header {
                h1 { (record.title) }
                @if !record.date.is_empty() {
                    p.date { (record.date) }
                }
                @if !record.subtitle.is_empty() {
                    p.subtitle { (record.subtitle) }
                }
            }
            div.detail-blocks {
                @for (image_index, block) in &blocks {
                    @match block {
                        MediaBlock::Image(image) => {
                            figure.block-image data-lightbox-index=(image_index) {
                                img src=(image.url) alt=(image.alt) loading="lazy";
                                @if !image.caption.is_empty() {
                                    figcaption { (image.caption) }
                                }
                            }
                        }
                        MediaBlock::Story { title, body } => {
                            section.block-story {
                                @if !title.is_empty() {
                                    h2 { (title) }
                                }
                                (markdown(body))
                            }
                        }
                        MediaBlock::Video { url, poster, title } => {
                            @if url.is_empty() {
                                div.block-video.is-placeholder {
                                    p { (title) }
                                }
                            } @else {
                                div.block-video {
                                    video controls preload="metadata" src=(url) poster=[(!poster.is_empty()).then_some(poster)] {}
                                    @if !title.is_empty() {
                                        p { (title) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_contact_form(form: &ContactForm, t: Tr<'_>) -> Markup {
    let sending = form.is_sending();
    html! {
        form.contact-form method="post" {
            label {
                (t("contact.name", Some("Name")))
                input type="text" name="name" required value=(form.name);
            }
            label {
                (t("contact.email", Some("Email")))
                input type="email" name="email" required value=(form.email);
            }
            label {
                (t("contact.message", Some("Message")))
                textarea name="message" required { (form.message) }
            }
            button type="submit" disabled[sending] {
                @if sending {
                    (t("contact.sending", Some("Sending…")))
                } @else {
                    (t("contact.submit", Some("Send message")))
                }
            }
            @match form.status() {
                ContactStatus::Success(message) => {
                    p.contact-status.is-success role="status" { (message) }
                }
                ContactStatus::Error(message) => {
                    p.contact-status.is-error role="alert" { (message) }
                }
                ContactStatus::Idle | ContactStatus::Sending => {}
            }
        }
    }
}

fn site_footer<A, P, S>(shell: &Shell<A, P, S>, brand: &str, t: Tr<'_>) -> Markup
where
    A: ContentApi,
    P: PreferenceStore,
    S: PageScroll,
{
    let site = shell.i18n().content().map(|content| content.site.clone()).unwrap_or_default();
    let or = |value: &str, key: &str, fallback: &str| {
        if value.is_empty() {
            t(key, Some(fallback))
        } else {
            value.to_string()
        }
    };
    let footer_title = if site.footer_title.is_empty() {
        brand.to_string()
    } else {
        site.footer_title.clone()
    };
    let explore_menu = shell.menu(MenuPlacement::Footer);
    let social_menu = shell.menu(MenuPlacement::Social);
    html! {
        footer.site-footer {
            div.footer-about {
                h2 { (footer_title) }
                @if !site.footer_description.is_empty() {
                    p { (site.footer_description) }
                }
                @if !site.contact_email.is_empty() {
                    a href={ "mailto:" (site.contact_email) } { (site.contact_email) }
                }
            }
            @if !explore_menu.is_empty() {
                nav.footer-explore {
                    h3 { (or(&site.footer_explore_title, "footer.explore", "Explore")) }
                    (render_menu(explore_menu, t))
                }
            }
            @if !social_menu.is_empty() {
                nav.footer-social {
                    h3 { (or(&site.footer_social_title, "footer.social", "Follow")) }
                    (render_menu(social_menu, t))
                }
            }
            div.footer-newsletter {
                h3 { (or(&site.footer_newsletter_title, "footer.newsletter", "Newsletter")) }
                p { (or(&site.newsletter_note, "footer.newsletter_note", "Occasional field notes from the road.")) }
            }
        }
    }
}

fn render_lightbox(lightbox: &Lightbox, t: Tr<'_>) -> Markup {
    let Some(image) = lightbox.current() else {
        return html! {};
    };
    let position = lightbox.index().map_or(0, |index| index + 1);
    html! {
        div.lightbox role="dialog" aria-modal="true" {
            button.lightbox-close type="button" aria-label=(t("lightbox.close", Some("Close"))) { "×" }
            button.lightbox-prev type="button" aria-label=(t("lightbox.previous", Some("Previous"))) { "‹" }
            figure {
                img src=(image.url) alt=(image.alt);
                @if !image.caption.is_empty() {
                    figcaption { (image.caption) }
                }
            }
            button.lightbox-next type="button" aria-label=(t("lightbox.next", Some("Next"))) { "›" }
            p.lightbox-counter { (position) " / " (lightbox.images().len()) }
        }
    }
}
