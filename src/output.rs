//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every command reports what it resolved, not just where it wrote. Entities
//! (sections, records, media blocks) lead with a 1-based positional index and
//! their display name; secondary facts are indented context lines.
//!
//! # Output Format
//!
//! ## Route
//!
//! ```text
//! Route: detail expeditions/glacier-crossing
//!     Path: /expeditions/glacier-crossing/
//!     Page: home
//! ```
//!
//! ## Render
//!
//! ```text
//! Detail: Glacier Crossing → glacier.html
//!     001 image glacier.jpg
//!     002 story Field notes
//!     003 video (placeholder)
//!
//! Warnings
//!     Request failed (500)
//! ```
//!
//! ## Contact
//!
//! ```text
//! Sent: Thank you! Your message has been sent.
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::contact::ContactStatus;
use crate::resolve::{MediaBlock, ResolvedRecord};
use crate::route::Route;
use crate::section::Section;
use crate::shell::View;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn route_label(route: &Route) -> String {
    match route {
        Route::Page(slug) => format!("page {slug}"),
        Route::CollectionIndex(kind) => format!("index {}", kind.prefix()),
        Route::Detail(kind, slug) => format!("detail {}/{slug}", kind.prefix()),
    }
}

fn section_line(index: usize, section: &Section) -> String {
    let kind = serde_json::to_value(section.kind())
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    format!(
        "{}{} {} ({}) #{}",
        indent(1),
        format_index(index),
        section.key,
        kind,
        section.anchor
    )
}

fn record_line(index: usize, record: &ResolvedRecord) -> String {
    format!(
        "{}{} {} → {}",
        indent(1),
        format_index(index),
        record.title,
        record.slug
    )
}

fn block_line(index: usize, block: &MediaBlock) -> String {
    let detail = match block {
        MediaBlock::Image(image) => format!("image {}", image.url),
        MediaBlock::Story { title, body } if title.is_empty() => {
            format!("story {}", truncate(body, 40))
        }
        MediaBlock::Story { title, .. } => format!("story {title}"),
        MediaBlock::Video { url, .. } if url.is_empty() => "video (placeholder)".to_string(),
        MediaBlock::Video { url, .. } => format!("video {url}"),
    };
    format!("{}{} {}", indent(1), format_index(index), detail)
}

// ============================================================================
// route
// ============================================================================

pub fn format_route_output(route: &Route, path: &str) -> Vec<String> {
    vec![
        format!("Route: {}", route_label(route)),
        format!("{}Path: {}", indent(1), path),
        format!("{}Page: {}", indent(1), route.page_slug()),
    ]
}

pub fn print_route_output(route: &Route, path: &str) {
    for line in format_route_output(route, path) {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// Summarize a rendered view. `destination` is the output file, if any.
pub fn format_render_output(view: &View, destination: Option<&str>, warnings: &[&str]) -> Vec<String> {
    let arrow = destination
        .map(|dest| format!(" → {dest}"))
        .unwrap_or_default();
    let mut lines = Vec::new();

    match view {
        View::Loading => lines.push(format!("Loading{arrow}")),
        View::Unavailable { message } => {
            lines.push(format!("Unavailable{arrow}"));
            lines.push(format!("{}{}", indent(1), message));
        }
        View::Page(page) => {
            let title = if page.title.is_empty() { &page.slug } else { &page.title };
            lines.push(format!("Page: {title}{arrow}"));
            for (i, section) in page.sections.iter().enumerate() {
                lines.push(section_line(i + 1, section));
            }
        }
        View::CollectionIndex { kind, records } => {
            lines.push(format!("Index: {} ({} records){arrow}", kind.prefix(), records.len()));
            for (i, record) in records.iter().enumerate() {
                lines.push(record_line(i + 1, record));
            }
        }
        View::Detail { record, .. } => {
            lines.push(format!("Detail: {}{arrow}", record.title));
            for (i, block) in record.blocks.iter().enumerate() {
                lines.push(block_line(i + 1, block));
            }
        }
    }

    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for warning in warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    lines
}

pub fn print_render_output(view: &View, destination: Option<&str>, warnings: &[&str]) {
    for line in format_render_output(view, destination, warnings) {
        println!("{}", line);
    }
}

// ============================================================================
// contact
// ============================================================================

pub fn format_contact_output(status: &ContactStatus) -> Vec<String> {
    let line = match status {
        ContactStatus::Success(message) => format!("Sent: {message}"),
        ContactStatus::Error(message) => format!("Failed: {message}"),
        ContactStatus::Sending => "Sending".to_string(),
        ContactStatus::Idle => "Not sent".to_string(),
    };
    vec![line]
}

pub fn print_contact_output(status: &ContactStatus) {
    for line in format_contact_output(status) {
        println!("{}", line);
    }
}
