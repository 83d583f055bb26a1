//! Modal image viewer over a detail view's image blocks.
//!
//! Navigation wraps in both directions. Opening locks page scroll through a
//! [`PageScroll`] implementation and remembers the previous overflow value so
//! closing can put it back exactly.
//!
//! ## Input
//!
//! | Input | Effect (only while open) |
//! |-------|--------------------------|
//! | `Escape` | close |
//! | `ArrowRight` | next |
//! | `ArrowLeft` | previous |
//! | swipe left | next |
//! | swipe right | previous |
//!
//! A touch counts as a swipe when its horizontal travel exceeds the
//! configured threshold and is larger than its vertical travel.

use crate::resolve::ImageBlock;

/// The host page's scroll lock.
pub trait PageScroll {
    /// Current `overflow` style of the page body.
    fn overflow(&self) -> String;
    fn set_overflow(&mut self, value: &str);
}

/// Scroll lock without a page behind it, for prerendering and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryScroll {
    pub overflow: String,
}

impl MemoryScroll {
    pub fn new(overflow: &str) -> Self {
        Self {
            overflow: overflow.to_string(),
        }
    }
}

impl PageScroll for MemoryScroll {
    fn overflow(&self) -> String {
        self.overflow.clone()
    }

    fn set_overflow(&mut self, value: &str) {
        self.overflow = value.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl LightboxKey {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => LightboxKey::Escape,
            "ArrowLeft" | "Left" => LightboxKey::ArrowLeft,
            "ArrowRight" | "Right" => LightboxKey::ArrowRight,
            _ => LightboxKey::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lightbox {
    images: Vec<ImageBlock>,
    index: Option<usize>,
    saved_overflow: Option<String>,
    touch_origin: Option<(f64, f64)>,
    swipe_threshold: f64,
}

impl Lightbox {
    pub fn new(swipe_threshold: f64) -> Self {
        Self {
            images: Vec::new(),
            index: None,
            saved_overflow: None,
            touch_origin: None,
            swipe_threshold,
        }
    }

    /// Replace the image list. An open viewer is closed first.
    pub fn set_images(&mut self, images: Vec<ImageBlock>, scroll: &mut impl PageScroll) {
        self.close(scroll);
        self.images = images;
    }

    pub fn images(&self) -> &[ImageBlock] {
        &self.images
    }

    pub fn is_open(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&ImageBlock> {
        self.index.and_then(|index| self.images.get(index))
    }

    /// Open at `index` (taken modulo the image count). No-op without images.
    pub fn open(&mut self, index: usize, scroll: &mut impl PageScroll) {
        if self.images.is_empty() {
            return;
        }
        if self.saved_overflow.is_none() {
            self.saved_overflow = Some(scroll.overflow());
            scroll.set_overflow("hidden");
        }
        self.index = Some(index % self.images.len());
    }

    pub fn close(&mut self, scroll: &mut impl PageScroll) {
        self.index = None;
        self.touch_origin = None;
        if let Some(previous) = self.saved_overflow.take() {
            scroll.set_overflow(&previous);
        }
    }

    pub fn next(&mut self) {
        let len = self.images.len();
        if len == 0 {
            return;
        }
        if let Some(index) = self.index {
            self.index = Some((index + 1) % len);
        }
    }

    pub fn previous(&mut self) {
        let len = self.images.len();
        if len == 0 {
            return;
        }
        if let Some(index) = self.index {
            self.index = Some((index + len - 1) % len);
        }
    }

    /// Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: LightboxKey, scroll: &mut impl PageScroll) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            LightboxKey::Escape => self.close(scroll),
            LightboxKey::ArrowRight => self.next(),
            LightboxKey::ArrowLeft => self.previous(),
            LightboxKey::Other => return false,
        }
        true
    }

    pub fn touch_start(&mut self, x: f64, y: f64) {
        if self.is_open() {
            self.touch_origin = Some((x, y));
        }
    }

    /// Finish a touch; returns whether it was a swipe.
    pub fn touch_end(&mut self, x: f64, y: f64) -> bool {
        let Some((start_x, start_y)) = self.touch_origin.take() else {
            return false;
        };
        if !self.is_open() {
            return false;
        }
        let dx = x - start_x;
        let dy = y - start_y;
        if dx.abs() <= self.swipe_threshold || dx.abs() <= dy.abs() {
            return false;
        }
        if dx < 0.0 {
            self.next();
        } else {
            self.previous();
        }
        true
    }
}
