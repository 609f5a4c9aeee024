//! Fakes shared by the unit tests

use crate::image_loader::{ImageLoader, LoadRequest, LoadToken};
use crate::item::{Bitmap, ImageUrl, PhotoItem, SharedItem, SourceView};
use crate::observer::{ModalStyle, PageContext, PagerObserver, PresentationHost};
use egui::Rect;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub fn bitmap(width: u32, height: u32) -> Bitmap {
    Bitmap::blank(width, height)
}

/// `count` uncached items with a 40x20 thumbnail and a caption each
pub fn items(count: usize) -> Vec<SharedItem> {
    (0..count)
        .map(|i| {
            PhotoItem::new(Some(ImageUrl::new(format!("photo_{}.png", i))))
                .with_thumbnail(bitmap(40, 20))
                .with_caption(format!("Photo {}", i))
                .into_shared()
        })
        .collect()
}

/// Records requests instead of loading anything
#[derive(Default)]
pub struct FakeLoader {
    requests: Mutex<Vec<LoadRequest>>,
    cancelled: Mutex<HashSet<LoadToken>>,
    cache: Mutex<HashMap<ImageUrl, Bitmap>>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_cached(&self, url: &str, image: Bitmap) {
        self.cache.lock().insert(ImageUrl::new(url), image);
    }

    pub fn requests(&self) -> Vec<LoadRequest> {
        self.requests.lock().clone()
    }

    pub fn was_cancelled(&self, token: LoadToken) -> bool {
        self.cancelled.lock().contains(&token)
    }
}

impl ImageLoader for FakeLoader {
    fn load(&self, request: LoadRequest) {
        self.requests.lock().push(request);
    }

    fn peek_cached(&self, url: &ImageUrl) -> Option<Bitmap> {
        self.cache.lock().get(url).cloned()
    }

    fn cancel(&self, token: LoadToken) {
        self.cancelled.lock().insert(token);
    }
}

/// Thumbnail view with a settable frame that remembers its opacity
pub struct FakeSource {
    frame: Mutex<Option<Rect>>,
    opacity: Mutex<f32>,
}

impl FakeSource {
    pub fn new(frame: Option<Rect>) -> Arc<Self> {
        Arc::new(Self {
            frame: Mutex::new(frame),
            opacity: Mutex::new(1.0),
        })
    }

    pub fn opacity(&self) -> f32 {
        *self.opacity.lock()
    }

    pub fn set_frame(&self, frame: Option<Rect>) {
        *self.frame.lock() = frame;
    }
}

impl SourceView for FakeSource {
    fn frame_on_screen(&self) -> Option<Rect> {
        *self.frame.lock()
    }

    fn set_opacity(&self, opacity: f32) {
        *self.opacity.lock() = opacity;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PageChanged { group: usize, page: usize },
    Settled { page: usize },
    GroupChanged { group: usize, count: usize },
    LongPress { has_image: bool },
    Dismissed,
    Presented { animated: bool },
    HostDismissed { animated: bool },
    StatusBarHidden(bool),
}

/// Event list shared between the recording observer and host
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

pub struct RecordingObserver {
    log: EventLog,
}

impl RecordingObserver {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl PagerObserver for RecordingObserver {
    fn on_page_changed(&mut self, context: &PageContext, _item: &SharedItem) {
        self.log.push(Event::PageChanged {
            group: context.group,
            page: context.page,
        });
    }

    fn on_settle(&mut self, context: &PageContext) {
        self.log.push(Event::Settled { page: context.page });
    }

    fn on_group_changed(&mut self, group: usize, group_count: usize) {
        self.log.push(Event::GroupChanged {
            group,
            count: group_count,
        });
    }

    fn on_long_press(&mut self, _item: &SharedItem, image: Option<&Bitmap>) {
        self.log.push(Event::LongPress {
            has_image: image.is_some(),
        });
    }

    fn on_dismissed(&mut self) {
        self.log.push(Event::Dismissed);
    }
}

pub struct RecordingHost {
    log: EventLog,
}

impl RecordingHost {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl PresentationHost for RecordingHost {
    fn present(&mut self, _style: ModalStyle, animated: bool) {
        self.log.push(Event::Presented { animated });
    }

    fn dismiss(&mut self, animated: bool) {
        self.log.push(Event::HostDismissed { animated });
    }

    fn set_status_bar_hidden(&mut self, hidden: bool) {
        self.log.push(Event::StatusBarHidden(hidden));
    }
}
