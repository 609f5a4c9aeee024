//! Scripted headless session
//!
//! Plays the part of the UI thread: forwards input to the browser, drains
//! decoded images from the loader every frame and records what the browser
//! reports back.

use anyhow::Result;
use browser_core::{
    Bitmap, Browser, BrowserConfig, ChannelImageLoader, ImageUrl, LoadCompletion, ModalStyle,
    PageContext, PagerObserver, PanEvent, Phase, PhotoItem, PresentationHost, SharedItem,
    SourceView,
};
use egui::{pos2, Pos2, Rect, Vec2};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

const SCREEN: Vec2 = Vec2::new(390.0, 844.0);
const FRAME: Duration = Duration::from_millis(16);
const GROUP_SIZE: usize = 5;
const GRID_COLUMNS: usize = 3;
const THUMB_SIZE: f32 = 120.0;

type Journal = Arc<Mutex<Vec<Value>>>;

/// Grid cell the photo was opened from
struct Thumbnail {
    frame: Mutex<Option<Rect>>,
    opacity: Mutex<f32>,
}

impl Thumbnail {
    fn at(index: usize) -> Arc<Self> {
        let column = (index % GRID_COLUMNS) as f32;
        let row = (index / GRID_COLUMNS) as f32;
        let min = pos2(5.0 + column * (THUMB_SIZE + 5.0), 100.0 + row * (THUMB_SIZE + 5.0));
        let frame = Rect::from_min_size(min, Vec2::splat(THUMB_SIZE));
        // Cells below the fold are not on screen
        let visible = frame.max.y <= SCREEN.y;
        Arc::new(Self {
            frame: Mutex::new(visible.then_some(frame)),
            opacity: Mutex::new(1.0),
        })
    }
}

impl SourceView for Thumbnail {
    fn frame_on_screen(&self) -> Option<Rect> {
        *self.frame.lock()
    }

    fn set_opacity(&self, opacity: f32) {
        *self.opacity.lock() = opacity;
    }
}

struct JournalHost {
    journal: Journal,
}

impl PresentationHost for JournalHost {
    fn present(&mut self, style: ModalStyle, animated: bool) {
        self.journal
            .lock()
            .push(json!({ "event": "present", "style": format!("{:?}", style), "animated": animated }));
    }

    fn dismiss(&mut self, animated: bool) {
        self.journal
            .lock()
            .push(json!({ "event": "dismiss", "animated": animated }));
    }

    fn set_status_bar_hidden(&mut self, hidden: bool) {
        self.journal
            .lock()
            .push(json!({ "event": "status_bar", "hidden": hidden }));
    }
}

struct JournalObserver {
    journal: Journal,
}

impl PagerObserver for JournalObserver {
    fn on_page_changed(&mut self, context: &PageContext, item: &SharedItem) {
        tracing::info!("Page {} / {}", context.page + 1, context.page_count);
        self.journal.lock().push(json!({
            "event": "page_changed",
            "group": context.group,
            "page": context.page,
            "caption": item.caption(),
        }));
    }

    fn on_settle(&mut self, context: &PageContext) {
        self.journal
            .lock()
            .push(json!({ "event": "settle", "page": context.page }));
    }

    fn on_group_changed(&mut self, group: usize, group_count: usize) {
        self.journal
            .lock()
            .push(json!({ "event": "group_changed", "group": group, "groups": group_count }));
    }

    fn on_long_press(&mut self, item: &SharedItem, image: Option<&Bitmap>) {
        self.journal.lock().push(json!({
            "event": "long_press",
            "url": item.image_url().map(|u| u.to_string()),
            "image": image.map(|b| format!("{}x{}", b.width, b.height)),
        }));
    }

    fn on_dismissed(&mut self) {
        self.journal.lock().push(json!({ "event": "dismissed" }));
    }
}

struct Session {
    browser: Browser,
    loader: Arc<ChannelImageLoader>,
    completions: UnboundedReceiver<LoadCompletion>,
    journal: Journal,
    thumbnails: Vec<Arc<Thumbnail>>,
    item_count: usize,
}

impl Session {
    fn new(paths: Vec<PathBuf>, config: BrowserConfig) -> Self {
        let (loader, completions) = ChannelImageLoader::new(config.loader.memory_cache_entries);
        let loader = Arc::new(loader);
        let thumbnails: Vec<Arc<Thumbnail>> = (0..paths.len()).map(Thumbnail::at).collect();

        let items: Vec<SharedItem> = paths
            .iter()
            .zip(&thumbnails)
            .map(|(path, thumb)| {
                let caption = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                PhotoItem::new(Some(ImageUrl::new(format!("file://{}", path.display()))))
                    .with_caption(caption)
                    .with_source(thumb)
                    .into_shared()
            })
            .collect();

        let groups: Vec<Vec<SharedItem>> = items.chunks(GROUP_SIZE).map(<[_]>::to_vec).collect();
        let first = groups.first().cloned().unwrap_or_default();
        let mut browser = Browser::with_config(first, 0, loader.clone(), config);
        if groups.len() > 1 {
            browser.set_groups(groups, 0);
        }

        let journal = Journal::default();
        browser.set_observer(Box::new(JournalObserver {
            journal: journal.clone(),
        }));

        Self {
            browser,
            loader,
            completions,
            journal,
            thumbnails,
            item_count: items.len(),
        }
    }

    fn center() -> Pos2 {
        pos2(SCREEN.x * 0.5, SCREEN.y * 0.5)
    }

    /// One UI frame: apply finished loads, then advance time
    fn frame(&mut self) -> bool {
        while let Ok(completion) = self.completions.try_recv() {
            let url = completion.url.clone();
            let outcome = self.browser.deliver_image(completion);
            tracing::debug!("Delivered {}: {:?}", url, outcome);
        }
        let busy = self.browser.tick(Instant::now());
        std::thread::sleep(FRAME);
        busy
    }

    fn run_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            self.frame();
        }
    }

    /// Frames until no visible tile is waiting on an image
    fn wait_for_images(&mut self, limit: Duration) {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            self.frame();
            if !self.browser.recycler().visible().any(|t| t.is_loading()) {
                return;
            }
        }
        tracing::warn!("Images still loading after {:?}", limit);
    }

    /// Finger-drag the pager from its current offset to `target`
    fn swipe_to(&mut self, target: f32) {
        let start = self.browser.scroll_offset();
        self.browser.on_scroll_begin_drag(Instant::now());
        for step in 1..=8 {
            let t = step as f32 / 8.0;
            self.browser.on_scroll(start + (target - start) * t);
            self.frame();
        }
        self.browser.on_scroll_end_decelerating(Instant::now());
    }

    fn drag(&mut self, dy: f32, velocity: f32) {
        let start = Self::center();
        let end = start + Vec2::new(0.0, dy);
        self.browser.on_pan(PanEvent::began(start), Instant::now());
        for step in 1..=6 {
            let location = start + Vec2::new(0.0, dy * step as f32 / 6.0);
            self.browser.on_pan(PanEvent::changed(start, location), Instant::now());
            self.frame();
        }
        self.browser
            .on_pan(PanEvent::ended(start, end, Vec2::new(0.0, velocity)), Instant::now());
    }

    fn script(&mut self) {
        let spring = self.browser.config().animation.spring();
        let slack = self.browser.config().paging.overscroll_slack;

        self.browser.show(
            Box::new(JournalHost {
                journal: self.journal.clone(),
            }),
            Rect::from_min_size(Pos2::ZERO, SCREEN),
            Instant::now(),
        );
        self.run_for(spring + FRAME * 2);
        self.wait_for_images(Duration::from_secs(5));

        // Page through the first group
        for page in 1..self.browser.page_count() {
            self.swipe_to(page as f32 * self.browser.page_width());
            self.wait_for_images(Duration::from_secs(5));
        }

        // Rubber-band past the last page into the next group
        if self.browser.group_count() > 1 {
            let edge = self.browser.content_width() - self.browser.page_width();
            self.swipe_to(edge + slack + 10.0);
            self.wait_for_images(Duration::from_secs(5));
        }

        // Zoom in and back out
        let now = Instant::now();
        self.browser.on_tap(Self::center(), now);
        self.browser.on_tap(Self::center(), now + Duration::from_millis(120));
        self.run_for(spring);
        self.browser.on_tap(Self::center(), Instant::now());
        self.run_for(spring + self.browser.config().gesture.double_tap_interval());

        self.browser.on_long_press();

        // A short drag springs back, a long one dismisses
        self.drag(60.0, 100.0);
        self.run_for(spring + FRAME * 2);
        self.drag(220.0, 800.0);
        self.run_for(spring + FRAME * 2);

        if self.browser.phase() != Phase::Closed {
            tracing::warn!("Browser still {:?}, closing", self.browser.phase());
            self.browser.close(Instant::now());
            self.run_for(spring + FRAME * 2);
        }
    }

    fn summary(&self) -> Value {
        let hidden_thumbnails = self
            .thumbnails
            .iter()
            .filter(|t| *t.opacity.lock() < 1.0)
            .count();
        json!({
            "items": self.item_count,
            "groups": self.browser.group_count(),
            "final_phase": format!("{:?}", self.browser.phase()),
            "tiles_allocated": self.browser.recycler().allocated(),
            "hidden_thumbnails": hidden_thumbnails,
            "queued_loads": self.loader.queued_count(),
            "events": self.journal.lock().clone(),
        })
    }
}

/// Run the scripted session and return its event summary
pub fn run(paths: Vec<PathBuf>, config: BrowserConfig) -> Result<Value> {
    let mut session = Session::new(paths, config);
    session.script();
    tracing::info!("Session finished");
    Ok(session.summary())
}
