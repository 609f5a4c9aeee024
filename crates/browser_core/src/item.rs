//! Photo items and the weak link back to their thumbnail views

use egui::{Rect, Vec2};
use parking_lot::RwLock;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use xxhash_rust::xxh3::xxh3_64;

/// Decoded RGBA8 bitmap
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }

    /// Transparent bitmap of the given size
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![0; width as usize * height as usize * 4])
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({}x{})", self.width, self.height)
    }
}

/// Opaque image location handed to the image loader
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local path for `file://` URLs and bare paths
    pub fn to_path(&self) -> Option<PathBuf> {
        if let Some(rest) = self.0.strip_prefix("file://") {
            return Some(PathBuf::from(rest));
        }
        if self.0.contains("://") {
            return None;
        }
        Some(PathBuf::from(&self.0))
    }

    /// Memory-cache key
    pub fn cache_key(&self) -> u64 {
        xxh3_64(self.0.as_bytes())
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageUrl {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Thumbnail view a photo was opened from.
///
/// Owned by the host; the browser only keeps a [`Weak`] link and must cope
/// with the view disappearing at any time.
pub trait SourceView: Send + Sync {
    /// Current frame in screen coordinates, `None` when off screen
    fn frame_on_screen(&self) -> Option<Rect>;

    fn set_opacity(&self, opacity: f32);
}

#[derive(Debug, Default)]
struct LoadState {
    full_image: Option<Bitmap>,
    finished: bool,
}

/// One browsable photo
pub struct PhotoItem {
    image_url: Option<ImageUrl>,
    thumbnail: Option<Bitmap>,
    caption: Option<String>,
    source_view: Option<Weak<dyn SourceView>>,
    state: RwLock<LoadState>,
}

/// Items are created and owned by the host and shared with the browser
pub type SharedItem = Arc<PhotoItem>;

impl PhotoItem {
    pub fn new(image_url: Option<ImageUrl>) -> Self {
        Self {
            image_url,
            thumbnail: None,
            caption: None,
            source_view: None,
            state: RwLock::new(LoadState::default()),
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: Bitmap) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_source<V: SourceView + 'static>(mut self, view: &Arc<V>) -> Self {
        let weak: Weak<V> = Arc::downgrade(view);
        let weak: Weak<dyn SourceView> = weak;
        self.source_view = Some(weak);
        self
    }

    pub fn into_shared(self) -> SharedItem {
        Arc::new(self)
    }

    pub fn image_url(&self) -> Option<&ImageUrl> {
        self.image_url.as_ref()
    }

    pub fn thumbnail(&self) -> Option<&Bitmap> {
        self.thumbnail.as_ref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Upgrade the link to the origin thumbnail, `None` once it is gone
    pub fn source_view(&self) -> Option<Arc<dyn SourceView>> {
        self.source_view.as_ref().and_then(Weak::upgrade)
    }

    pub fn full_image(&self) -> Option<Bitmap> {
        self.state.read().full_image.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.state.read().finished
    }

    /// Store the resolved full-resolution image and mark the item finished
    pub fn set_full_image(&self, image: Bitmap) {
        let mut state = self.state.write();
        state.full_image = Some(image);
        state.finished = true;
    }
}

impl fmt::Debug for PhotoItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoItem")
            .field("image_url", &self.image_url)
            .field("finished", &self.is_finished())
            .finish()
    }
}
