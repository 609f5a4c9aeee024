//! Image loading seam and the default channel-backed loader

use crate::item::{Bitmap, ImageUrl};
use crate::tile::TileId;
use crate::BrowserError;
use dashmap::DashMap;
use image::ImageReader;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Identifies one issued load; a tile only accepts the completion whose
/// token it is still waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Load request
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub tile: TileId,
    pub url: ImageUrl,
    pub placeholder: Option<Bitmap>,
}

/// Result of a load, handed back to the browser on the UI thread
#[derive(Debug)]
pub struct LoadCompletion {
    pub token: LoadToken,
    pub tile: TileId,
    pub url: ImageUrl,
    pub result: Result<Bitmap, BrowserError>,
}

impl LoadRequest {
    pub fn complete(&self, result: Result<Bitmap, BrowserError>) -> LoadCompletion {
        LoadCompletion {
            token: self.token,
            tile: self.tile,
            url: self.url.clone(),
            result,
        }
    }
}

/// Fetches and decodes images off the UI thread.
///
/// `load` must not call back synchronously: results come back as
/// [`LoadCompletion`]s which the host passes to
/// [`Browser::deliver_image`](crate::Browser::deliver_image).
pub trait ImageLoader {
    fn load(&self, request: LoadRequest);

    /// Memory-only cache lookup
    fn peek_cached(&self, url: &ImageUrl) -> Option<Bitmap>;

    /// The consumer of `token` went away; drop the work if it has not started
    fn cancel(&self, token: LoadToken);
}

/// Bounded in-memory cache keyed by URL hash, evicting oldest first
struct MemoryCache {
    entries: DashMap<u64, Bitmap>,
    order: Mutex<VecDeque<u64>>,
    capacity: usize,
}

impl MemoryCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    fn get(&self, key: u64) -> Option<Bitmap> {
        self.entries.get(&key).map(|entry| entry.value().clone())
    }

    fn insert(&self, key: u64, image: Bitmap) {
        let mut order = self.order.lock();
        if self.entries.insert(key, image).is_none() {
            order.push_back(key);
        }
        while order.len() > self.capacity {
            if let Some(oldest) = order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Requests sitting in the worker queue, flagged when cancelled. An entry
/// lives only from `queue` until the worker takes it, so cancelling work
/// that already ran leaves nothing behind.
#[derive(Default)]
struct InFlight {
    requests: DashMap<LoadToken, bool>,
}

impl InFlight {
    fn queue(&self, token: LoadToken) {
        self.requests.insert(token, false);
    }

    fn cancel(&self, token: LoadToken) {
        if let Some(mut cancelled) = self.requests.get_mut(&token) {
            *cancelled = true;
        }
    }

    /// Remove `token`; true when it should still be loaded
    fn take(&self, token: LoadToken) -> bool {
        !matches!(self.requests.remove(&token), Some((_, true)))
    }

    fn len(&self) -> usize {
        self.requests.len()
    }
}

/// Default loader: decodes local files on a worker thread and reports back
/// through an unbounded channel the UI thread drains every frame
pub struct ChannelImageLoader {
    request_tx: mpsc::UnboundedSender<LoadRequest>,
    cache: Arc<MemoryCache>,
    in_flight: Arc<InFlight>,
}

impl ChannelImageLoader {
    /// Create the loader and the receiving end for completions
    pub fn new(cache_entries: usize) -> (Self, mpsc::UnboundedReceiver<LoadCompletion>) {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<LoadRequest>();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel::<LoadCompletion>();
        let cache = Arc::new(MemoryCache::new(cache_entries));
        let in_flight = Arc::new(InFlight::default());

        let worker_cache = cache.clone();
        let worker_in_flight = in_flight.clone();

        // Spawn worker thread
        std::thread::spawn(move || {
            while let Some(request) = request_rx.blocking_recv() {
                if !worker_in_flight.take(request.token) {
                    tracing::debug!("Skipping cancelled load: {}", request.url);
                    continue;
                }

                let result = Self::load_image_sync(&request.url);
                if let Ok(image) = &result {
                    worker_cache.insert(request.url.cache_key(), image.clone());
                }

                if completion_tx.send(request.complete(result)).is_err() {
                    tracing::debug!("Completion receiver dropped, stopping image worker");
                    break;
                }
            }
        });

        (
            Self {
                request_tx,
                cache,
                in_flight,
            },
            completion_rx,
        )
    }

    /// Requests queued but not yet picked up by the worker
    pub fn queued_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Load image synchronously (called from worker thread)
    fn load_image_sync(url: &ImageUrl) -> Result<Bitmap, BrowserError> {
        tracing::debug!("Loading image: {}", url);

        let path = url
            .to_path()
            .ok_or_else(|| BrowserError::UnsupportedUrl(url.to_string()))?;

        let data = std::fs::read(&path)?;
        let img = ImageReader::new(Cursor::new(&data))
            .with_guessed_format()?
            .decode()?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Bitmap::new(width, height, rgba.into_raw()))
    }

    /// Queue a request, failing once the worker has stopped
    pub fn try_load(&self, request: LoadRequest) -> Result<(), BrowserError> {
        let token = request.token;
        self.in_flight.queue(token);
        self.request_tx.send(request).map_err(|_| {
            self.in_flight.take(token);
            BrowserError::LoaderClosed
        })
    }
}

impl ImageLoader for ChannelImageLoader {
    fn load(&self, request: LoadRequest) {
        let token = request.token;
        let url = request.url.clone();
        if let Err(e) = self.try_load(request) {
            tracing::error!("{}, dropping load {:?} for {}", e, token, url);
        }
    }

    fn peek_cached(&self, url: &ImageUrl) -> Option<Bitmap> {
        self.cache.get(url.cache_key())
    }

    fn cancel(&self, token: LoadToken) {
        self.in_flight.cancel(token);
    }
}

/// Check if a file is a supported image format
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"
            )
        })
        .unwrap_or(false)
}
