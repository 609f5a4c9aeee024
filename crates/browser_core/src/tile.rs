//! Recyclable single-photo tile with its own zoom/pan surface

use crate::geometry::limit_size;
use crate::image_loader::{ImageLoader, LoadCompletion, LoadRequest, LoadToken};
use crate::item::{Bitmap, SharedItem};
use egui::{Pos2, Rect, Vec2};
use std::sync::Arc;

/// Index of a tile inside the recycler's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub(crate) usize);

/// Spinner shown over a tile while its full image is loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressIndicator {
    pub hidden: bool,
    pub spinning: bool,
    /// Bound with determinate progress (no spinner once the image is there)
    pub determinate: bool,
}

impl ProgressIndicator {
    fn idle() -> Self {
        Self {
            hidden: true,
            spinning: false,
            determinate: false,
        }
    }

    fn loaded() -> Self {
        Self {
            hidden: true,
            spinning: false,
            determinate: true,
        }
    }

    fn loading(determinate: bool) -> Self {
        Self {
            hidden: false,
            spinning: true,
            determinate,
        }
    }
}

/// What happened to a delivered load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// The tile moved on to another item (or none) before the result arrived
    Stale,
}

#[derive(Debug)]
struct PendingLoad {
    token: LoadToken,
    item: SharedItem,
}

/// Zoom/pan state of the tile's scroll surface
#[derive(Debug, Clone, Copy)]
struct ZoomState {
    scale: f32,
    max_scale: f32,
    /// Image size at scale 1.0
    fitted: Vec2,
    content_size: Vec2,
    content_offset: Vec2,
}

/// One page of the browser
#[derive(Debug)]
pub struct PhotoTile {
    id: TileId,
    page: Option<usize>,
    /// Position inside the pager's scroll content
    frame: Rect,
    padding: f32,
    attached: bool,
    item: Option<SharedItem>,
    image: Option<Bitmap>,
    /// Image surface in tile-local coordinates
    image_frame: Rect,
    zoom: ZoomState,
    progress: ProgressIndicator,
    pending: Option<PendingLoad>,
}

impl PhotoTile {
    pub fn new(id: TileId, frame: Rect, padding: f32, max_zoom: f32) -> Self {
        let mut tile = Self {
            id,
            page: None,
            frame,
            padding,
            attached: false,
            item: None,
            image: None,
            image_frame: Rect::ZERO,
            zoom: ZoomState {
                scale: 1.0,
                max_scale: max_zoom.max(1.0),
                fitted: Vec2::ZERO,
                content_size: Vec2::ZERO,
                content_offset: Vec2::ZERO,
            },
            progress: ProgressIndicator::idle(),
            pending: None,
        };
        tile.fit_image_to_bounds();
        tile
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    /// Page this tile shows, `None` while pooled
    pub fn page(&self) -> Option<usize> {
        self.page
    }

    pub(crate) fn set_page(&mut self, page: Option<usize>) {
        self.page = page;
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
        self.fit_image_to_bounds();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn attach(&mut self) {
        self.attached = true;
    }

    pub(crate) fn detach(&mut self) {
        self.attached = false;
    }

    pub fn item(&self) -> Option<&SharedItem> {
        self.item.as_ref()
    }

    pub fn image(&self) -> Option<&Bitmap> {
        self.image.as_ref()
    }

    pub fn image_frame(&self) -> Rect {
        self.image_frame
    }

    pub fn set_image_frame(&mut self, frame: Rect) {
        self.image_frame = frame;
    }

    pub fn progress(&self) -> ProgressIndicator {
        self.progress
    }

    pub fn set_progress_hidden(&mut self, hidden: bool) {
        self.progress.hidden = hidden;
    }

    pub fn zoom_scale(&self) -> f32 {
        self.zoom.scale
    }

    pub fn content_offset(&self) -> Vec2 {
        self.zoom.content_offset
    }

    pub fn content_size(&self) -> Vec2 {
        self.zoom.content_size
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Tile bounds in local coordinates
    fn bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.frame.size())
    }

    /// Area the image may occupy: the page minus its side padding
    fn content_bounds(&self) -> Vec2 {
        Vec2::new(
            (self.frame.width() - 2.0 * self.padding).max(0.0),
            self.frame.height(),
        )
    }

    /// Bind `item`, or clear the tile when `item` is `None`.
    ///
    /// A cached full image is shown immediately; otherwise the thumbnail is
    /// shown under a spinner and a load is issued. Any load still in flight
    /// for the previous binding is cancelled.
    pub fn bind(&mut self, item: Option<SharedItem>, determinate: bool, loader: &dyn ImageLoader) {
        self.cancel_pending(loader);
        self.item = item.clone();

        let Some(item) = item else {
            self.image = None;
            self.progress = ProgressIndicator::idle();
            self.fit_image_to_bounds();
            return;
        };

        let cached = item
            .full_image()
            .or_else(|| item.image_url().and_then(|url| loader.peek_cached(url)));
        if let Some(image) = cached {
            item.set_full_image(image.clone());
            self.image = Some(image);
            self.progress = ProgressIndicator::loaded();
            self.fit_image_to_bounds();
            return;
        }

        self.image = item.thumbnail().cloned();
        self.fit_image_to_bounds();

        match item.image_url() {
            Some(url) => {
                let token = LoadToken::next();
                tracing::debug!("Tile {:?} loading {} ({:?})", self.id, url, token);
                self.progress = ProgressIndicator::loading(determinate);
                loader.load(LoadRequest {
                    token,
                    tile: self.id,
                    url: url.clone(),
                    placeholder: item.thumbnail().cloned(),
                });
                self.pending = Some(PendingLoad {
                    token,
                    item: item.clone(),
                });
            }
            None => {
                // Nothing to fetch, the thumbnail is all there is
                self.progress = ProgressIndicator::idle();
            }
        }
    }

    /// Show what is available for `item` right now without starting a load:
    /// the cached full image if there is one (bound immediately), the thumbnail otherwise
    pub fn show_preview(&mut self, item: &SharedItem, loader: &dyn ImageLoader) {
        let cached = item
            .full_image()
            .or_else(|| item.image_url().and_then(|url| loader.peek_cached(url)));
        if cached.is_some() {
            self.bind(Some(item.clone()), true, loader);
        } else {
            self.image = item.thumbnail().cloned();
            self.fit_image_to_bounds();
        }
    }

    fn cancel_pending(&mut self, loader: &dyn ImageLoader) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!("Tile {:?} cancelling {:?}", self.id, pending.token);
            loader.cancel(pending.token);
        }
    }

    /// Apply a finished load if it still belongs to the current binding
    pub fn complete_load(&mut self, completion: LoadCompletion) -> LoadOutcome {
        let pending = match self.pending.take() {
            Some(pending) if pending.token == completion.token => pending,
            other => {
                self.pending = other;
                tracing::debug!("Tile {:?} discarding stale load for {}", self.id, completion.url);
                return LoadOutcome::Stale;
            }
        };

        let still_bound = self
            .item
            .as_ref()
            .is_some_and(|item| Arc::ptr_eq(item, &pending.item));
        if !still_bound {
            tracing::debug!("Tile {:?} rebound before {} arrived", self.id, completion.url);
            return LoadOutcome::Stale;
        }

        match completion.result {
            Ok(image) => {
                pending.item.set_full_image(image.clone());
                self.image = Some(image);
                self.progress = ProgressIndicator::loaded();
                self.fit_image_to_bounds();
                LoadOutcome::Applied
            }
            Err(e) => {
                // Spinner stays up; retrying is the loader's business
                tracing::warn!("Failed to load {}: {}", completion.url, e);
                self.progress.spinning = false;
                self.progress.hidden = false;
                LoadOutcome::Failed
            }
        }
    }

    /// Size the image surface to fit the tile and centre it. Resets zoom.
    pub fn fit_image_to_bounds(&mut self) {
        let bounds = self.content_bounds();
        let natural = match &self.image {
            Some(image) => image.size(),
            None => Vec2::new(bounds.x, bounds.x * 2.0 / 3.0),
        };
        let fitted = limit_size(natural, bounds);

        self.zoom.scale = 1.0;
        self.zoom.fitted = fitted;
        self.zoom.content_size = fitted;
        self.zoom.content_offset = Vec2::ZERO;
        self.image_frame = Rect::from_center_size(self.bounds().center(), fitted);
    }

    /// Rest frame of the image at the current zoom
    pub fn fitted_frame(&self) -> Rect {
        let bounds = self.bounds().size();
        let content = self.zoom.content_size;
        let centering = Vec2::new(
            ((bounds.x - content.x) * 0.5).max(0.0),
            ((bounds.y - content.y) * 0.5).max(0.0),
        );
        Rect::from_min_size(
            Pos2::ZERO + centering - self.zoom.content_offset,
            content,
        )
    }

    /// Whether the inner pan is already at its top/bottom limit for a drag
    /// of `dy`, in which case the browser's dismiss pan may take over
    pub fn is_at_vertical_scroll_limit(&self, dy: f32) -> bool {
        let offset_y = self.zoom.content_offset.y;
        let max_offset_y = (self.zoom.content_size.y - self.frame.height()).floor();

        if dy > 0.0 && offset_y <= 0.0 {
            return true;
        }
        if dy < 0.0 && offset_y >= max_offset_y {
            return true;
        }
        dy == 0.0 && max_offset_y <= 0.0
    }

    pub fn is_zoomed(&self, epsilon: f32) -> bool {
        self.zoom.scale > 1.0 + epsilon
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0, self.bounds().center());
    }

    /// Zoom to the maximum scale, centring on `focus` (tile-local)
    pub fn zoom_toward(&mut self, focus: Pos2) {
        self.set_zoom(self.zoom.max_scale, focus);
    }

    /// Zoom so the image point under `focus` ends up centred where possible
    pub fn set_zoom(&mut self, scale: f32, focus: Pos2) {
        let scale = scale.clamp(1.0, self.zoom.max_scale);
        let base = Rect::from_center_size(self.bounds().center(), self.zoom.fitted);
        let rel = (focus - base.min).clamp(Vec2::ZERO, self.zoom.fitted);

        self.zoom.scale = scale;
        self.zoom.content_size = self.zoom.fitted * scale;
        let target = rel * scale - self.bounds().size() * 0.5;
        self.zoom.content_offset = self.clamp_offset(target);
        self.image_frame = self.fitted_frame();
    }

    /// Scroll the zoomed content by a finger movement of `delta`
    pub fn pan_content(&mut self, delta: Vec2) {
        self.zoom.content_offset = self.clamp_offset(self.zoom.content_offset - delta);
        self.image_frame = self.fitted_frame();
    }

    fn clamp_offset(&self, offset: Vec2) -> Vec2 {
        let max = (self.zoom.content_size - self.bounds().size()).max(Vec2::ZERO);
        offset.clamp(Vec2::ZERO, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ImageUrl, PhotoItem};
    use crate::testing::{bitmap, FakeLoader};
    use egui::{pos2, vec2};

    fn tile() -> PhotoTile {
        PhotoTile::new(
            TileId(0),
            Rect::from_min_size(Pos2::ZERO, vec2(420.0, 800.0)),
            10.0,
            3.0,
        )
    }

    fn item(url: &str) -> SharedItem {
        PhotoItem::new(Some(ImageUrl::new(url)))
            .with_thumbnail(bitmap(40, 20))
            .into_shared()
    }

    #[test]
    fn test_bind_uncached_shows_thumbnail_and_loads() {
        let loader = FakeLoader::new();
        let mut tile = tile();
        tile.bind(Some(item("a.png")), false, &loader);

        assert_eq!(loader.requests().len(), 1);
        assert!(!tile.progress().hidden);
        assert!(tile.progress().spinning);
        assert_eq!(tile.image().map(|b| b.width), Some(40));
        // 40x20 thumbnail fits without upscaling, centred
        assert_eq!(tile.image_frame().size(), vec2(40.0, 20.0));
        assert_eq!(tile.image_frame().center(), pos2(210.0, 400.0));
    }

    #[test]
    fn test_bind_cached_is_immediate() {
        let loader = FakeLoader::new();
        loader.put_cached("a.png", bitmap(800, 400));
        let item = item("a.png");
        let mut tile = tile();
        tile.bind(Some(item.clone()), true, &loader);

        assert!(loader.requests().is_empty());
        assert!(tile.progress().hidden);
        assert!(tile.progress().determinate);
        assert!(item.is_finished());
        assert_eq!(tile.image_frame().size(), vec2(400.0, 200.0));
    }

    #[test]
    fn test_load_success_updates_item_and_fit() {
        let loader = FakeLoader::new();
        let item = item("a.png");
        let mut tile = tile();
        tile.bind(Some(item.clone()), true, &loader);

        let request = loader.requests().remove(0);
        let outcome = tile.complete_load(request.complete(Ok(bitmap(200, 1600))));

        assert_eq!(outcome, LoadOutcome::Applied);
        assert!(item.is_finished());
        assert!(tile.progress().hidden);
        assert_eq!(tile.image_frame().size(), vec2(100.0, 800.0));
        assert_eq!(tile.content_size(), vec2(100.0, 800.0));
    }

    #[test]
    fn test_load_failure_keeps_spinner_visible() {
        let loader = FakeLoader::new();
        let item = item("a.png");
        let mut tile = tile();
        tile.bind(Some(item.clone()), true, &loader);

        let request = loader.requests().remove(0);
        let outcome = tile.complete_load(request.complete(Err(crate::BrowserError::LoadFailed {
            url: "a.png".into(),
            reason: "timeout".into(),
        })));

        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(!tile.progress().hidden);
        assert!(!item.is_finished());
    }

    #[test]
    fn test_stale_callback_is_ignored() {
        let loader = FakeLoader::new();
        let a = item("a.png");
        let b = item("b.png");
        let mut tile = tile();

        tile.bind(Some(a.clone()), true, &loader);
        tile.bind(Some(b.clone()), true, &loader);
        let requests = loader.requests();
        let (req_a, req_b) = (&requests[0], &requests[1]);
        assert!(loader.was_cancelled(req_a.token));

        assert_eq!(
            tile.complete_load(req_b.complete(Ok(bitmap(300, 300)))),
            LoadOutcome::Applied
        );
        assert_eq!(
            tile.complete_load(req_a.complete(Ok(bitmap(10, 10)))),
            LoadOutcome::Stale
        );

        assert_eq!(tile.image().map(|b| b.width), Some(300));
        assert!(Arc::ptr_eq(tile.item().unwrap(), &b));
        assert!(!a.is_finished());
    }

    #[test]
    fn test_stale_callback_after_unbind() {
        let loader = FakeLoader::new();
        let mut tile = tile();
        tile.bind(Some(item("a.png")), true, &loader);
        let request = loader.requests().remove(0);

        tile.bind(None, false, &loader);
        assert_eq!(
            tile.complete_load(request.complete(Ok(bitmap(10, 10)))),
            LoadOutcome::Stale
        );
        assert!(tile.image().is_none());
        assert!(tile.progress().hidden);
    }

    #[test]
    fn test_placeholder_geometry_without_image() {
        let tile = tile();
        let size = tile.image_frame().size();
        assert!((size.x - 400.0).abs() < 1e-3);
        assert!((size.y - 400.0 * 2.0 / 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_toward_and_reset() {
        let loader = FakeLoader::new();
        loader.put_cached("a.png", bitmap(400, 800));
        let mut tile = tile();
        tile.bind(Some(item("a.png")), true, &loader);
        assert!(!tile.is_zoomed(0.1));

        tile.zoom_toward(pos2(210.0, 400.0));
        assert_eq!(tile.zoom_scale(), 3.0);
        assert!(tile.is_zoomed(0.1));
        assert_eq!(tile.content_size(), vec2(1200.0, 2400.0));
        // Centre of the image stays centred
        assert_eq!(tile.content_offset(), vec2(600.0 - 210.0, 1200.0 - 400.0));

        tile.reset_zoom();
        assert_eq!(tile.zoom_scale(), 1.0);
        assert_eq!(tile.content_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_vertical_scroll_limit() {
        let loader = FakeLoader::new();
        loader.put_cached("a.png", bitmap(400, 800));
        let mut tile = tile();
        tile.bind(Some(item("a.png")), true, &loader);

        // Unzoomed content fits: any vertical drag hits a limit
        assert!(tile.is_at_vertical_scroll_limit(20.0));
        assert!(tile.is_at_vertical_scroll_limit(-20.0));
        assert!(tile.is_at_vertical_scroll_limit(0.0));

        tile.zoom_toward(pos2(210.0, 400.0));
        assert!(!tile.is_at_vertical_scroll_limit(20.0));
        assert!(!tile.is_at_vertical_scroll_limit(-20.0));

        tile.pan_content(vec2(0.0, 5000.0));
        assert_eq!(tile.content_offset().y, 0.0);
        assert!(tile.is_at_vertical_scroll_limit(20.0));
        assert!(!tile.is_at_vertical_scroll_limit(-20.0));
    }
}
