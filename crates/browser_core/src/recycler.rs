//! Visible set / free pool bookkeeping for page tiles

use crate::image_loader::ImageLoader;
use crate::tile::{PhotoTile, TileId};
use egui::{pos2, Rect, Vec2};

/// Horizontal window of the pager's scroll content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset: f32,
    pub width: f32,
}

/// Owns every tile ever created. Tiles move between the visible set and a
/// LIFO free pool; the arena never shrinks during a session.
pub struct TileRecycler {
    tiles: Vec<PhotoTile>,
    visible: Vec<TileId>,
    free: Vec<TileId>,
    page_size: Vec2,
    padding: f32,
    max_zoom: f32,
}

impl TileRecycler {
    pub fn new(page_size: Vec2, padding: f32, max_zoom: f32) -> Self {
        Self {
            tiles: Vec::new(),
            visible: Vec::new(),
            free: Vec::new(),
            page_size,
            padding,
            max_zoom,
        }
    }

    pub fn page_width(&self) -> f32 {
        self.page_size.x
    }

    /// Frame of `page` inside the scroll content
    pub fn page_frame(&self, page: usize) -> Rect {
        Rect::from_min_size(pos2(page as f32 * self.page_size.x, 0.0), self.page_size)
    }

    /// Resize pages and re-place every visible tile
    pub fn set_page_size(&mut self, page_size: Vec2) {
        self.page_size = page_size;
        for id in self.visible.clone() {
            if let Some(page) = self.tiles[id.0].page() {
                let frame = self.page_frame(page);
                self.tiles[id.0].set_frame(frame);
            }
        }
    }

    pub fn tile(&self, id: TileId) -> Option<&PhotoTile> {
        self.tiles.get(id.0)
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut PhotoTile> {
        self.tiles.get_mut(id.0)
    }

    pub fn visible(&self) -> impl Iterator<Item = &PhotoTile> {
        self.visible.iter().map(|id| &self.tiles[id.0])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Tiles created so far
    pub fn allocated(&self) -> usize {
        self.tiles.len()
    }

    pub fn free_tiles(&self) -> impl Iterator<Item = &PhotoTile> {
        self.free.iter().map(|id| &self.tiles[id.0])
    }

    /// Evict visible tiles that lie entirely outside
    /// `[offset - width, offset + 2 * width]`. Returns the number evicted.
    pub fn reclaim(&mut self, viewport: Viewport, loader: &dyn ImageLoader) -> usize {
        let low = viewport.offset - viewport.width;
        let high = viewport.offset + 2.0 * viewport.width;

        let outside: Vec<TileId> = self
            .visible
            .iter()
            .copied()
            .filter(|id| {
                let frame = self.tiles[id.0].frame();
                frame.max.x <= low || frame.min.x >= high
            })
            .collect();

        for id in &outside {
            self.release(*id, loader);
        }
        outside.len()
    }

    /// Visible tile tagged with `page`
    pub fn tile_for_page(&self, page: usize) -> Option<TileId> {
        self.visible
            .iter()
            .copied()
            .find(|id| self.tiles[id.0].page() == Some(page))
    }

    /// Most recently freed tile, or a new one when the pool is empty
    pub fn acquire_tile(&mut self) -> TileId {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = TileId(self.tiles.len());
                let frame = Rect::from_min_size(pos2(0.0, 0.0), self.page_size);
                self.tiles
                    .push(PhotoTile::new(id, frame, self.padding, self.max_zoom));
                tracing::debug!("Allocated tile {:?} ({} total)", id, self.tiles.len());
                id
            }
        };
        self.tiles[id.0].set_page(None);
        id
    }

    /// Materialise tiles for `around - 1 ..= around + 1` within
    /// `[0, item_count)`. Returns the tiles that were newly attached.
    pub fn ensure_window(&mut self, around: isize, item_count: usize) -> Vec<TileId> {
        let mut attached = Vec::new();
        for page in (around - 1)..=(around + 1) {
            if page < 0 || page as usize >= item_count {
                continue;
            }
            let page = page as usize;
            if self.tile_for_page(page).is_some() {
                continue;
            }

            let id = self.acquire_tile();
            let frame = self.page_frame(page);
            let tile = &mut self.tiles[id.0];
            tile.set_frame(frame);
            tile.set_page(Some(page));
            tile.attach();
            self.visible.push(id);
            attached.push(id);
        }
        attached
    }

    /// Evict tiles outside the window around `around`, farthest first,
    /// until at most `max_live` remain visible
    pub fn trim_to_window(&mut self, around: isize, max_live: usize, loader: &dyn ImageLoader) {
        while self.visible.len() > max_live {
            let farthest = self
                .visible
                .iter()
                .copied()
                .filter_map(|id| {
                    let page = self.tiles[id.0].page()? as isize;
                    let distance = (page - around).abs();
                    (distance > 1).then_some((id, distance))
                })
                .max_by_key(|(_, distance)| *distance);

            match farthest {
                Some((id, _)) => self.release(id, loader),
                None => break,
            }
        }
    }

    /// Unbind and pool every visible tile
    pub fn reset(&mut self, loader: &dyn ImageLoader) {
        for id in self.visible.clone() {
            self.release(id, loader);
        }
    }

    fn release(&mut self, id: TileId, loader: &dyn ImageLoader) {
        let tile = &mut self.tiles[id.0];
        tracing::debug!("Recycling tile {:?} (page {:?})", id, tile.page());
        tile.detach();
        tile.bind(None, false, loader);
        tile.set_page(None);
        self.visible.retain(|v| *v != id);
        self.free.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLoader;
    use egui::vec2;
    use std::collections::HashSet;

    const PAGE: f32 = 420.0;

    fn recycler() -> TileRecycler {
        TileRecycler::new(vec2(PAGE, 800.0), 10.0, 3.0)
    }

    fn pages(recycler: &TileRecycler) -> Vec<usize> {
        let mut pages: Vec<usize> = recycler.visible().filter_map(|t| t.page()).collect();
        pages.sort();
        pages
    }

    fn scroll_to(recycler: &mut TileRecycler, loader: &FakeLoader, offset: f32, count: usize) {
        recycler.reclaim(Viewport { offset, width: PAGE }, loader);
        let page = (offset / PAGE).round() as isize;
        recycler.ensure_window(page, count);
        recycler.trim_to_window(page, 3, loader);
    }

    #[test]
    fn test_ensure_window_clips_to_range() {
        let mut r = recycler();
        let attached = r.ensure_window(0, 5);
        assert_eq!(attached.len(), 2);
        assert_eq!(pages(&r), vec![0, 1]);

        r.ensure_window(4, 5);
        assert_eq!(pages(&r), vec![0, 1, 3, 4]);
        assert_eq!(r.tile_for_page(3).and_then(|id| r.tile(id)).map(|t| t.frame().min.x), Some(3.0 * PAGE));
    }

    #[test]
    fn test_acquire_reuses_last_freed() {
        let loader = FakeLoader::new();
        let mut r = recycler();
        r.ensure_window(1, 5);
        let first = r.tile_for_page(0).unwrap();
        let last = r.tile_for_page(2).unwrap();

        r.reset(&loader);
        assert_eq!(r.visible_len(), 0);
        assert_eq!(r.free_len(), 3);

        // Pool is LIFO
        assert_eq!(r.acquire_tile(), last);
        assert_ne!(r.acquire_tile(), first);
        assert_eq!(r.allocated(), 3);
    }

    #[test]
    fn test_reclaim_hysteresis_band() {
        let loader = FakeLoader::new();
        let mut r = recycler();
        r.ensure_window(1, 10);
        assert_eq!(pages(&r), vec![0, 1, 2]);

        // Page 0 spans [0, PAGE]; still inside the band at offset 1.5 pages
        assert_eq!(r.reclaim(Viewport { offset: 1.5 * PAGE, width: PAGE }, &loader), 0);
        // ...and gone once its right edge reaches offset - width
        assert_eq!(r.reclaim(Viewport { offset: 2.0 * PAGE, width: PAGE }, &loader), 1);
        assert_eq!(pages(&r), vec![1, 2]);

        for tile in r.free_tiles() {
            assert!(tile.page().is_none());
            assert!(tile.item().is_none());
            assert!(!tile.is_attached());
        }
    }

    #[test]
    fn test_single_page_scrolling_stays_bounded() {
        let loader = FakeLoader::new();
        let mut r = recycler();
        let count = 12;

        let mut offset = 0.0;
        while offset <= 11.0 * PAGE {
            scroll_to(&mut r, &loader, offset, count);

            assert!(r.visible_len() <= 3, "{} tiles at offset {}", r.visible_len(), offset);
            let tags: Vec<usize> = r.visible().filter_map(|t| t.page()).collect();
            let unique: HashSet<usize> = tags.iter().copied().collect();
            assert_eq!(tags.len(), unique.len(), "duplicate tags at offset {}", offset);
            offset += PAGE / 7.0;
        }
        // Pool grows only as far as needed
        assert!(r.allocated() <= 4);
    }

    #[test]
    fn test_window_coverage_after_settle() {
        let loader = FakeLoader::new();
        let mut r = recycler();
        for page in [0usize, 1, 2, 5, 4, 9] {
            scroll_to(&mut r, &loader, page as f32 * PAGE, 10);
            for p in page.saturating_sub(1)..=(page + 1).min(9) {
                assert!(r.tile_for_page(p).is_some(), "page {} missing around {}", p, page);
            }
        }
    }

    #[test]
    fn test_trim_keeps_window() {
        let loader = FakeLoader::new();
        let mut r = recycler();
        r.ensure_window(1, 10);
        r.ensure_window(3, 10);
        assert_eq!(pages(&r), vec![0, 1, 2, 3, 4]);

        r.trim_to_window(3, 3, &loader);
        assert_eq!(pages(&r), vec![2, 3, 4]);
    }
}
