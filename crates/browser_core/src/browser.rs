//! Full-screen photo browser
//!
//! Ties the pager, the tile recycler and the transition state machine
//! together. Everything here runs on the host's UI thread: the host
//! forwards scroll/pan/tap input, hands back image loads, and calls
//! [`Browser::tick`] once per frame.

use crate::animation::{AnimTarget, AnimValue, Animation, Animator, Easing};
use crate::caption::CaptionState;
use crate::config::BrowserConfig;
use crate::gesture::{PanEvent, PanPhase, Tap, TapArbiter};
use crate::image_loader::{ImageLoader, LoadCompletion};
use crate::item::SharedItem;
use crate::observer::{ModalStyle, PageContext, PagerObserver, PresentationHost};
use crate::pager::{current_page, GroupedPager, PageIndicator};
use crate::recycler::{TileRecycler, Viewport};
use crate::tile::{LoadOutcome, PhotoTile, TileId};
use crate::transition::{DismissThresholds, DragOutcome, Phase, TransitionController};
use crate::BrowserError;
use egui::{vec2, Pos2, Rect, Vec2};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What to do when an animation batch finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Opened,
    Cancelled,
    Dismissed,
    CaptionShown,
}

/// Which surface owns the current pan gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanMode {
    Idle,
    /// Outer dismiss drag
    Dismiss,
    /// Scrolling a zoomed tile
    Content,
}

pub struct Browser {
    config: BrowserConfig,
    loader: Arc<dyn ImageLoader>,
    pager: GroupedPager,
    recycler: TileRecycler,
    transition: TransitionController,
    animator: Animator<Completion>,
    taps: TapArbiter,
    indicator: PageIndicator,
    caption: CaptionState,
    observer: Option<Box<dyn PagerObserver>>,
    host: Option<Box<dyn PresentationHost>>,

    /// Browser bounds on screen
    bounds: Rect,
    scroll_offset: f32,
    /// Set once the opening animation has finished
    presented: bool,
    backdrop_alpha: f32,
    surface_alpha: f32,
    reported_status_bar: bool,

    pan_mode: PanMode,
    last_translation: Vec2,
}

impl Browser {
    pub fn new(items: Vec<SharedItem>, initial_page: usize, loader: Arc<dyn ImageLoader>) -> Self {
        Self::with_config(items, initial_page, loader, BrowserConfig::default())
    }

    pub fn with_config(
        items: Vec<SharedItem>,
        initial_page: usize,
        loader: Arc<dyn ImageLoader>,
        config: BrowserConfig,
    ) -> Self {
        let pager = GroupedPager::new(items, initial_page);
        let recycler = TileRecycler::new(
            Vec2::ZERO,
            config.paging.page_padding,
            config.zoom.max_zoom,
        );

        Self {
            transition: TransitionController::new(DismissThresholds::from(&config.gesture)),
            taps: TapArbiter::new(config.gesture.double_tap_interval()),
            indicator: PageIndicator::new(config.paging.indicator_style),
            caption: CaptionState::new(config.animation.caption_hide_delay()),
            animator: Animator::new(),
            observer: None,
            host: None,
            bounds: Rect::ZERO,
            scroll_offset: 0.0,
            presented: false,
            backdrop_alpha: 0.0,
            surface_alpha: 1.0,
            reported_status_bar: false,
            pan_mode: PanMode::Idle,
            last_translation: Vec2::ZERO,
            config,
            loader,
            pager,
            recycler,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn PagerObserver>) {
        self.observer = Some(observer);
    }

    /// Enable cross-group paging. The items the browser was built with are
    /// group `active_group`; they and the initial page are kept.
    pub fn set_groups(&mut self, groups: Vec<Vec<SharedItem>>, active_group: usize) {
        self.pager.set_groups(groups, active_group);
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.transition.phase()
    }

    pub fn is_presented(&self) -> bool {
        self.presented
    }

    pub fn active_page(&self) -> usize {
        self.pager.active_page()
    }

    pub fn active_group(&self) -> usize {
        self.pager.active_group()
    }

    pub fn group_count(&self) -> usize {
        self.pager.group_count()
    }

    pub fn page_count(&self) -> usize {
        self.pager.len()
    }

    pub fn active_item(&self) -> Option<&SharedItem> {
        self.pager.active_item()
    }

    /// Horizontal offset the host's paging surface should show
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn page_width(&self) -> f32 {
        self.recycler.page_width()
    }

    pub fn content_width(&self) -> f32 {
        self.page_width() * self.pager.len() as f32
    }

    pub fn backdrop_alpha(&self) -> f32 {
        self.backdrop_alpha
    }

    pub fn surface_alpha(&self) -> f32 {
        self.surface_alpha
    }

    pub fn status_bar_hidden(&self) -> bool {
        self.transition.status_bar_hidden()
    }

    pub fn indicator(&self) -> &PageIndicator {
        &self.indicator
    }

    pub fn caption(&self) -> &CaptionState {
        &self.caption
    }

    pub fn recycler(&self) -> &TileRecycler {
        &self.recycler
    }

    pub fn active_tile(&self) -> Option<&PhotoTile> {
        self.active_tile_id().and_then(|id| self.recycler.tile(id))
    }

    pub fn is_animating(&self, target: AnimTarget) -> bool {
        self.animator.is_animating(target)
    }

    /// Image frame of a tile in screen coordinates
    pub fn image_frame_on_screen(&self, id: TileId) -> Option<Rect> {
        let tile = self.recycler.tile(id)?;
        Some(tile.image_frame().translate(self.tile_origin(tile)))
    }

    fn active_tile_id(&self) -> Option<TileId> {
        self.recycler.tile_for_page(self.pager.active_page())
    }

    fn page_context(&self) -> PageContext {
        PageContext {
            group: self.pager.active_group(),
            page: self.pager.active_page(),
            page_count: self.pager.len(),
        }
    }

    /// Screen position of a tile's local origin
    fn tile_origin(&self, tile: &PhotoTile) -> Vec2 {
        let padding = self.config.paging.page_padding;
        vec2(
            tile.frame().min.x - self.scroll_offset + self.bounds.min.x - padding,
            tile.frame().min.y + self.bounds.min.y,
        )
    }

    fn to_tile_local(&self, id: TileId, screen: Rect) -> Rect {
        match self.recycler.tile(id) {
            Some(tile) => screen.translate(-self.tile_origin(tile)),
            None => screen,
        }
    }

    // ========================================
    // Presentation
    // ========================================

    /// Present full screen inside `bounds` and start the opening animation
    pub fn show(&mut self, mut host: Box<dyn PresentationHost>, bounds: Rect, now: Instant) {
        if !self.transition.begin_opening() {
            tracing::warn!("show() ignored while {:?}", self.transition.phase());
            return;
        }
        tracing::info!(
            "Presenting browser: {} items, page {}",
            self.pager.len(),
            self.pager.active_page()
        );

        host.present(ModalStyle::FullScreenCustom, false);
        self.host = Some(host);
        self.surface_alpha = 1.0;
        self.backdrop_alpha = 0.0;
        self.relayout(bounds);
        self.reload_labels();

        let loader = self.loader.clone();
        let mut animations = vec![Animation::scalar(AnimTarget::Backdrop, 0.0, 1.0)];

        if let (Some(item), Some(id)) = (self.pager.active_item().cloned(), self.active_tile_id()) {
            let source_frame = item.source_view().and_then(|view| view.frame_on_screen());
            let start = source_frame.map(|frame| self.to_tile_local(id, frame));

            if let Some(tile) = self.recycler.tile_mut(id) {
                tile.show_preview(&item, &*loader);
                let end = tile.image_frame();
                match start {
                    Some(start) => {
                        tile.set_image_frame(start);
                        animations.push(Animation::frame(AnimTarget::TileFrame(id), start, end));
                    }
                    None => tracing::debug!("Source view gone, opening with a fade"),
                }
            }
        }

        self.animator.start(
            animations,
            self.config.animation.spring(),
            Easing::EaseOut,
            now,
            Some(Completion::Opened),
        );
    }

    /// Resize to new bounds, keeping the active page in view
    pub fn relayout(&mut self, bounds: Rect) {
        self.bounds = bounds;
        let padding = self.config.paging.page_padding;
        self.recycler
            .set_page_size(vec2(bounds.width() + 2.0 * padding, bounds.height()));
        self.scroll_offset = self.pager.active_page() as f32 * self.page_width();
        self.layout_tiles();
    }

    /// Dismiss as if the photo had been tapped
    pub fn close(&mut self, now: Instant) {
        if self.transition.begin_dismissing() {
            self.run_dismissal(now);
        }
    }

    fn sync_status_bar(&mut self) {
        let hidden = self.transition.status_bar_hidden();
        if hidden == self.reported_status_bar {
            return;
        }
        self.reported_status_bar = hidden;
        if let Some(host) = self.host.as_mut() {
            host.set_status_bar_hidden(hidden);
        }
    }

    // ========================================
    // Paging
    // ========================================

    /// The paging surface scrolled to `offset_x`
    pub fn on_scroll(&mut self, offset_x: f32) {
        self.scroll_offset = offset_x;
        self.layout_tiles();

        if self.transition.phase() != Phase::Presented {
            return;
        }
        let step = self.pager.overscroll_step(
            offset_x,
            self.page_width(),
            self.config.paging.overscroll_slack,
        );
        if let Some(target) = step.and_then(|step| self.pager.step_target(step)) {
            tracing::debug!("Overscroll {:?} to group {}", step, target);
            if let Err(e) = self.switch_to_group(target) {
                tracing::warn!("Group switch failed: {}", e);
            }
        }
    }

    /// Jump straight to `page` without animating
    pub fn scroll_to_page(&mut self, page: usize) {
        if self.pager.is_empty() {
            return;
        }
        let page = page.min(self.pager.len() - 1);
        self.scroll_offset = page as f32 * self.page_width();
        self.layout_tiles();
    }

    pub fn on_scroll_begin_drag(&mut self, now: Instant) {
        self.hide_caption(now);
    }

    /// Paging deceleration ended
    pub fn on_scroll_end_decelerating(&mut self, now: Instant) {
        self.reveal_caption(now);
        let context = self.page_context();
        if let Some(observer) = self.observer.as_mut() {
            observer.on_settle(&context);
        }
    }

    /// Switch to group `index`, starting at its first page
    pub fn select_group(&mut self, index: usize) -> Result<(), BrowserError> {
        match self.transition.phase() {
            Phase::Closed => self.pager.switch_group(index),
            Phase::Presented => self.switch_to_group(index),
            phase => Err(BrowserError::Busy(format!("{:?}", phase))),
        }
    }

    /// Recycle, materialise and bind tiles for the current offset, then
    /// commit the page under it
    fn layout_tiles(&mut self) {
        let loader = self.loader.clone();
        let page_width = self.page_width();
        if page_width <= 0.0 {
            return;
        }

        self.recycler.reclaim(
            Viewport {
                offset: self.scroll_offset,
                width: page_width,
            },
            &*loader,
        );
        let page = current_page(self.scroll_offset, page_width);
        self.recycler.ensure_window(page, self.pager.len());
        self.recycler
            .trim_to_window(page, self.config.paging.max_live_tiles, &*loader);

        if self.presented {
            let unbound: Vec<(TileId, usize)> = self
                .recycler
                .visible()
                .filter(|tile| tile.item().is_none())
                .filter_map(|tile| tile.page().map(|page| (tile.id(), page)))
                .collect();
            for (id, page) in unbound {
                let item = self.pager.item(page).cloned();
                if let Some(tile) = self.recycler.tile_mut(id) {
                    tile.bind(item, true, &*loader);
                }
            }
        }

        if self.presented && self.transition.phase().is_interactive() {
            if let Some(page) = self.pager.commit_page(page) {
                self.page_committed(page);
            }
        }
    }

    fn page_committed(&mut self, page: usize) {
        self.reload_labels();
        let context = self.page_context();
        tracing::debug!("Page {} of {} (group {})", page, context.page_count, context.group);
        if let (Some(observer), Some(item)) = (self.observer.as_mut(), self.pager.item(page)) {
            observer.on_page_changed(&context, item);
        }
    }

    fn reload_labels(&mut self) {
        self.indicator
            .reload(self.pager.active_page(), self.pager.len());
        let text = self.pager.active_item().and_then(|item| item.caption());
        self.caption.set_text(text);
    }

    /// Full reset onto another group: every tile is pooled because page
    /// tags are only unique within a group
    fn switch_to_group(&mut self, index: usize) -> Result<(), BrowserError> {
        self.pager.switch_group(index)?;
        tracing::info!(
            "Switched to group {} of {} ({} items)",
            index,
            self.pager.group_count(),
            self.pager.len()
        );

        let loader = self.loader.clone();
        self.recycler.reset(&*loader);
        self.scroll_offset = 0.0;
        self.layout_tiles();

        let group_count = self.pager.group_count();
        if let Some(observer) = self.observer.as_mut() {
            observer.on_group_changed(index, group_count);
        }
        if !self.pager.is_empty() {
            self.page_committed(0);
        } else {
            self.reload_labels();
        }
        Ok(())
    }

    // ========================================
    // Caption
    // ========================================

    // Caption tracks belong to the running transition outside the
    // interactive phases, so these are no-ops there.

    fn hide_caption(&mut self, now: Instant) {
        if !self.transition.phase().is_interactive() {
            return;
        }
        self.caption.hide();
        self.animator.start(
            vec![Animation::scalar(AnimTarget::Caption, self.caption.alpha, 0.0)],
            self.config.animation.caption_reveal(),
            Easing::Linear,
            now,
            None,
        );
    }

    /// Show the caption; the hide timer arms once it is fully visible
    fn reveal_caption(&mut self, now: Instant) {
        if !self.transition.phase().is_interactive() {
            return;
        }
        self.caption.timer.invalidate();
        self.caption.visible = true;
        self.animator.start(
            vec![Animation::scalar(AnimTarget::Caption, self.caption.alpha, 1.0)],
            self.config.animation.caption_reveal(),
            Easing::Linear,
            now,
            Some(Completion::CaptionShown),
        );
    }

    fn fade_caption(&mut self, now: Instant) {
        if !self.transition.phase().is_interactive() {
            return;
        }
        tracing::trace!("Caption idle, fading out");
        self.caption.visible = false;
        self.animator.start(
            vec![Animation::scalar(AnimTarget::Caption, self.caption.alpha, 0.0)],
            self.config.animation.caption_fade(),
            Easing::Linear,
            now,
            None,
        );
    }

    // ========================================
    // Gestures
    // ========================================

    pub fn on_pan(&mut self, event: PanEvent, now: Instant) {
        match event.phase {
            PanPhase::Began => self.pan_began(event, now),
            PanPhase::Changed => self.pan_changed(event),
            PanPhase::Ended | PanPhase::Cancelled => self.pan_ended(event, now),
        }
    }

    fn pan_began(&mut self, event: PanEvent, now: Instant) {
        self.pan_mode = PanMode::Idle;
        self.last_translation = event.translation;

        let Some(id) = self.active_tile_id() else {
            return;
        };
        let Some(tile) = self.recycler.tile(id) else {
            return;
        };

        let epsilon = self.config.zoom.dismiss_zoom_epsilon;
        if tile.is_zoomed(epsilon) {
            self.pan_mode = PanMode::Content;
            return;
        }
        if !self.transition.can_begin_drag(tile.zoom_scale(), epsilon)
            || !tile.is_at_vertical_scroll_limit(event.translation.y)
        {
            return;
        }

        let start_frame = tile.image_frame().translate(self.tile_origin(tile));
        if !self.transition.begin_drag(event.location, start_frame) {
            return;
        }
        self.pan_mode = PanMode::Dismiss;
        self.taps.reset();

        if let Some(tile) = self.recycler.tile_mut(id) {
            tile.set_progress_hidden(true);
        }
        if let Some(view) = self.pager.active_item().and_then(|item| item.source_view()) {
            view.set_opacity(0.0);
        }
        self.hide_caption(now);
        self.sync_status_bar();
    }

    fn pan_changed(&mut self, event: PanEvent) {
        match self.pan_mode {
            PanMode::Dismiss => {
                let Some(id) = self.active_tile_id() else {
                    return;
                };
                let Some(drag) =
                    self.transition
                        .drag_update(event.location, event.translation.y, self.bounds.height())
                else {
                    return;
                };
                let local = self.to_tile_local(id, drag.frame);
                if let Some(tile) = self.recycler.tile_mut(id) {
                    tile.set_image_frame(local);
                }
                self.backdrop_alpha = drag.percent;
                self.indicator.alpha = drag.percent;
                if self.caption.visible {
                    self.caption.alpha = drag.percent;
                }
            }
            PanMode::Content => {
                let delta = event.translation - self.last_translation;
                if let Some(tile) = self.active_tile_id().and_then(|id| self.recycler.tile_mut(id)) {
                    tile.pan_content(delta);
                }
            }
            PanMode::Idle => {}
        }
        self.last_translation = event.translation;
    }

    fn pan_ended(&mut self, event: PanEvent, now: Instant) {
        let mode = std::mem::replace(&mut self.pan_mode, PanMode::Idle);
        if mode != PanMode::Dismiss {
            return;
        }
        let interrupted = event.phase == PanPhase::Cancelled;
        match self
            .transition
            .end_drag(event.translation.y, event.velocity.y, interrupted)
        {
            Some(DragOutcome::Dismiss) => self.run_dismissal(now),
            Some(DragOutcome::Cancel) => self.run_cancellation(now),
            None => {}
        }
    }

    /// Raw tap at `location` (screen coordinates)
    pub fn on_tap(&mut self, location: Pos2, now: Instant) {
        if self.transition.phase() != Phase::Presented {
            return;
        }
        self.caption.timer.invalidate();
        match self.taps.tap(location, now) {
            Some(Tap::Single(_)) => self.single_tap(now),
            Some(Tap::Double(location)) => self.double_tap(location),
            None => {}
        }
    }

    fn single_tap(&mut self, now: Instant) {
        if self.transition.phase() != Phase::Presented {
            return;
        }
        let epsilon = self.config.zoom.dismiss_zoom_epsilon;
        if let Some(tile) = self.active_tile_id().and_then(|id| self.recycler.tile_mut(id)) {
            if tile.is_zoomed(epsilon) {
                tile.reset_zoom();
                return;
            }
        }
        self.close(now);
    }

    fn double_tap(&mut self, location: Pos2) {
        let Some(item) = self.pager.active_item() else {
            return;
        };
        if !item.is_finished() {
            tracing::debug!("Double tap ignored, image still loading");
            return;
        }
        let Some(id) = self.active_tile_id() else {
            return;
        };
        let focus = match self.recycler.tile(id) {
            Some(tile) => location - self.tile_origin(tile),
            None => return,
        };
        if let Some(tile) = self.recycler.tile_mut(id) {
            if tile.zoom_scale() > 1.0 {
                tile.reset_zoom();
            } else {
                tile.zoom_toward(focus);
            }
        }
    }

    pub fn on_long_press(&mut self) {
        if !self.transition.phase().is_interactive() {
            return;
        }
        let tile = self.active_tile_id().and_then(|id| self.recycler.tile(id));
        let (Some(item), Some(tile)) = (self.pager.active_item(), tile) else {
            return;
        };
        if let Some(observer) = self.observer.as_mut() {
            observer.on_long_press(item, tile.image());
        }
    }

    // ========================================
    // Transitions
    // ========================================

    fn run_cancellation(&mut self, now: Instant) {
        let (Some(item), Some(id)) = (self.pager.active_item().cloned(), self.active_tile_id()) else {
            self.animator
                .start(Vec::new(), Duration::ZERO, Easing::Linear, now, Some(Completion::Cancelled));
            return;
        };

        if let Some(view) = item.source_view() {
            view.set_opacity(1.0);
        }
        let restore = self
            .transition
            .drag_start()
            .map(|start| self.to_tile_local(id, start.frame));

        let mut animations = vec![
            Animation::scalar(AnimTarget::Backdrop, self.backdrop_alpha, 1.0),
            Animation::scalar(AnimTarget::Indicator, self.indicator.alpha, 1.0),
        ];
        if let Some(tile) = self.recycler.tile_mut(id) {
            if !item.is_finished() {
                tile.set_progress_hidden(false);
            }
            if let Some(restore) = restore {
                animations.push(Animation::frame(
                    AnimTarget::TileFrame(id),
                    tile.image_frame(),
                    restore,
                ));
            }
        }

        self.animator.start(
            animations,
            self.config.animation.spring(),
            Easing::EaseOut,
            now,
            Some(Completion::Cancelled),
        );
    }

    /// Animate back to the source thumbnail, or fade out when it is gone
    fn run_dismissal(&mut self, now: Instant) {
        tracing::info!("Dismissing browser from page {}", self.pager.active_page());
        self.caption.timer.invalidate();
        self.taps.reset();

        let item = self.pager.active_item().cloned();
        let id = self.active_tile_id();
        let target = item
            .as_ref()
            .and_then(|item| item.source_view())
            .and_then(|view| view.frame_on_screen().map(|frame| (view, frame)));

        let (Some(id), Some((view, frame))) = (id, target) else {
            tracing::debug!("Source view gone, dismissing with a fade");
            self.animator.start(
                vec![Animation::scalar(AnimTarget::Surface, self.surface_alpha, 0.0)],
                self.config.animation.fade(),
                Easing::Linear,
                now,
                Some(Completion::Dismissed),
            );
            return;
        };

        view.set_opacity(0.0);
        let end = self.to_tile_local(id, frame);
        let mut animations = vec![
            Animation::scalar(AnimTarget::Backdrop, self.backdrop_alpha, 0.0),
            Animation::scalar(AnimTarget::Indicator, self.indicator.alpha, 0.0),
            Animation::scalar(AnimTarget::Caption, self.caption.alpha, 0.0),
        ];
        if let Some(tile) = self.recycler.tile_mut(id) {
            tile.set_progress_hidden(true);
            animations.push(Animation::frame(AnimTarget::TileFrame(id), tile.image_frame(), end));
        }

        self.animator.start(
            animations,
            self.config.animation.spring(),
            Easing::EaseOut,
            now,
            Some(Completion::Dismissed),
        );
    }

    fn complete(&mut self, completion: Completion, now: Instant) {
        let loader = self.loader.clone();
        match completion {
            Completion::Opened => {
                if !self.transition.finish_opening() {
                    return;
                }
                self.presented = true;
                if let (Some(item), Some(id)) = (self.pager.active_item().cloned(), self.active_tile_id()) {
                    if let Some(tile) = self.recycler.tile_mut(id) {
                        tile.bind(Some(item), true, &*loader);
                    }
                }
                self.layout_tiles();
                self.sync_status_bar();
                tracing::info!("Browser presented");
            }
            Completion::Cancelled => {
                if !self.transition.finish_cancelling() {
                    return;
                }
                if let (Some(item), Some(id)) = (self.pager.active_item().cloned(), self.active_tile_id()) {
                    if let Some(tile) = self.recycler.tile_mut(id) {
                        tile.bind(Some(item), true, &*loader);
                    }
                }
                self.sync_status_bar();
                self.reveal_caption(now);
            }
            Completion::Dismissed => {
                if let Some(view) = self.pager.active_item().and_then(|item| item.source_view()) {
                    view.set_opacity(1.0);
                }
                self.transition.finish_dismissing();
                self.presented = false;
                self.sync_status_bar();
                if let Some(mut host) = self.host.take() {
                    host.dismiss(false);
                }
                self.recycler.reset(&*loader);
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_dismissed();
                }
                tracing::info!("Browser dismissed");
            }
            Completion::CaptionShown => {
                self.caption.timer.arm(now);
            }
        }
    }

    // ========================================
    // Frame loop
    // ========================================

    /// Hand a finished image load to the tile that asked for it
    pub fn deliver_image(&mut self, completion: LoadCompletion) -> LoadOutcome {
        let id = completion.tile;
        // The animation or the drag owns this tile's image frame
        let frame_owned = self.animator.is_animating(AnimTarget::TileFrame(id))
            || (self.transition.phase() == Phase::Dragging && self.active_tile_id() == Some(id));
        let Some(tile) = self.recycler.tile_mut(id) else {
            tracing::debug!("Load for unknown tile {:?}", id);
            return LoadOutcome::Stale;
        };

        let frame = tile.image_frame();
        let outcome = tile.complete_load(completion);
        if outcome == LoadOutcome::Applied && frame_owned {
            tile.set_image_frame(frame);
        }
        outcome
    }

    /// Advance animations and timers. Returns true while more frames are needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let frame = self.animator.tick(now);
        for (target, value) in frame.values {
            self.apply(target, value);
        }
        for completion in frame.completed {
            self.complete(completion, now);
        }

        if self.caption.timer.poll(now) {
            self.fade_caption(now);
        }
        if let Some(Tap::Single(_)) = self.taps.poll(now) {
            self.single_tap(now);
        }

        !self.animator.is_idle() || self.caption.timer.is_armed() || self.taps.has_pending()
    }

    fn apply(&mut self, target: AnimTarget, value: AnimValue) {
        match (target, value) {
            (AnimTarget::TileFrame(id), AnimValue::Frame(frame)) => {
                if let Some(tile) = self.recycler.tile_mut(id) {
                    tile.set_image_frame(frame);
                }
            }
            (AnimTarget::Backdrop, AnimValue::Scalar(alpha)) => self.backdrop_alpha = alpha,
            (AnimTarget::Indicator, AnimValue::Scalar(alpha)) => self.indicator.alpha = alpha,
            (AnimTarget::Caption, AnimValue::Scalar(alpha)) => self.caption.alpha = alpha,
            (AnimTarget::Surface, AnimValue::Scalar(alpha)) => self.surface_alpha = alpha,
            (target, value) => {
                tracing::warn!("Mismatched animation value {:?} for {:?}", value, target);
            }
        }
    }
}
