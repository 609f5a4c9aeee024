//! Photo Browser Core
//!
//! This crate contains:
//! - Photo items and recyclable page tiles
//! - Tile recycling and grouped paging
//! - Open / drag / dismiss transition state machine
//! - Animation tracks and the caption timer
//! - Configuration
//! - Error types
//! - Image loading

pub mod animation;
pub mod browser;
pub mod caption;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod image_loader;
pub mod item;
pub mod observer;
pub mod pager;
pub mod recycler;
pub mod tile;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use animation::{AnimTarget, AnimValue, Animation, Animator, Easing};
pub use browser::Browser;
pub use caption::{CaptionState, CaptionTimer};
pub use config::{
    AnimationConfig, BrowserConfig, GestureConfig, IndicatorStyle, LoaderConfig, PagingConfig,
    ZoomConfig,
};
pub use error::BrowserError;
pub use gesture::{PanEvent, PanPhase, Tap, TapArbiter};
pub use image_loader::{
    is_supported_image, ChannelImageLoader, ImageLoader, LoadCompletion, LoadRequest, LoadToken,
};
pub use item::{Bitmap, ImageUrl, PhotoItem, SharedItem, SourceView};
pub use observer::{ModalStyle, PageContext, PagerObserver, PresentationHost};
pub use pager::{current_page, GroupStep, GroupedPager, PageIndicator};
pub use recycler::{TileRecycler, Viewport};
pub use tile::{LoadOutcome, PhotoTile, ProgressIndicator, TileId};
pub use transition::{DismissThresholds, DragOutcome, DragStart, Phase, TransitionController};
