//! Callbacks out of the browser

use crate::item::{Bitmap, SharedItem};

/// Where the browser is when it reports a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    pub group: usize,
    pub page: usize,
    pub page_count: usize,
}

/// Receives paging events. Called on the UI thread.
pub trait PagerObserver {
    /// A new page was committed while presented
    fn on_page_changed(&mut self, context: &PageContext, item: &SharedItem);

    /// Paging deceleration ended
    fn on_settle(&mut self, _context: &PageContext) {}

    fn on_group_changed(&mut self, _group: usize, _group_count: usize) {}

    /// Long press on the active photo. `image` is the best image available.
    fn on_long_press(&mut self, _item: &SharedItem, _image: Option<&Bitmap>) {}

    fn on_dismissed(&mut self) {}
}

/// Modal presentation requested from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalStyle {
    /// Full screen, with the host's own transition disabled
    FullScreenCustom,
}

/// Screen that presents the browser
pub trait PresentationHost {
    fn present(&mut self, style: ModalStyle, animated: bool);

    fn dismiss(&mut self, animated: bool);

    fn set_status_bar_hidden(&mut self, _hidden: bool) {}
}
