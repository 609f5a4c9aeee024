//! Page and group bookkeeping

use crate::config::IndicatorStyle;
use crate::item::SharedItem;
use crate::BrowserError;

/// Page under a scroll offset: whichever page the offset has crossed the
/// midpoint toward. May be out of range while overscrolling.
pub fn current_page(scroll_offset: f32, page_width: f32) -> isize {
    if page_width <= 0.0 {
        return 0;
    }
    (scroll_offset / page_width).round() as isize
}

/// Direction of a cross-group switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStep {
    Previous,
    Next,
}

/// Ordered groups of items plus the active group/page
pub struct GroupedPager {
    groups: Vec<Vec<SharedItem>>,
    active_group: usize,
    /// Items being paged; normally `groups[active_group]`
    items: Vec<SharedItem>,
    active_page: usize,
}

impl GroupedPager {
    pub fn new(items: Vec<SharedItem>, initial_page: usize) -> Self {
        let active_page = initial_page.min(items.len().saturating_sub(1));
        Self {
            groups: vec![Vec::new()],
            active_group: 0,
            items,
            active_page,
        }
    }

    /// Replace the group list, with the items being paged belonging to
    /// `active_group`. The items and active page are left as they are. An
    /// empty list falls back to one empty group.
    pub fn set_groups(&mut self, groups: Vec<Vec<SharedItem>>, active_group: usize) {
        self.groups = if groups.is_empty() { vec![Vec::new()] } else { groups };
        self.active_group = active_group.min(self.groups.len() - 1);
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn active_group(&self) -> usize {
        self.active_group
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, page: usize) -> Option<&SharedItem> {
        self.items.get(page)
    }

    pub fn active_item(&self) -> Option<&SharedItem> {
        self.items.get(self.active_page)
    }

    /// Commit `page` as active. Returns the page when it changed and is in range.
    pub fn commit_page(&mut self, page: isize) -> Option<usize> {
        if page < 0 || page as usize >= self.items.len() {
            return None;
        }
        let page = page as usize;
        if page == self.active_page {
            return None;
        }
        self.active_page = page;
        Some(page)
    }

    /// Group switch requested by an overscroll of `scroll_offset` past the
    /// content edges by more than `slack`
    pub fn overscroll_step(&self, scroll_offset: f32, page_width: f32, slack: f32) -> Option<GroupStep> {
        if self.groups.len() <= 1 {
            return None;
        }
        let content_width = page_width * self.items.len() as f32;

        if scroll_offset + page_width > content_width + slack {
            (self.active_group + 1 < self.groups.len()).then_some(GroupStep::Next)
        } else if scroll_offset < -slack {
            (self.active_group > 0).then_some(GroupStep::Previous)
        } else {
            None
        }
    }

    pub fn step_target(&self, step: GroupStep) -> Option<usize> {
        match step {
            GroupStep::Next => (self.active_group + 1 < self.groups.len()).then_some(self.active_group + 1),
            GroupStep::Previous => self.active_group.checked_sub(1),
        }
    }

    /// Make `index` the active group and start at its first page
    pub fn switch_group(&mut self, index: usize) -> Result<(), BrowserError> {
        let items = self
            .groups
            .get(index)
            .ok_or(BrowserError::InvalidGroup {
                index,
                count: self.groups.len(),
            })?
            .clone();

        self.active_group = index;
        self.items = items;
        self.active_page = 0;
        Ok(())
    }
}

/// Page indicator below the photos
#[derive(Debug, Clone)]
pub struct PageIndicator {
    pub style: IndicatorStyle,
    pub current: usize,
    pub count: usize,
    pub alpha: f32,
}

impl PageIndicator {
    pub fn new(style: IndicatorStyle) -> Self {
        Self {
            style,
            current: 0,
            count: 0,
            alpha: 1.0,
        }
    }

    pub fn reload(&mut self, current: usize, count: usize) {
        self.count = count;
        self.current = current;
    }

    /// Text for the numbered style, `None` for dots
    pub fn label(&self) -> Option<String> {
        match self.style {
            IndicatorStyle::Numbered if self.count > 0 => {
                Some(format!("{} / {}", self.current + 1, self.count))
            }
            _ => None,
        }
    }
}
