use std::{fmt::Display, num::NonZeroUsize};

use roster_states::{Compute, ComputeDeps, Dep, Error, State};

use super::sort_compute::SortedUsersCompute;
use crate::User;

/// Current page (1-based) and page size.
///
/// The current page is not clamped when the record count shrinks; it only moves through
/// [`PageState::go_to`] and the resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current_page: usize,
    page_size: NonZeroUsize,
}

impl State for PageState {}

impl Default for PageState {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(25).unwrap_or(NonZeroUsize::MIN))
    }
}

impl PageState {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            current_page: 1,
            page_size,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Move to `page` if it lies in `1..=total_pages`; returns whether the page changed.
    pub fn go_to(&mut self, page: usize, total_pages: usize) -> bool {
        if !(1..=total_pages).contains(&page) || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.page_size = page_size;
        self.current_page = 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl Display for PageItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Page(page) => write!(f, "{page}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// Page buttons to show: every page up to seven, otherwise the first and last page around
/// a window near the current one.
pub fn visible_pages(current: usize, total: usize) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total <= 7 {
        return (1..=total).map(Page).collect();
    }

    let mut items = Vec::with_capacity(7);
    if current <= 4 {
        items.extend((1..=5).map(Page));
        items.extend([Ellipsis, Page(total)]);
    } else if current >= total - 3 {
        items.extend([Page(1), Ellipsis]);
        items.extend((total - 4..=total).map(Page));
    } else {
        items.extend([Page(1), Ellipsis]);
        items.extend((current - 1..=current + 1).map(Page));
        items.extend([Ellipsis, Page(total)]);
    }
    items
}

/// One page of the sorted, filtered records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Records after filtering, across all pages.
    pub total_count: usize,
    /// 1-based index of the first row shown, for "start-end of total" captions.
    pub start: usize,
    pub end: usize,
    pub rows: Vec<User>,
    pub visible_pages: Vec<PageItem>,
}

pub fn paginate(users: &[User], page: &PageState) -> PageView {
    let size = page.page_size();
    let current = page.current_page();
    let total_count = users.len();
    let total_pages = total_count.div_ceil(size);
    let offset = (current - 1) * size;

    PageView {
        current_page: current,
        page_size: size,
        total_pages,
        total_count,
        start: offset + 1,
        end: (current * size).min(total_count),
        rows: users.iter().skip(offset).take(size).cloned().collect(),
        visible_pages: visible_pages(current, total_pages),
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaginationCompute {
    pub view: PageView,
}

impl Compute for PaginationCompute {
    fn deps(&self) -> ComputeDeps {
        ComputeDeps::new()
            .compute::<SortedUsersCompute>()
            .state::<PageState>()
    }

    fn compute(&self, deps: Dep<'_>) -> Result<Self, Error> {
        let sorted = deps.compute::<SortedUsersCompute>()?;
        let page = deps.state::<PageState>()?;

        Ok(Self {
            view: paginate(&sorted.users, page),
        })
    }
}
