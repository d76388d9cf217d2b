//! Paging for long listings such as the transactions page.

use maud::{Markup, html};

use crate::html::LINK_STYLE;

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The maximum number of rows per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of page numbers to show in the page links.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_pages: 5,
        }
    }
}

/// One entry in the row of page links under a table.
#[derive(Debug, PartialEq, Eq)]
pub enum PageLink {
    Page(u64),
    Current(u64),
    Gap,
    Previous(u64),
    Next(u64),
}

/// The number of pages needed to show `row_count` rows.
pub fn page_count(row_count: u64, page_size: u64) -> u64 {
    row_count.div_ceil(page_size.max(1)).max(1)
}

/// Build the page links for `current` out of `page_count` pages, showing at most
/// `max_pages` page numbers plus the first and last page.
pub fn page_links(current: u64, page_count: u64, max_pages: u64) -> Vec<PageLink> {
    let max_pages = max_pages.max(1);
    let (start, end) = if page_count <= max_pages {
        (1, page_count)
    } else {
        let start = current
            .saturating_sub(max_pages / 2)
            .clamp(1, page_count - max_pages + 1);
        (start, start + max_pages - 1)
    };

    let mut links = Vec::new();

    if current > 1 {
        links.push(PageLink::Previous(current - 1));
    }

    if start > 1 {
        links.push(PageLink::Page(1));
        links.push(PageLink::Gap);
    }

    links.extend((start..=end).map(|page| {
        if page == current {
            PageLink::Current(page)
        } else {
            PageLink::Page(page)
        }
    }));

    if end < page_count {
        links.push(PageLink::Gap);
        links.push(PageLink::Page(page_count));
    }

    if current < page_count {
        links.push(PageLink::Next(current + 1));
    }

    links
}

/// Render page links, using `href` to build the URL for a page number.
pub fn pagination_view(links: &[PageLink], href: impl Fn(u64) -> String) -> Markup {
    html! {
        nav class="pagination" aria-label="Pagination"
        {
            ul class="flex flex-wrap justify-center items-center gap-3 text-sm"
            {
                @for link in links {
                    li {
                        @match link {
                            PageLink::Page(page) => a href=(href(*page)) class=(LINK_STYLE) { (page) },
                            PageLink::Current(page) => span
                                aria-current="page"
                                class="font-semibold text-gray-900 dark:text-white"
                            { (page) },
                            PageLink::Gap => span class="text-gray-500" { "…" },
                            PageLink::Previous(page) => a href=(href(*page)) class=(LINK_STYLE) { "Previous" },
                            PageLink::Next(page) => a href=(href(*page)) class=(LINK_STYLE) { "Next" },
                        }
                    }
                }
            }
        }
    }
}
