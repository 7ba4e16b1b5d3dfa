use crate::config::PaginatorConfig;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Computed pagination state for one request.
///
/// Built by [`Paginator::compute`]; never persisted. When there is at least
/// one page:
///
/// - `1 <= current_page <= total_page_count`
/// - `1 <= min_page <= max_page <= total_page_count`
/// - `max_page - min_page + 1 <= visible_page_count_in_paginator`
///
/// With zero items the window is empty (`min_page == max_page == 0`),
/// `current_page` is 1 and both buttons are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginator {
    pub paginator_config: PaginatorConfig,
    pub current_page: u64,
    pub total_item_count: u64,
    pub total_page_count: u64,
    pub min_page: u64,
    pub max_page: u64,
    pub previous_button_page: Option<u64>,
    pub next_button_page: Option<u64>,
    pub request_uri: String,
}

impl Paginator {
    /// Compute the page window for `total_item_count` rows.
    ///
    /// `requested_page` comes straight from the request and is not trusted:
    /// anything outside `1..=total_page_count` falls back to page 1.
    pub fn compute(
        paginator_config: PaginatorConfig,
        total_item_count: u64,
        requested_page: i64,
        request_uri: impl Into<String>,
    ) -> Self {
        let page_size = paginator_config.item_count_in_page.max(1);
        let visible = paginator_config.visible_page_count_in_paginator.max(1);

        let total_page_count = total_page_count(total_item_count, page_size);

        let current_page = match u64::try_from(requested_page) {
            Ok(page) if page >= 1 && page <= total_page_count => page,
            _ => 1,
        };

        let (min_page, max_page, previous_button_page, next_button_page) = if total_page_count == 0 {
            (0, 0, None, None)
        } else {
            let left = visible / 2;
            let right = visible - 1 - left;

            let max_page = total_page_count.min(current_page + right);
            let min_page = max_page.saturating_sub(visible - 1).max(1);
            let max_page = total_page_count.min(min_page + (visible - 1));

            let previous = (current_page != 1).then(|| current_page - 1);
            let next = (current_page != total_page_count).then(|| current_page + 1);
            (min_page, max_page, previous, next)
        };

        Self {
            paginator_config,
            current_page,
            total_item_count,
            total_page_count,
            min_page,
            max_page,
            previous_button_page,
            next_button_page,
            request_uri: request_uri.into(),
        }
    }

    /// Page numbers to render as direct links.
    pub fn pages(&self) -> RangeInclusive<u64> {
        if self.total_page_count == 0 {
            // empty
            1..=0
        } else {
            self.min_page..=self.max_page
        }
    }

    /// Row offset of the first item on the current page.
    pub fn offset(&self) -> u64 {
        (self.current_page - 1) * self.limit()
    }

    pub fn limit(&self) -> u64 {
        self.paginator_config.item_count_in_page.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.total_item_count == 0
    }
}

/// `0` for no items, otherwise `ceil(total_item_count / page_size)`.
pub fn total_page_count(total_item_count: u64, page_size: u64) -> u64 {
    if total_item_count == 0 {
        0
    } else {
        (total_item_count - 1) / page_size.max(1) + 1
    }
}
