use std::num::NonZeroU64;
use std::str::FromStr;

use crate::http_server::error::ApiError;

/// Page requested by a client, parsed from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
    Number(NonZeroU64),
    Last,
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::Number(NonZeroU64::MIN)
    }
}

impl FromStr for PageNumber {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "last" {
            return Ok(Self::Last);
        }

        s.parse::<NonZeroU64>().map(Self::Number).map_err(|_| {
            ApiError::BadRequest(format!(
                "Invalid page `{s}`: expected a positive integer or `last`"
            ))
        })
    }
}

/// A resolved page: where the window sits inside the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl PageWindow {
    /// Resolve the requested page against the total row count.
    ///
    /// An empty result set still has a valid first page (with zero total
    /// pages); every other page outside `1..=total_pages` is not found.
    pub fn resolve(
        total_count: u64,
        page_size: NonZeroU64,
        requested: PageNumber,
    ) -> Result<Self, ApiError> {
        let page_size = page_size.get();
        let total_pages = total_count.div_ceil(page_size);

        let number = match requested {
            PageNumber::Number(n) => n.get(),
            PageNumber::Last => total_pages.max(1),
        };

        let empty_first_page = total_count == 0 && number == 1;
        if number > total_pages && !empty_first_page {
            return Err(ApiError::NotFound(format!(
                "Page {number} does not exist ({total_pages} pages available)"
            )));
        }

        Ok(Self {
            number,
            page_size,
            total_count,
            total_pages,
        })
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.page_size
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }
}
