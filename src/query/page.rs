use std::num::NonZeroU32;

use crate::error::{Result, ShopError};

pub const PAGE_PARAM: &str = "_page";
pub const LIMIT_PARAM: &str = "_limit";

/// One-based page number and page size. Both are always sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page: NonZeroU32,
    limit: NonZeroU32,
}

impl PageSpec {
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(page: u32, limit: u32) -> Result<Self> {
        let page = NonZeroU32::new(page)
            .ok_or_else(|| ShopError::InvalidQuery("page must be at least 1".into()))?;
        let limit = NonZeroU32::new(limit)
            .ok_or_else(|| ShopError::InvalidQuery("limit must be at least 1".into()))?;

        Ok(PageSpec { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page.get()
    }

    pub fn limit(&self) -> u32 {
        self.limit.get()
    }

    /// Zero-based index of the first record on this page.
    pub fn offset(&self) -> usize {
        (self.page() as usize - 1) * self.limit() as usize
    }

    pub fn next(&self) -> Option<Self> {
        self.page.checked_add(1).map(|page| PageSpec {
            page,
            limit: self.limit,
        })
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            (PAGE_PARAM.to_owned(), self.page.to_string()),
            (LIMIT_PARAM.to_owned(), self.limit.to_string()),
        ]
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec {
            page: NonZeroU32::MIN,
            limit: NonZeroU32::new(Self::DEFAULT_LIMIT).unwrap_or(NonZeroU32::MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero() {
        assert!(matches!(PageSpec::new(0, 10), Err(ShopError::InvalidQuery(_))));
        assert!(matches!(PageSpec::new(1, 0), Err(ShopError::InvalidQuery(_))));
    }

    #[test]
    fn test_default_page() {
        let page = PageSpec::default();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_offset_and_next() {
        let page = PageSpec::new(3, 5).unwrap();
        assert_eq!(page.offset(), 10);

        let next = page.next().unwrap();
        assert_eq!(next.page(), 4);
        assert_eq!(next.limit(), 5);

        assert!(PageSpec::new(u32::MAX, 5).unwrap().next().is_none());
    }
}
