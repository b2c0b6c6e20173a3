//! Paginator - fixed-size page slices over an ordered list
//!
//! The paginator never clamps: an out-of-range page number yields an empty
//! slice. Callers keep the page number inside `[1, total_pages]`.

use std::num::NonZeroUsize;

/// One page of items
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// 1-based position of the first item on this page, 0 when empty
    pub fn first_item(&self, page_size: NonZeroUsize) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.number - 1) * page_size.get() + 1
        }
    }
}

/// `max(1, ceil(len / page_size))`
pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice out page `page` (1-based)
pub fn paginate<T>(items: &[T], page_size: NonZeroUsize, page: usize) -> Page<'_, T> {
    let size = page_size.get();
    let total = total_pages(items.len(), page_size);

    let slice = match page.checked_sub(1).and_then(|p| p.checked_mul(size)) {
        Some(start) if start < items.len() => {
            let end = start.saturating_add(size).min(items.len());
            &items[start..end]
        }
        _ => &items[..0],
    };

    Page {
        items: slice,
        number: page,
        total_pages: total,
        total_items: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_total_pages_minimum_one() {
        assert_eq!(total_pages(0, size(10)), 1);
        assert_eq!(total_pages(1, size(10)), 1);
        assert_eq!(total_pages(10, size(10)), 1);
        assert_eq!(total_pages(11, size(10)), 2);
        assert_eq!(total_pages(7, size(3)), 3);
    }

    #[test]
    fn test_total_pages_matches_formula() {
        for len in 0..40usize {
            for p in 1..12usize {
                let expected = std::cmp::max(1, (len + p - 1) / p);
                assert_eq!(total_pages(len, size(p)), expected, "len={} p={}", len, p);
            }
        }
    }

    #[test]
    fn test_slices_follow_original_order() {
        let items: Vec<u32> = (1..=23).collect();
        for n in 1..=3usize {
            let page = paginate(&items, size(10), n);
            let start = (n - 1) * 10;
            let end = (n * 10).min(items.len());
            assert_eq!(page.items, &items[start..end]);
            assert_eq!(page.total_pages, 3);
            assert_eq!(page.total_items, 23);
        }
    }

    #[test]
    fn test_out_of_range_page_is_empty_not_clamped() {
        let items = [1, 2, 3];
        let page = paginate(&items, size(2), 5);
        assert!(page.items.is_empty());
        assert_eq!(page.number, 5);

        let page = paginate(&items, size(2), 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let items: [u8; 0] = [];
        let page = paginate(&items, size(10), 1);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
        assert!(!page.has_prev());
        assert_eq!(page.first_item(size(10)), 0);
    }

    #[test]
    fn test_navigation_flags() {
        let items: Vec<u32> = (0..25).collect();
        let page = paginate(&items, size(10), 2);
        assert!(page.has_prev());
        assert!(page.has_next());
        assert_eq!(page.first_item(size(10)), 11);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(4, 0), 1);
    }
}
