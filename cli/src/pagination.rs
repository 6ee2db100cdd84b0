//! Page arithmetic shared by both list views.
//!
//! Pages are 1-based everywhere. A collection with no items has zero pages.

use std::ops::RangeInclusive;

/// `ceil(total_count / limit)`, or 0 for an empty collection.
pub fn total_pages(total_count: u64, limit: u32) -> u32 {
    if total_count == 0 || limit == 0 {
        return 0;
    }
    u32::try_from(total_count.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
}

/// Half-open `[start, end)` indices of `page` in the full collection.
pub fn slice_bounds(page: u32, limit: u32) -> (usize, usize) {
    let start = page.saturating_sub(1) as usize * limit as usize;
    (start, start + limit as usize)
}

/// Offset sent to APIs that paginate with `limit`/`skip`.
pub fn skip_for(page: u32, limit: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(limit)
}

/// The block of page buttons to draw, plus the state of the arrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: u32,
    pub end: u32,
    pub current: u32,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl PageWindow {
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

/// Centered window of at most `max_buttons` pages around `current`.
///
/// Returns `None` when there is nothing to navigate (one page or fewer).
pub fn visible_pages(current: u32, total: u32, max_buttons: u32) -> Option<PageWindow> {
    if total <= 1 {
        return None;
    }

    let window = max_buttons.clamp(1, total);
    let anchor = current.clamp(1, total);
    let mut start = anchor.saturating_sub(window / 2).max(1);
    let mut end = start.saturating_add(window - 1);

    if end > total {
        end = total;
        start = (end + 1).saturating_sub(window).max(1);
    }

    Some(PageWindow {
        start,
        end,
        current,
        prev_disabled: current == 1,
        next_disabled: current == total,
    })
}

/// Page to load after a navigation click, if the click should do anything.
///
/// Clicking the current page or outside `[1, total]` is ignored.
pub fn navigate(current: u32, total: u32, requested: u32) -> Option<u32> {
    if requested == current || requested < 1 || requested > total {
        return None;
    }
    Some(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(254, 10), 26);
    }

    #[test]
    fn total_pages_matches_definition() {
        for total_count in 0..200u64 {
            for limit in 1..15u32 {
                let expected = if total_count > 0 {
                    (total_count as f64 / limit as f64).ceil() as u32
                } else {
                    0
                };
                assert_eq!(total_pages(total_count, limit), expected, "{total_count}/{limit}");
            }
        }
    }

    #[test]
    fn slice_bounds_never_exceed_limit() {
        for limit in 1..12u32 {
            for page in 1..20u32 {
                let (start, end) = slice_bounds(page, limit);
                assert_eq!(start, (page as usize - 1) * limit as usize);
                assert_eq!(end - start, limit as usize);
            }
        }
        assert_eq!(slice_bounds(3, 10), (20, 30));
        assert_eq!(skip_for(3, 10), 20);
    }

    #[test]
    fn no_navigation_for_single_page() {
        assert_eq!(visible_pages(1, 0, 5), None);
        assert_eq!(visible_pages(1, 1, 5), None);
    }

    #[test]
    fn window_is_centered_and_clamped() {
        let w = visible_pages(1, 10, 5).unwrap();
        assert_eq!(w.pages(), 1..=5);
        assert!(w.prev_disabled);
        assert!(!w.next_disabled);

        let w = visible_pages(6, 10, 5).unwrap();
        assert_eq!(w.pages(), 4..=8);

        let w = visible_pages(10, 10, 5).unwrap();
        assert_eq!(w.pages(), 6..=10);
        assert!(w.next_disabled);

        let w = visible_pages(2, 3, 5).unwrap();
        assert_eq!(w.pages(), 1..=3);
    }

    #[test]
    fn window_stays_in_range_for_every_position() {
        for total in 2..30u32 {
            for max_buttons in 1..9u32 {
                for current in 1..=total {
                    let w = visible_pages(current, total, max_buttons).unwrap();
                    assert!(w.start >= 1);
                    assert!(w.end <= total);
                    assert_eq!(w.pages().count(), max_buttons.min(total) as usize);
                    assert!(w.pages().contains(&current));
                    assert_eq!(w.prev_disabled, current == 1);
                    assert_eq!(w.next_disabled, current == total);
                }
            }
        }
    }

    #[test]
    fn window_near_the_top_of_the_range() {
        let w = visible_pages(u32::MAX, u32::MAX, 5).unwrap();
        assert_eq!(w.pages(), u32::MAX - 4..=u32::MAX);
        assert!(w.next_disabled);

        let w = visible_pages(u32::MAX - 1, u32::MAX, 5).unwrap();
        assert_eq!(w.end, u32::MAX);

        // Past the last page: the window sits at the end.
        let w = visible_pages(40, 10, 5).unwrap();
        assert_eq!(w.pages(), 6..=10);
    }

    #[test]
    fn navigate_ignores_noop_clicks() {
        assert_eq!(navigate(2, 3, 2), None);
        assert_eq!(navigate(2, 3, 0), None);
        assert_eq!(navigate(2, 3, 4), None);
        assert_eq!(navigate(2, 3, 3), Some(3));
    }
}
