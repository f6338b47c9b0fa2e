use crate::types::{Margins, Pt};

/// Where a reserved line box landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reservation {
    pub page_index: usize,
    /// Top of the reserved box, in page-local coordinates from the top edge.
    pub y: Pt,
    /// The reservation moved to a fresh page first.
    pub advanced: bool,
    /// The box is taller than the page's content area and was placed anyway.
    pub overflow: bool,
}

/// Vertical write position across pages.
///
/// The page index only grows and the offset stays inside `0..=page_height`.
/// Content is reserved whole: a box that does not fit moves to the next page,
/// and a box that cannot fit on any page is placed once at the top of a fresh
/// page so pagination always makes progress.
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    page_index: usize,
    vertical_offset: Pt,
    page_height: Pt,
    margins: Margins,
}

impl LayoutCursor {
    pub fn new(page_height: Pt, margins: Margins) -> Self {
        Self {
            page_index: 0,
            vertical_offset: margins.top.min(page_height),
            page_height,
            margins,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn vertical_offset(&self) -> Pt {
        self.vertical_offset
    }

    pub fn page_height(&self) -> Pt {
        self.page_height
    }

    pub fn content_bottom(&self) -> Pt {
        self.page_height - self.margins.bottom
    }

    pub fn content_height(&self) -> Pt {
        (self.content_bottom() - self.margins.top).max(Pt::ZERO)
    }

    pub fn remaining_height(&self) -> Pt {
        (self.content_bottom() - self.vertical_offset).max(Pt::ZERO)
    }

    /// Nothing has been placed on the current page yet.
    pub fn is_fresh(&self) -> bool {
        self.vertical_offset <= self.margins.top
    }

    pub fn reserve(&mut self, height: Pt) -> Reservation {
        let height = height.max(Pt::ZERO);
        let mut advanced = false;
        if !self.is_fresh() && self.vertical_offset + height > self.content_bottom() {
            self.advance();
            advanced = true;
        }
        let y = self.vertical_offset;
        let overflow = y + height > self.content_bottom();
        self.vertical_offset = (y + height).min(self.page_height);
        Reservation {
            page_index: self.page_index,
            y,
            advanced,
            overflow,
        }
    }

    /// Inter-block spacing. Swallowed at the top of a fresh page and never a
    /// page break on its own.
    pub fn skip(&mut self, gap: Pt) {
        if self.is_fresh() || gap <= Pt::ZERO {
            return;
        }
        self.vertical_offset = (self.vertical_offset + gap).min(self.page_height);
    }

    pub fn force_new_page(&mut self) {
        self.advance();
    }

    fn advance(&mut self) {
        self.page_index += 1;
        self.vertical_offset = self.margins.top.min(self.page_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> LayoutCursor {
        // 100pt content area.
        LayoutCursor::new(Pt::from_i32(140), Margins::all(20.0))
    }

    #[test]
    fn reserve_moves_down_then_breaks() {
        let mut cursor = cursor();
        let first = cursor.reserve(Pt::from_i32(60));
        assert_eq!(first.page_index, 0);
        assert_eq!(first.y, Pt::from_i32(20));
        assert!(!first.advanced);

        let second = cursor.reserve(Pt::from_i32(40));
        assert_eq!(second.page_index, 0);
        assert_eq!(second.y, Pt::from_i32(80));

        let third = cursor.reserve(Pt::from_i32(1));
        assert!(third.advanced);
        assert_eq!(third.page_index, 1);
        assert_eq!(third.y, Pt::from_i32(20));
    }

    #[test]
    fn tall_box_overflows_once_on_fresh_page() {
        let mut cursor = cursor();
        cursor.reserve(Pt::from_i32(10));
        let tall = cursor.reserve(Pt::from_i32(500));
        assert!(tall.advanced);
        assert!(tall.overflow);
        assert_eq!(tall.page_index, 1);
        assert_eq!(cursor.vertical_offset(), Pt::from_i32(140));

        let next = cursor.reserve(Pt::from_i32(10));
        assert_eq!(next.page_index, 2);
        assert!(!next.overflow);
    }

    #[test]
    fn skip_is_swallowed_on_fresh_page() {
        let mut cursor = cursor();
        cursor.skip(Pt::from_i32(12));
        assert!(cursor.is_fresh());

        cursor.reserve(Pt::from_i32(95));
        cursor.skip(Pt::from_i32(50));
        assert_eq!(cursor.page_index(), 0);
        assert_eq!(cursor.vertical_offset(), Pt::from_i32(140));
        assert_eq!(cursor.reserve(Pt::from_i32(1)).page_index, 1);
    }

    #[test]
    fn pagination_invariant_holds_for_mixed_heights() {
        let mut cursor = cursor();
        let mut last_page = 0;
        for step in 0..200 {
            let height = Pt::from_i32(3 + (step * 7) % 45);
            let placed = cursor.reserve(height);
            assert!(placed.page_index >= last_page);
            assert!(placed.y + height <= cursor.content_bottom());
            assert!(cursor.vertical_offset() <= cursor.page_height());
            assert!(cursor.vertical_offset() >= Pt::ZERO);
            last_page = placed.page_index;
            if step % 5 == 0 {
                cursor.skip(Pt::from_i32(6));
            }
        }
        assert!(last_page > 0);
    }

    #[test]
    fn force_new_page_always_advances() {
        let mut cursor = cursor();
        cursor.force_new_page();
        cursor.force_new_page();
        assert_eq!(cursor.page_index(), 2);
        assert!(cursor.is_fresh());
    }
}
