// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay placement — converts top-left percentage coordinates into a
// rectangle in bottom-left page space.

use folio_core::PageBounds;
use serde::Serialize;

/// Where an overlay image is drawn, in points, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Place an image of `image_px` (width, height) pixels on `page`.
///
/// `x_pct`/`y_pct` locate the image's top-left corner as percentages of the
/// page measured from the page's top-left; `width_pct` is the image width as a
/// percentage of the page width. The height keeps the image's aspect ratio.
///
/// ```
/// use folio_core::PageBounds;
/// use folio_document::pdf::placement::place_overlay;
///
/// let p = place_overlay(PageBounds::sized(612.0, 792.0), 10.0, 20.0, 20.0, (100, 50));
/// assert!((p.y - 572.4).abs() < 1e-9);
/// ```
pub fn place_overlay(
    page: PageBounds,
    x_pct: f64,
    y_pct: f64,
    width_pct: f64,
    image_px: (u32, u32),
) -> Placement {
    let (px_width, px_height) = image_px;
    let width = width_pct / 100.0 * page.width;
    let height = if px_width == 0 {
        0.0
    } else {
        width * (f64::from(px_height) / f64::from(px_width))
    };
    let x = x_pct / 100.0 * page.width;
    // Flip from top-left percentages to bottom-left points; the image's
    // own height moves its lower edge down from the top edge.
    let y = page.height - y_pct / 100.0 * page.height - height;

    Placement {
        x: x + page.origin_x,
        y: y + page.origin_y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Letter page, 100×50 px image at (10%, 20%) spanning 20% of the width.
    #[test]
    fn letter_page_example() {
        let p = place_overlay(PageBounds::LETTER, 10.0, 20.0, 20.0, (100, 50));
        assert!(close(p.width, 122.4), "{p:?}");
        assert!(close(p.height, 61.2), "{p:?}");
        assert!(close(p.x, 61.2), "{p:?}");
        assert!(close(p.y, 792.0 - 158.4 - 61.2), "{p:?}");
    }

    /// An overlay at the top-left corner ends flush with the top edge.
    #[test]
    fn top_left_corner_touches_top_edge() {
        let p = place_overlay(PageBounds::LETTER, 0.0, 0.0, 50.0, (200, 100));
        assert!(close(p.x, 0.0));
        assert!(close(p.y + p.height, 792.0));
    }

    /// Moving down the page lowers the y coordinate.
    #[test]
    fn larger_y_percentage_moves_image_down() {
        let upper = place_overlay(PageBounds::LETTER, 0.0, 10.0, 10.0, (10, 10));
        let lower = place_overlay(PageBounds::LETTER, 0.0, 60.0, 10.0, (10, 10));
        assert!(lower.y < upper.y);
        assert!(close(upper.y - lower.y, 0.5 * 792.0));
    }

    /// Height follows the pixel aspect ratio, independent of page shape.
    #[test]
    fn height_keeps_aspect_ratio() {
        let p = place_overlay(PageBounds::sized(842.0, 595.0), 0.0, 0.0, 25.0, (300, 600));
        assert!(close(p.height, 2.0 * p.width));
    }

    /// A shifted media box shifts the placement by its origin.
    #[test]
    fn origin_offset_is_added() {
        let page = PageBounds {
            origin_x: 10.0,
            origin_y: 20.0,
            width: 612.0,
            height: 792.0,
        };
        let shifted = place_overlay(page, 10.0, 20.0, 20.0, (100, 50));
        let base = place_overlay(PageBounds::LETTER, 10.0, 20.0, 20.0, (100, 50));
        assert!(close(shifted.x, base.x + 10.0));
        assert!(close(shifted.y, base.y + 20.0));
        assert!(close(shifted.width, base.width));
    }
}
