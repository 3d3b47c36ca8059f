/// Geometry for opening a hover bubble next to the pointer.
///
/// Tiles sit on a square grid. The bubble opens flush with the far edge of
/// the grid cell to the right of the pointer plus a side margin; when that
/// would overflow the window it opens to the left of the pointer's cell
/// instead. Vertically it is centered on the pointer using the bubble's
/// *width* as the offset, then kept inside the window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlacementRules {
    pub grid_px: f64,
    pub side_margin_px: f64,
    pub edge_margin_px: f64,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            grid_px: 200.0,
            side_margin_px: 100.0,
            edge_margin_px: 50.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
}

pub fn place_bubble(
    page_x: f64,
    page_y: f64,
    bubble: Size,
    window: Size,
    rules: PlacementRules,
) -> Placement {
    let cell_offset = page_x % rules.grid_px;
    let ox = rules.grid_px - cell_offset + rules.side_margin_px;

    let left = if page_x + ox + bubble.width < window.width {
        page_x + ox
    } else {
        let x = page_x - cell_offset - rules.side_margin_px - bubble.width;
        if x < 0.0 { rules.edge_margin_px } else { x }
    };

    let mut top = page_y - (bubble.width / 2.0).trunc();
    if top + bubble.height > window.height {
        top = window.height - bubble.height - rules.edge_margin_px;
    }
    if top < 0.0 {
        top = rules.edge_margin_px;
    }

    Placement { left, top }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(x: f64, y: f64, bw: f64, bh: f64, ww: f64, wh: f64) -> Placement {
        place_bubble(
            x,
            y,
            Size::new(bw, bh),
            Size::new(ww, wh),
            PlacementRules::default(),
        )
    }

    #[test]
    fn opens_right_of_pointer_cell() {
        let p = place(250.0, 300.0, 400.0, 300.0, 1200.0, 800.0);
        assert_eq!(p, Placement { left: 500.0, top: 100.0 });
    }

    #[test]
    fn flips_left_when_right_side_overflows() {
        let p = place(1050.0, 750.0, 400.0, 300.0, 1200.0, 800.0);
        assert_eq!(p.left, 500.0);
        // Centered top (550) would overflow the bottom edge.
        assert_eq!(p.top, 450.0);
    }

    #[test]
    fn clamps_negative_left_and_top() {
        let p = place(150.0, 100.0, 400.0, 300.0, 500.0, 800.0);
        assert_eq!(p, Placement { left: 50.0, top: 50.0 });
    }

    #[test]
    fn vertical_centering_uses_width_truncated() {
        let p = place(0.0, 400.0, 301.0, 10.0, 2000.0, 2000.0);
        assert_eq!(p.top, 250.0);
        assert_eq!(p.left, 300.0);
    }
}
