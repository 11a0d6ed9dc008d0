//! Occupancy Index: uniform grid over the placement bounds.
//!
//! Each grid cell lists the placed shapes whose extent touches it. A query
//! only looks at shapes registered in the cells its own extent covers, so
//! the cost of `test` follows local density instead of the total number of
//! placed words.
//!
//! Exact checks:
//! - bbox mode: collider rectangle vs collider rectangle
//! - mask mode: prefilter on the cell-aligned mask extent, then cell-by-cell
//!   mask overlap

use crate::layout::geometry::{Point, Rect};
use crate::layout::shape::{Mask, Shape};

const GRID_DIVISIONS: f64 = 32.0;
const MIN_GRID_CELL_PX: f64 = 8.0;
const MAX_GRID_CELL_PX: f64 = 128.0;

struct Occupant {
    /// Collider in bbox mode, cell-aligned mask rectangle in mask mode.
    extent: Rect,
    /// Mask plus the absolute cell of its anchor.
    mask: Option<(Mask, i64, i64)>,
}

pub struct OccupancyIndex {
    bounds: Rect,
    cell: f64,
    cols: usize,
    rows: usize,
    grid: Vec<Vec<u32>>,
    occupants: Vec<Occupant>,
    mask_cell_px: f64,
    /// Point the mask cell lattice is aligned to (the spiral origin).
    lattice_origin: Point,
    /// Last query epoch that visited each occupant; dedups multi-cell hits.
    seen: Vec<u32>,
    epoch: u32,
}

impl OccupancyIndex {
    pub fn new(bounds: Rect, mask_cell_px: f64, lattice_origin: Point) -> Self {
        let cell = (bounds.width().max(bounds.height()) / GRID_DIVISIONS)
            .clamp(MIN_GRID_CELL_PX, MAX_GRID_CELL_PX);
        let cols = ((bounds.width() / cell).ceil() as usize).max(1);
        let rows = ((bounds.height() / cell).ceil() as usize).max(1);
        Self {
            bounds,
            cell,
            cols,
            rows,
            grid: vec![Vec::new(); cols * rows],
            occupants: Vec::new(),
            mask_cell_px,
            lattice_origin,
            seen: Vec::new(),
            epoch: 0,
        }
    }

    /// Returns true when `shape` anchored at `anchor` overlaps any placed shape.
    pub fn test(&mut self, shape: &Shape, anchor: Point) -> bool {
        let anchor_cell = self.anchor_cell(anchor);
        let extent = self.extent(shape, anchor, anchor_cell);
        let Some((c_lo, c_hi, r_lo, r_hi)) = self.cell_range(&extent) else {
            return false;
        };
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.seen.iter_mut().for_each(|s| *s = 0);
            self.epoch = 1;
        }

        for r in r_lo..=r_hi {
            for c in c_lo..=c_hi {
                for &id in &self.grid[r * self.cols + c] {
                    let id = id as usize;
                    if self.seen[id] == self.epoch {
                        continue;
                    }
                    self.seen[id] = self.epoch;
                    let other = &self.occupants[id];
                    if !other.extent.intersects(&extent) {
                        continue;
                    }
                    let hit = match (&shape.mask, &other.mask) {
                        (Some(mask), Some((other_mask, oc, or))) => masks_overlap(
                            mask,
                            anchor_cell.0,
                            anchor_cell.1,
                            other_mask,
                            *oc,
                            *or,
                        ),
                        _ => true,
                    };
                    if hit {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Registers a committed shape in every grid cell its extent touches.
    pub fn insert(&mut self, shape: Shape, anchor: Point) {
        let anchor_cell = self.anchor_cell(anchor);
        let extent = self.extent(&shape, anchor, anchor_cell);
        let id = self.occupants.len() as u32;
        if let Some((c_lo, c_hi, r_lo, r_hi)) = self.cell_range(&extent) {
            for r in r_lo..=r_hi {
                for c in c_lo..=c_hi {
                    self.grid[r * self.cols + c].push(id);
                }
            }
        }
        let (ac, ar) = anchor_cell;
        self.occupants.push(Occupant {
            extent,
            mask: shape.mask.map(|m| (m, ac, ar)),
        });
        self.seen.push(0);
    }

    /// Absolute rectangle a shape can possibly occupy at `anchor`.
    fn extent(&self, shape: &Shape, anchor: Point, anchor_cell: (i64, i64)) -> Rect {
        match &shape.mask {
            Some(mask) => {
                let c = self.mask_cell_px;
                let x0 = self.lattice_origin.x + (anchor_cell.0 + mask.col0) as f64 * c;
                let y0 = self.lattice_origin.y + (anchor_cell.1 + mask.row0) as f64 * c;
                Rect::new(x0, y0, x0 + mask.cols as f64 * c, y0 + mask.rows as f64 * c)
            }
            None => shape.collider.translate(anchor.x, anchor.y),
        }
    }

    fn anchor_cell(&self, anchor: Point) -> (i64, i64) {
        (
            ((anchor.x - self.lattice_origin.x) / self.mask_cell_px).round() as i64,
            ((anchor.y - self.lattice_origin.y) / self.mask_cell_px).round() as i64,
        )
    }

    /// Inclusive grid cell range covered by `rect`, or `None` if it misses the grid.
    fn cell_range(&self, rect: &Rect) -> Option<(usize, usize, usize, usize)> {
        if !rect.intersects(&self.bounds) {
            return None;
        }
        let to_col = |x: f64| {
            (((x - self.bounds.min_x) / self.cell).floor().max(0.0) as usize).min(self.cols - 1)
        };
        let to_row = |y: f64| {
            (((y - self.bounds.min_y) / self.cell).floor().max(0.0) as usize).min(self.rows - 1)
        };
        Some((
            to_col(rect.min_x),
            to_col(rect.max_x),
            to_row(rect.min_y),
            to_row(rect.max_y),
        ))
    }
}

/// Cell-level overlap of two masks placed at absolute anchor cells.
fn masks_overlap(a: &Mask, a_col: i64, a_row: i64, b: &Mask, b_col: i64, b_row: i64) -> bool {
    let a_x0 = a_col + a.col0;
    let a_y0 = a_row + a.row0;
    let b_x0 = b_col + b.col0;
    let b_y0 = b_row + b.row0;
    let x_lo = a_x0.max(b_x0);
    let x_hi = (a_x0 + a.cols as i64).min(b_x0 + b.cols as i64);
    let y_lo = a_y0.max(b_y0);
    let y_hi = (a_y0 + a.rows as i64).min(b_y0 + b.rows as i64);

    for y in y_lo..y_hi {
        for x in x_lo..x_hi {
            if a.get((x - a_x0) as usize, (y - a_y0) as usize)
                && b.get((x - b_x0) as usize, (y - b_y0) as usize)
            {
                return true;
            }
        }
    }
    false
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
