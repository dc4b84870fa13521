use crate::error::{Error, Result};
use crate::types::{FreeRect, PlacedPanel, StockConfig, UnitPanel};

/// Ceiling on free rectangles tracked per sheet. Pathological inputs fail
/// fast instead of letting the bookkeeping list grow without bound.
pub const MAX_FREE_RECTS: usize = 10_000;

/// One opened stock sheet with live free-space bookkeeping.
///
/// Invariants held after every placement:
/// - `used_area + wasted_area() == stock.area()`
/// - no free rectangle is fully contained in another (subsumption pruning)
#[derive(Debug, Clone)]
pub struct Sheet {
    pub id: u32,
    pub stock: StockConfig,
    pub placements: Vec<PlacedPanel>,
    pub free_rects: Vec<FreeRect>,
    pub used_area: u64,
}

/// A free rectangle that accepts a panel, and in which orientation.
#[derive(Debug, Clone, Copy)]
pub struct Fit {
    pub free_idx: usize,
    pub rotated: bool,
}

impl Sheet {
    pub fn new(id: u32, stock: StockConfig) -> Self {
        Self {
            id,
            stock,
            placements: Vec::new(),
            free_rects: vec![FreeRect {
                x: 0,
                y: 0,
                width: stock.stock_width,
                length: stock.stock_length,
            }],
            used_area: 0,
        }
    }

    pub fn wasted_area(&self) -> u64 {
        self.stock.area() - self.used_area
    }

    pub fn efficiency(&self) -> u32 {
        let total = self.stock.area();
        if total == 0 {
            return 0;
        }
        (self.used_area as f64 / total as f64 * 100.0).round() as u32
    }

    /// First-fit scan: the first free rectangle in list order that takes the
    /// panel un-rotated wins. Rotation is tried on the same rectangle only
    /// when the un-rotated orientation fails and the panel is not square.
    pub fn find_fit(&self, panel: &UnitPanel) -> Option<Fit> {
        let kerf = self.stock.kerf;
        for (idx, free) in self.free_rects.iter().enumerate() {
            if fits(panel.width, panel.length, free, kerf) {
                return Some(Fit {
                    free_idx: idx,
                    rotated: false,
                });
            }
            if panel.width != panel.length && fits(panel.length, panel.width, free, kerf) {
                return Some(Fit {
                    free_idx: idx,
                    rotated: true,
                });
            }
        }
        None
    }

    /// Consume the chosen free rectangle, split it guillotine-style and
    /// record the placement.
    pub fn place(&mut self, fit: Fit, panel: &UnitPanel) -> Result<PlacedPanel> {
        let free = self.free_rects.remove(fit.free_idx);
        let (w, l) = if fit.rotated {
            (panel.length, panel.width)
        } else {
            (panel.width, panel.length)
        };
        let kerf = self.stock.kerf;

        // Remainder right of the panel spans the full free length; the
        // remainder above keeps the panel's width plus kerf.
        let right_width = free.width - w - kerf;
        if right_width > 0 {
            self.free_rects.push(FreeRect {
                x: free.x + w + kerf,
                y: free.y,
                width: right_width,
                length: free.length,
            });
        }
        let top_length = free.length - l - kerf;
        if top_length > 0 {
            self.free_rects.push(FreeRect {
                x: free.x,
                y: free.y + l + kerf,
                width: w + kerf,
                length: top_length,
            });
        }
        self.prune_free_rects();
        if self.free_rects.len() > MAX_FREE_RECTS {
            return Err(Error::FreeRectOverflow {
                sheet: self.id,
                limit: MAX_FREE_RECTS,
            });
        }

        let placed = PlacedPanel {
            x: free.x,
            y: free.y,
            width: w,
            length: l,
            rotated: fit.rotated,
            label: panel.label.clone(),
            ordered_width: panel.ordered_width,
            ordered_drop: panel.ordered_drop,
            reference: panel.reference.clone(),
        };
        self.used_area += placed.area();
        self.placements.push(placed.clone());
        Ok(placed)
    }

    /// Subsumption pruning: drop any free rectangle fully contained in
    /// another. Adjacent rectangles are never fused; fragmentation is an
    /// accepted tradeoff.
    fn prune_free_rects(&mut self) {
        let mut i = 0;
        while i < self.free_rects.len() {
            let contained = (0..self.free_rects.len())
                .any(|j| j != i && self.free_rects[j].contains(&self.free_rects[i]));
            if contained {
                self.free_rects.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

fn fits(width: u32, length: u32, free: &FreeRect, kerf: u32) -> bool {
    width + kerf <= free.width && length + kerf <= free.length
}
