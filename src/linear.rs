use std::collections::BTreeMap;

use crate::types::{BarAggregation, BarGroup, BarItem};

/// Supplier length of one bottom-rail bar, millimetres. A physical constant
/// of the stock, not caller-configurable.
pub const BAR_STOCK_LENGTH: u32 = 5800;

/// Flat cutting-loss buffer applied to every group, even exact multiples of
/// the stock length.
pub const WASTAGE_RATE: f64 = 0.10;

/// LinearStockAggregator: one [`BarGroup`] per distinct (type, colour) pair,
/// in sorted key order, plus a grand total of stock pieces to deduct.
pub fn aggregate_bars(items: &[BarItem]) -> BarAggregation {
    let mut by_key: BTreeMap<(String, String), Vec<BarItem>> = BTreeMap::new();
    for item in items {
        by_key
            .entry((item.bar_type.clone(), item.bar_colour.clone()))
            .or_default()
            .push(item.clone());
    }

    let mut groups = Vec::with_capacity(by_key.len());
    for ((bar_type, bar_colour), items) in by_key {
        let total_width: u64 = items.iter().map(|i| i.original_width as u64).sum();
        if total_width == 0 {
            continue;
        }
        let base_quantity = total_width as f64 / BAR_STOCK_LENGTH as f64;
        let wastage = base_quantity * WASTAGE_RATE;
        let final_quantity = base_quantity + wastage;
        // Pieces come from the unrounded figure; the 3 dp rounding below is
        // for reporting only.
        let pieces_to_deduct = final_quantity.ceil() as u64;
        tracing::debug!(
            bar_type = %bar_type,
            bar_colour = %bar_colour,
            total_width,
            pieces_to_deduct,
            "bar group aggregated"
        );
        groups.push(BarGroup {
            bar_type,
            bar_colour,
            items,
            total_width,
            base_quantity: round3(base_quantity),
            wastage: round3(wastage),
            final_quantity: round3(final_quantity),
            pieces_to_deduct,
        });
    }

    let total_pieces = groups.iter().map(|g| g.pieces_to_deduct).sum();
    BarAggregation {
        groups,
        total_pieces,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
