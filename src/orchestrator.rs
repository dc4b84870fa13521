use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::linear::aggregate_bars;
use crate::solver::SheetPacker;
use crate::types::{
    BarItem, Category, FabricGroupResult, FabricKey, GroupResult, InventoryRequirement,
    ItemAvailability, OptimizationResult, OrderLine, PanelRequest, StockConfig,
    RESULT_SCHEMA_VERSION,
};

/// Fixed usable width of fabric roll stock, millimetres.
pub const FABRIC_STOCK_WIDTH: u32 = 3000;

/// Hard cap on the per-group stock length, regardless of roll length on hand.
pub const MAX_STOCK_LENGTH: u32 = 10_000;

/// Roll-length lookup keyed by fabric identity. Backed by the inventory
/// system; a missing record is the collaborator's error to surface.
#[allow(async_fn_in_trait)]
pub trait RollInventory {
    async fn roll_length(&self, fabric: &FabricKey) -> Result<u32>;
}

/// External stock-availability checker. Read-only consumer of the
/// requirement list.
#[allow(async_fn_in_trait)]
pub trait AvailabilityChecker {
    async fn check(&self, requirements: &[InventoryRequirement]) -> Vec<ItemAvailability>;
}

/// Policy constants applied to ordered dimensions before packing. These come
/// from the fabrication process (hem and tube allowances), not from the
/// packing algorithm.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FabricationPolicy {
    /// Subtracted from the ordered width.
    #[serde(default)]
    pub width_deduction: u32,
    /// Added to the ordered drop.
    #[serde(default)]
    pub drop_allowance: u32,
}

impl FabricationPolicy {
    /// Fabrication dimensions for one order line, ordered dimensions retained
    /// for downstream reporting.
    pub fn panel_request(&self, line: &OrderLine) -> PanelRequest {
        PanelRequest {
            width: line.width.saturating_sub(self.width_deduction),
            length: line.drop + self.drop_allowance,
            quantity: line.quantity,
            label: line.location.clone(),
            ordered_width: Some(line.width),
            ordered_drop: Some(line.drop),
            reference: line.reference.clone(),
        }
    }
}

/// Runs the full optimization for one order: fabric groups through the sheet
/// packer, bars through the linear aggregator, and the combined requirement
/// list through the availability checker.
///
/// All mutable state is local to one `optimize` call; the orchestrator itself
/// is reusable across orders and runs.
pub struct Orchestrator<R, C> {
    inventory: R,
    checker: C,
    policy: FabricationPolicy,
}

impl<R: RollInventory, C: AvailabilityChecker> Orchestrator<R, C> {
    pub fn new(inventory: R, checker: C, policy: FabricationPolicy) -> Self {
        Self {
            inventory,
            checker,
            policy,
        }
    }

    pub async fn optimize(&self, order: &[OrderLine]) -> Result<OptimizationResult> {
        let mut fabric_groups: BTreeMap<FabricKey, Vec<&OrderLine>> = BTreeMap::new();
        for line in order {
            if let Some(fabric) = &line.fabric {
                fabric_groups.entry(fabric.clone()).or_default().push(line);
            }
        }

        let mut groups = Vec::new();
        let mut requirements = Vec::new();

        for (fabric, lines) in fabric_groups {
            let available = self.inventory.roll_length(&fabric).await?;
            let stock = StockConfig::new(
                FABRIC_STOCK_WIDTH,
                available.min(MAX_STOCK_LENGTH),
                0,
            );
            let requests: Vec<PanelRequest> =
                lines.iter().map(|l| self.policy.panel_request(l)).collect();
            let result = SheetPacker::new(stock, requests).pack()?;
            tracing::info!(
                fabric = %fabric,
                sheets = result.sheets.len(),
                cuts = result.statistics.total_cuts,
                panels = result.statistics.total_panels,
                "fabric group packed"
            );
            requirements.push(InventoryRequirement {
                category: Category::Fabric,
                item_key: fabric.to_string(),
                quantity_needed: result.statistics.total_fabric_needed,
            });
            groups.push(GroupResult::Fabric(FabricGroupResult {
                fabric,
                stock,
                result,
            }));
        }

        // One aggregation across all bar-bearing lines, regardless of fabric
        // grouping. Quantity-bearing lines contribute one bar per unit.
        let mut bar_items = Vec::new();
        for line in order {
            if let Some(bar) = &line.bar {
                for _ in 0..line.quantity {
                    bar_items.push(BarItem {
                        location: line.location.clone(),
                        original_width: line.width,
                        bar_type: bar.bar_type.clone(),
                        bar_colour: bar.bar_colour.clone(),
                        reference: line.reference.clone(),
                    });
                }
            }
        }
        let bars = aggregate_bars(&bar_items);
        for group in &bars.groups {
            requirements.push(InventoryRequirement {
                category: Category::Bar,
                item_key: format!("{}/{}", group.bar_type, group.bar_colour),
                quantity_needed: group.pieces_to_deduct,
            });
        }

        let availability = self.checker.check(&requirements).await;
        groups.extend(bars.groups.into_iter().map(GroupResult::Bar));

        Ok(OptimizationResult {
            schema_version: RESULT_SCHEMA_VERSION,
            groups,
            total_bar_pieces: bars.total_pieces,
            requirements,
            availability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::BarSpec;
    use std::collections::HashMap;

    struct FixedRolls(HashMap<String, u32>);

    impl RollInventory for FixedRolls {
        async fn roll_length(&self, fabric: &FabricKey) -> Result<u32> {
            self.0
                .get(&fabric.to_string())
                .copied()
                .ok_or_else(|| Error::MissingRoll(fabric.to_string()))
        }
    }

    struct FixedStock(HashMap<String, u64>);

    impl AvailabilityChecker for FixedStock {
        async fn check(&self, requirements: &[InventoryRequirement]) -> Vec<ItemAvailability> {
            requirements
                .iter()
                .map(|r| ItemAvailability {
                    category: r.category,
                    item_key: r.item_key.clone(),
                    quantity_needed: r.quantity_needed,
                    sufficient: self.0.get(&r.item_key).copied().unwrap_or(0)
                        >= r.quantity_needed,
                })
                .collect()
        }
    }

    fn fabric(material: &str, fabric_type: &str, colour: &str) -> FabricKey {
        FabricKey {
            material: material.to_string(),
            fabric_type: fabric_type.to_string(),
            colour: colour.to_string(),
        }
    }

    fn line(location: &str, width: u32, drop: u32, fab: Option<FabricKey>) -> OrderLine {
        OrderLine {
            location: location.to_string(),
            width,
            drop,
            quantity: 1,
            fabric: fab,
            bar: Some(BarSpec {
                bar_type: "std".to_string(),
                bar_colour: "white".to_string(),
            }),
            reference: Some(format!("ref-{location}")),
        }
    }

    fn orchestrator(
        rolls: &[(&str, u32)],
        stock: &[(&str, u64)],
        policy: FabricationPolicy,
    ) -> Orchestrator<FixedRolls, FixedStock> {
        Orchestrator::new(
            FixedRolls(
                rolls
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
            ),
            FixedStock(
                stock
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
            ),
            policy,
        )
    }

    #[tokio::test]
    async fn test_lines_grouped_by_fabric_identity() {
        let orch = orchestrator(
            &[("poly/blackout/grey", 8000), ("poly/sheer/white", 8000)],
            &[],
            FabricationPolicy::default(),
        );
        let order = vec![
            line("kitchen", 1200, 1500, Some(fabric("poly", "blackout", "grey"))),
            line("bedroom", 900, 1400, Some(fabric("poly", "sheer", "white"))),
            line("lounge", 1100, 1600, Some(fabric("poly", "blackout", "grey"))),
        ];
        let result = orch.optimize(&order).await.unwrap();

        let fabric_groups: Vec<&FabricGroupResult> = result
            .groups
            .iter()
            .filter_map(|g| match g {
                GroupResult::Fabric(f) => Some(f),
                GroupResult::Bar(_) => None,
            })
            .collect();
        assert_eq!(fabric_groups.len(), 2);
        let blackout = fabric_groups
            .iter()
            .find(|g| g.fabric.fabric_type == "blackout")
            .unwrap();
        assert_eq!(blackout.result.statistics.total_panels, 2);
    }

    #[tokio::test]
    async fn test_stock_length_capped() {
        let orch = orchestrator(
            &[("poly/blackout/grey", 25_000)],
            &[],
            FabricationPolicy::default(),
        );
        let order = vec![line(
            "kitchen",
            1200,
            1500,
            Some(fabric("poly", "blackout", "grey")),
        )];
        let result = orch.optimize(&order).await.unwrap();
        let GroupResult::Fabric(group) = &result.groups[0] else {
            panic!("expected fabric group first");
        };
        assert_eq!(group.stock.stock_length, MAX_STOCK_LENGTH);
        assert_eq!(group.stock.stock_width, FABRIC_STOCK_WIDTH);
    }

    #[tokio::test]
    async fn test_short_roll_used_as_is() {
        let orch = orchestrator(
            &[("poly/blackout/grey", 4200)],
            &[],
            FabricationPolicy::default(),
        );
        let order = vec![line(
            "kitchen",
            1200,
            1500,
            Some(fabric("poly", "blackout", "grey")),
        )];
        let result = orch.optimize(&order).await.unwrap();
        let GroupResult::Fabric(group) = &result.groups[0] else {
            panic!("expected fabric group first");
        };
        assert_eq!(group.stock.stock_length, 4200);
    }

    #[tokio::test]
    async fn test_fabrication_policy_applied_and_ordered_dims_retained() {
        let orch = orchestrator(
            &[("poly/blackout/grey", 8000)],
            &[],
            FabricationPolicy {
                width_deduction: 30,
                drop_allowance: 200,
            },
        );
        let order = vec![line(
            "kitchen",
            1200,
            1500,
            Some(fabric("poly", "blackout", "grey")),
        )];
        let result = orch.optimize(&order).await.unwrap();
        let GroupResult::Fabric(group) = &result.groups[0] else {
            panic!("expected fabric group first");
        };
        let placed = &group.result.sheets[0].placements[0];
        assert_eq!((placed.width, placed.length), (1170, 1700));
        assert_eq!(placed.ordered_width, Some(1200));
        assert_eq!(placed.ordered_drop, Some(1500));
        assert_eq!(placed.reference.as_deref(), Some("ref-kitchen"));
    }

    #[tokio::test]
    async fn test_bars_aggregated_across_fabric_groups() {
        let orch = orchestrator(
            &[("poly/blackout/grey", 8000), ("poly/sheer/white", 8000)],
            &[],
            FabricationPolicy::default(),
        );
        let order = vec![
            line("kitchen", 1500, 1500, Some(fabric("poly", "blackout", "grey"))),
            line("bedroom", 2200, 1400, Some(fabric("poly", "sheer", "white"))),
        ];
        let result = orch.optimize(&order).await.unwrap();
        // 1500 + 2200 = 3700 across both fabric groups: one bar group, one piece.
        let bar_groups: Vec<_> = result
            .groups
            .iter()
            .filter_map(|g| match g {
                GroupResult::Bar(b) => Some(b),
                GroupResult::Fabric(_) => None,
            })
            .collect();
        assert_eq!(bar_groups.len(), 1);
        assert_eq!(bar_groups[0].total_width, 3700);
        assert_eq!(bar_groups[0].pieces_to_deduct, 1);
        assert_eq!(result.total_bar_pieces, 1);
    }

    #[tokio::test]
    async fn test_requirements_cover_fabric_and_bars() {
        let orch = orchestrator(
            &[("poly/blackout/grey", 8000)],
            &[("poly/blackout/grey", 8000), ("std/white", 1)],
            FabricationPolicy::default(),
        );
        let order = vec![line(
            "kitchen",
            1200,
            1500,
            Some(fabric("poly", "blackout", "grey")),
        )];
        let result = orch.optimize(&order).await.unwrap();

        assert_eq!(result.schema_version, RESULT_SCHEMA_VERSION);
        assert_eq!(result.requirements.len(), 2);
        let fab_req = result
            .requirements
            .iter()
            .find(|r| r.category == Category::Fabric)
            .unwrap();
        // One sheet of the 8000 mm roll.
        assert_eq!(fab_req.quantity_needed, 8000);
        let bar_req = result
            .requirements
            .iter()
            .find(|r| r.category == Category::Bar)
            .unwrap();
        assert_eq!(bar_req.item_key, "std/white");
        assert_eq!(bar_req.quantity_needed, 1);

        assert_eq!(result.availability.len(), 2);
        assert!(result.availability.iter().all(|a| a.sufficient));
    }

    #[tokio::test]
    async fn test_insufficient_stock_reported_not_fatal() {
        let orch = orchestrator(
            &[("poly/blackout/grey", 8000)],
            &[("poly/blackout/grey", 500)],
            FabricationPolicy::default(),
        );
        let order = vec![line(
            "kitchen",
            1200,
            1500,
            Some(fabric("poly", "blackout", "grey")),
        )];
        let result = orch.optimize(&order).await.unwrap();
        let fab = result
            .availability
            .iter()
            .find(|a| a.category == Category::Fabric)
            .unwrap();
        assert!(!fab.sufficient);
    }

    #[tokio::test]
    async fn test_missing_roll_record_propagates() {
        let orch = orchestrator(&[], &[], FabricationPolicy::default());
        let order = vec![line(
            "kitchen",
            1200,
            1500,
            Some(fabric("poly", "blackout", "grey")),
        )];
        let err = orch.optimize(&order).await.unwrap_err();
        assert!(matches!(err, Error::MissingRoll(_)));
    }

    #[tokio::test]
    async fn test_bar_only_order() {
        let orch = orchestrator(&[], &[], FabricationPolicy::default());
        let mut l = line("kitchen", 5800, 1500, None);
        l.quantity = 1;
        let result = orch.optimize(&[l]).await.unwrap();
        assert_eq!(result.requirements.len(), 1);
        assert_eq!(result.requirements[0].quantity_needed, 2);
        assert!(result
            .groups
            .iter()
            .all(|g| matches!(g, GroupResult::Bar(_))));
    }

    #[tokio::test]
    async fn test_quantity_expands_bars() {
        let orch = orchestrator(&[], &[], FabricationPolicy::default());
        let mut l = line("kitchen", 1500, 1500, None);
        l.quantity = 3;
        let result = orch.optimize(&[l]).await.unwrap();
        let GroupResult::Bar(group) = &result.groups[0] else {
            panic!("expected bar group");
        };
        assert_eq!(group.items.len(), 3);
        assert_eq!(group.total_width, 4500);
    }
}
