use serde::{Deserialize, Serialize};

/// Version stamp written into every [`OptimizationResult`]. Bump when the
/// shape of the persisted result changes.
pub const RESULT_SCHEMA_VERSION: u32 = 1;

/// Stock sheet configuration for one packing job. All dimensions in
/// millimetres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockConfig {
    pub stock_width: u32,
    pub stock_length: u32,
    /// Material lost to the blade per cut, added to both panel dimensions
    /// when testing a fit.
    #[serde(default)]
    pub kerf: u32,
}

impl StockConfig {
    pub fn new(stock_width: u32, stock_length: u32, kerf: u32) -> Self {
        Self {
            stock_width,
            stock_length,
            kerf,
        }
    }

    pub fn area(&self) -> u64 {
        self.stock_width as u64 * self.stock_length as u64
    }
}

/// A quantity-bearing request for identical fabric panels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelRequest {
    pub width: u32,
    pub length: u32,
    pub quantity: u32,
    pub label: String,
    /// Ordered (pre-fabrication) width, retained for reporting.
    #[serde(default)]
    pub ordered_width: Option<u32>,
    /// Ordered (pre-fabrication) drop, retained for reporting.
    #[serde(default)]
    pub ordered_drop: Option<u32>,
    /// Opaque caller reference, passed through untouched.
    #[serde(default)]
    pub reference: Option<String>,
}

/// One panel instance expanded from a [`PanelRequest`].
#[derive(Debug, Clone)]
pub struct UnitPanel {
    pub width: u32,
    pub length: u32,
    pub label: String,
    pub rotated: bool,
    pub ordered_width: Option<u32>,
    pub ordered_drop: Option<u32>,
    pub reference: Option<String>,
}

impl UnitPanel {
    pub fn from_request(request: &PanelRequest) -> Self {
        Self {
            width: request.width,
            length: request.length,
            label: request.label.clone(),
            rotated: false,
            ordered_width: request.ordered_width,
            ordered_drop: request.ordered_drop,
            reference: request.reference.clone(),
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.length as u64
    }

    pub fn max_dim(&self) -> u32 {
        self.width.max(self.length)
    }
}

/// An axis-aligned available region of a sheet, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub length: u32,
}

impl FreeRect {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.length as u64
    }

    /// True when `other` lies entirely within this rectangle's bounds.
    pub fn contains(&self, other: &FreeRect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.length <= self.y + self.length
    }
}

/// A panel fixed at a position on a sheet. `width`/`length` are the actual
/// placed dimensions, swapped from the source panel when `rotated` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedPanel {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub length: u32,
    pub rotated: bool,
    pub label: String,
    pub ordered_width: Option<u32>,
    pub ordered_drop: Option<u32>,
    pub reference: Option<String>,
}

impl PlacedPanel {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.length as u64
    }
}

/// Finished layout of one stock sheet, free-space bookkeeping discarded.
#[derive(Debug, Clone, Serialize)]
pub struct SheetLayout {
    /// Sequential id starting at 1 within one job.
    pub id: u32,
    pub stock_width: u32,
    pub stock_length: u32,
    pub placements: Vec<PlacedPanel>,
    pub used_area: u64,
    pub wasted_area: u64,
    /// Integer percentage 0-100.
    pub efficiency: u32,
}

/// One numbered entry of the cut sequence handed to the saw operators.
#[derive(Debug, Clone, Serialize)]
pub struct CutEntry {
    pub number: u32,
    pub sheet_id: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub length: u32,
    pub rotated: bool,
    pub label: String,
    pub ordered_width: Option<u32>,
    pub ordered_drop: Option<u32>,
    pub reference: Option<String>,
}

/// Aggregate figures for one packing job.
///
/// `total_fabric_needed` is nominal whole-roll consumption (sheet count times
/// configured stock length) and is the figure fed to inventory deduction,
/// independent of how much of the final sheet was actually used.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatistics {
    pub total_used_area: u64,
    pub total_wasted_area: u64,
    pub total_stock_area: u64,
    pub efficiency: u32,
    pub waste_percentage: u32,
    /// Millimetres of roll stock to debit.
    pub total_fabric_needed: u64,
    /// Panels actually placed. Less than `total_panels` when panels were
    /// dropped for exceeding stock in both orientations.
    pub total_cuts: u32,
    /// Panels requested, pre-drop.
    pub total_panels: u32,
}

/// Full output of one SheetPacker run.
#[derive(Debug, Clone, Serialize)]
pub struct PackResult {
    pub sheets: Vec<SheetLayout>,
    pub statistics: JobStatistics,
    pub cut_list: Vec<CutEntry>,
}

/// One bottom-rail bar to be cut from linear stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarItem {
    pub location: String,
    /// Ordered (uncut) width in millimetres. Bar stock consumption tracks the
    /// nominal ordered dimension, not any fabrication-adjusted width.
    pub original_width: u32,
    pub bar_type: String,
    pub bar_colour: String,
    #[serde(default)]
    pub reference: Option<String>,
}

/// All bars sharing one (type, colour) key, with the stock pieces needed to
/// cut them.
///
/// `base_quantity`, `wastage` and `final_quantity` are rounded to 3 decimal
/// places for reporting; `pieces_to_deduct` is computed from the unrounded
/// final quantity.
#[derive(Debug, Clone, Serialize)]
pub struct BarGroup {
    pub bar_type: String,
    pub bar_colour: String,
    pub items: Vec<BarItem>,
    pub total_width: u64,
    pub base_quantity: f64,
    pub wastage: f64,
    pub final_quantity: f64,
    pub pieces_to_deduct: u64,
}

/// Output of one LinearStockAggregator run.
#[derive(Debug, Clone, Serialize)]
pub struct BarAggregation {
    pub groups: Vec<BarGroup>,
    pub total_pieces: u64,
}

/// Identity of one fabric: order lines sharing all three fields are packed
/// together on the same roll stock.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FabricKey {
    pub material: String,
    pub fabric_type: String,
    pub colour: String,
}

impl std::fmt::Display for FabricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.material, self.fabric_type, self.colour)
    }
}

/// Bottom-rail identity carried by an order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarSpec {
    pub bar_type: String,
    pub bar_colour: String,
}

/// One line item of a blind order, as received from the order system.
/// `width` and `drop` are the ordered dimensions in millimetres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub location: String,
    pub width: u32,
    pub drop: u32,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub fabric: Option<FabricKey>,
    #[serde(default)]
    pub bar: Option<BarSpec>,
    #[serde(default)]
    pub reference: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Fabric,
    Bar,
}

/// One line of the inventory debit list: millimetres of roll for fabric,
/// whole pieces for bars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRequirement {
    pub category: Category,
    pub item_key: String,
    pub quantity_needed: u64,
}

/// Verdict of the external stock-availability checker for one requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAvailability {
    pub category: Category,
    pub item_key: String,
    pub quantity_needed: u64,
    pub sufficient: bool,
}

/// Packing output for one fabric group of an order.
#[derive(Debug, Clone, Serialize)]
pub struct FabricGroupResult {
    pub fabric: FabricKey,
    pub stock: StockConfig,
    pub result: PackResult,
}

/// One category-tagged slice of an order's optimization output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupResult {
    Fabric(FabricGroupResult),
    Bar(BarGroup),
}

/// Combined output of one order optimization run.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub schema_version: u32,
    pub groups: Vec<GroupResult>,
    pub total_bar_pieces: u64,
    pub requirements: Vec<InventoryRequirement>,
    pub availability: Vec<ItemAvailability>,
}
