use crate::error::{Error, Result};
use crate::guillotine::Sheet;
use crate::types::{
    CutEntry, JobStatistics, PackResult, PanelRequest, SheetLayout, StockConfig, UnitPanel,
};

/// Ceiling on unit panels per job, applied after quantity expansion.
pub const MAX_UNIT_PANELS: usize = 10_000;

/// First-fit-decreasing guillotine packer for one fabric job.
pub struct SheetPacker {
    stock: StockConfig,
    requests: Vec<PanelRequest>,
}

impl SheetPacker {
    pub fn new(stock: StockConfig, requests: Vec<PanelRequest>) -> Self {
        Self { stock, requests }
    }

    pub fn pack(&self) -> Result<PackResult> {
        if self.stock.stock_width == 0 || self.stock.stock_length == 0 {
            return Err(Error::InvalidStock(format!(
                "stock dimensions must be non-zero, got {}x{}",
                self.stock.stock_width, self.stock.stock_length
            )));
        }

        let total_panels: u32 = self.requests.iter().map(|r| r.quantity).sum();
        let panels = sort_for_packing(expand_requests(&self.requests)?);

        let mut sheets: Vec<Sheet> = Vec::new();
        'panels: for panel in &panels {
            // Scan opened sheets in creation order, first fit wins.
            for sheet in sheets.iter_mut() {
                if let Some(fit) = sheet.find_fit(panel) {
                    sheet.place(fit, panel)?;
                    continue 'panels;
                }
            }
            // No opened sheet accepts the panel: open a fresh one.
            let mut sheet = Sheet::new(sheets.len() as u32 + 1, self.stock);
            match sheet.find_fit(panel) {
                Some(fit) => {
                    sheet.place(fit, panel)?;
                    sheets.push(sheet);
                }
                None => {
                    // Exceeds stock in both orientations: dropped. The only
                    // caller-visible signal is total_cuts < total_panels.
                    tracing::warn!(
                        width = panel.width,
                        length = panel.length,
                        label = %panel.label,
                        "panel exceeds stock in both orientations, dropped"
                    );
                }
            }
        }

        let layouts: Vec<SheetLayout> = sheets
            .iter()
            .map(|s| SheetLayout {
                id: s.id,
                stock_width: s.stock.stock_width,
                stock_length: s.stock.stock_length,
                placements: s.placements.clone(),
                used_area: s.used_area,
                wasted_area: s.wasted_area(),
                efficiency: s.efficiency(),
            })
            .collect();

        let statistics = job_statistics(&layouts, self.stock, total_panels);
        let cut_list = cut_list(&layouts);
        Ok(PackResult {
            sheets: layouts,
            statistics,
            cut_list,
        })
    }
}

/// PanelExpander: one [`UnitPanel`] per unit of requested quantity.
fn expand_requests(requests: &[PanelRequest]) -> Result<Vec<UnitPanel>> {
    let count: usize = requests.iter().map(|r| r.quantity as usize).sum();
    if count > MAX_UNIT_PANELS {
        return Err(Error::TooManyPanels {
            count,
            limit: MAX_UNIT_PANELS,
        });
    }
    let mut panels = Vec::with_capacity(count);
    for request in requests {
        for _ in 0..request.quantity {
            panels.push(UnitPanel::from_request(request));
        }
    }
    Ok(panels)
}

/// PanelSorter: decreasing area, ties broken by decreasing longest side.
/// Stable, so equal panels keep their expansion order.
fn sort_for_packing(mut panels: Vec<UnitPanel>) -> Vec<UnitPanel> {
    panels.sort_by(|a, b| {
        b.area()
            .cmp(&a.area())
            .then(b.max_dim().cmp(&a.max_dim()))
    });
    panels
}

/// StatisticsCalculator: aggregates across all opened sheets of a job.
///
/// `waste_percentage` is derived as `100 - efficiency` so the two integers
/// always sum to 100 for jobs with at least one sheet.
pub fn job_statistics(
    sheets: &[SheetLayout],
    stock: StockConfig,
    total_panels: u32,
) -> JobStatistics {
    let total_stock_area = stock.area() * sheets.len() as u64;
    let total_used_area: u64 = sheets.iter().map(|s| s.used_area).sum();
    let total_wasted_area = total_stock_area - total_used_area;
    let efficiency = if total_stock_area == 0 {
        0
    } else {
        (total_used_area as f64 / total_stock_area as f64 * 100.0).round() as u32
    };
    let waste_percentage = if sheets.is_empty() { 0 } else { 100 - efficiency };
    JobStatistics {
        total_used_area,
        total_wasted_area,
        total_stock_area,
        efficiency,
        waste_percentage,
        total_fabric_needed: sheets.len() as u64 * stock.stock_length as u64,
        total_cuts: sheets.iter().map(|s| s.placements.len() as u32).sum(),
        total_panels,
    }
}

/// CutListGenerator: one numbered entry per placement, in sheet order then
/// per-sheet insertion order.
pub fn cut_list(sheets: &[SheetLayout]) -> Vec<CutEntry> {
    let mut entries = Vec::new();
    for sheet in sheets {
        for placed in &sheet.placements {
            entries.push(CutEntry {
                number: entries.len() as u32 + 1,
                sheet_id: sheet.id,
                x: placed.x,
                y: placed.y,
                width: placed.width,
                length: placed.length,
                rotated: placed.rotated,
                label: placed.label.clone(),
                ordered_width: placed.ordered_width,
                ordered_drop: placed.ordered_drop,
                reference: placed.reference.clone(),
            });
        }
    }
    entries
}
