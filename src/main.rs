use clap::Parser;
use cutplan::linear::aggregate_bars;
use cutplan::render;
use cutplan::solver::SheetPacker;
use cutplan::types::{BarItem, PanelRequest, StockConfig};

#[derive(Parser)]
#[command(
    name = "cutplan",
    about = "Blind fabric sheet packer and bar stock aggregator"
)]
struct Cli {
    /// Stock sheet dimensions (WxL, e.g. 3000x8000)
    #[arg(long)]
    stock: String,

    /// Fabric panels as WxL:qty or WxL:qty:label (e.g. 1200x1700:3:kitchen)
    #[arg(long = "panels", num_args = 1..)]
    panels: Vec<String>,

    /// Blade kerf width in mm (default: 0)
    #[arg(long, default_value_t = 0)]
    kerf: u32,

    /// Bottom-rail bars as type:colour:width (e.g. std:white:1500)
    #[arg(long = "bars", num_args = 0..)]
    bars: Vec<String>,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxL", s));
    }
    let width = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let length = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    if width == 0 || length == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok((width, length))
}

fn parse_panel(s: &str) -> Result<PanelRequest, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(format!("invalid panel '{}', expected WxL:qty[:label]", s));
    }
    let (width, length) = parse_dimensions(parts[0])?;
    let quantity = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if quantity == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    let label = parts
        .get(2)
        .map(|l| l.to_string())
        .unwrap_or_else(|| format!("{width}x{length}"));
    Ok(PanelRequest {
        width,
        length,
        quantity,
        label,
        ordered_width: None,
        ordered_drop: None,
        reference: None,
    })
}

fn parse_bar(s: &str) -> Result<BarItem, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("invalid bar '{}', expected type:colour:width", s));
    }
    let width = parts[2]
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    Ok(BarItem {
        location: format!("{}:{}", parts[0], parts[1]),
        original_width: width,
        bar_type: parts[0].to_string(),
        bar_colour: parts[1].to_string(),
        reference: None,
    })
}

fn main() {
    let cli = Cli::parse();

    let (stock_width, stock_length) = parse_dimensions(&cli.stock).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let stock = StockConfig::new(stock_width, stock_length, cli.kerf);

    let requests: Vec<PanelRequest> = cli
        .panels
        .iter()
        .map(|p| parse_panel(p))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let bars: Vec<BarItem> = cli
        .bars
        .iter()
        .map(|b| parse_bar(b))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let result = SheetPacker::new(stock, requests).pack().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    for sheet in &result.sheets {
        println!("Sheet {} ({}% used):", sheet.id, sheet.efficiency);
        for p in &sheet.placements {
            let rot = if p.rotated { " [rotated]" } else { "" };
            println!("  {} {}x{} @ ({}, {}){}", p.label, p.width, p.length, p.x, p.y, rot);
        }
        if cli.layout {
            print!("{}", render::render_sheet(sheet));
        }
        println!();
    }

    let stats = &result.statistics;
    if stats.total_cuts < stats.total_panels {
        eprintln!(
            "Warning: {} of {} panels could not be placed (exceed stock in both orientations)",
            stats.total_panels - stats.total_cuts,
            stats.total_panels
        );
    }
    println!(
        "Fabric: {} sheet{}, {}% waste, {} mm of roll to deduct",
        result.sheets.len(),
        if result.sheets.len() == 1 { "" } else { "s" },
        stats.waste_percentage,
        stats.total_fabric_needed,
    );

    if !bars.is_empty() {
        let agg = aggregate_bars(&bars);
        println!();
        for g in &agg.groups {
            println!(
                "Bars {}/{}: {} mm total, base {:.3}, wastage {:.3}, deduct {} piece{}",
                g.bar_type,
                g.bar_colour,
                g.total_width,
                g.base_quantity,
                g.wastage,
                g.pieces_to_deduct,
                if g.pieces_to_deduct == 1 { "" } else { "s" },
            );
        }
        println!("Bar stock total: {} pieces", agg.total_pieces);
    }
}
