use crate::types::SheetLayout;

const MAX_COLS: f64 = 80.0;
const MAX_ROWS: f64 = 40.0;

/// ASCII layout of one sheet: width runs horizontally, length vertically,
/// origin top-left. Each placement is drawn as a box with its label centred.
pub fn render_sheet(sheet: &SheetLayout) -> String {
    let scale = f64::min(
        MAX_COLS / sheet.stock_width as f64,
        MAX_ROWS / sheet.stock_length as f64,
    );
    let grid_w = (sheet.stock_width as f64 * scale).round() as usize;
    let grid_h = (sheet.stock_length as f64 * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];
    draw_box(&mut grid, 0, 0, grid_w, grid_h);

    for placed in &sheet.placements {
        let col = (placed.x as f64 * scale).round() as usize;
        let row = (placed.y as f64 * scale).round() as usize;
        let cols = (placed.width as f64 * scale).round() as usize;
        let rows = (placed.length as f64 * scale).round() as usize;
        if cols == 0 || rows == 0 {
            continue;
        }
        draw_box(&mut grid, col, row, cols, rows);

        let label = if placed.label.is_empty() {
            format!("{}x{}", placed.width, placed.length)
        } else {
            placed.label.clone()
        };
        write_label(&mut grid, &label, col, row, cols, rows);
    }

    let mut out = format!(
        "Sheet {} ({}x{} mm, {}% used)\n",
        sheet.id, sheet.stock_width, sheet.stock_length, sheet.efficiency
    );
    for row in &grid {
        let rendered: String = row.iter().collect();
        out.push_str(rendered.trim_end());
        out.push('\n');
    }
    out
}

fn write_label(grid: &mut [Vec<char>], label: &str, x: usize, y: usize, w: usize, h: usize) {
    if w <= 2 || h == 0 {
        return;
    }
    let chars: Vec<char> = label.chars().collect();
    let cx = x + w / 2;
    let cy = y + h / 2;
    let start = cx.saturating_sub(chars.len() / 2);
    for (i, &ch) in chars.iter().enumerate() {
        let col = start + i;
        if col > x && col < x + w && cy > y && cy < y + h {
            grid[cy][col] = ch;
        }
    }
}

fn draw_box(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    for col in x..=x + w {
        if col >= cols {
            break;
        }
        for &row in &[y, y + h] {
            if row < rows {
                grid[row][col] = match grid[row][col] {
                    '|' | '+' => '+',
                    _ => '-',
                };
            }
        }
    }
    for row in y..=y + h {
        if row >= rows {
            break;
        }
        for &col in &[x, x + w] {
            if col < cols {
                grid[row][col] = match grid[row][col] {
                    '-' | '+' => '+',
                    _ => '|',
                };
            }
        }
    }
    for &col in &[x, x + w] {
        for &row in &[y, y + h] {
            if row < rows && col < cols {
                grid[row][col] = '+';
            }
        }
    }
}
