use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use gridbench_core::widget::{GridOptions, Placement, WidgetOptions, WidgetTree};

/// Area the root grid occupies inside the preview.
///
/// A full-size grid takes the whole area. Otherwise `col`/`line` offset it
/// and `width`/`height` size it, in terminal cells, clipped to the area.
pub fn grid_area(area: Rect, grid: &GridOptions) -> Rect {
    if grid.full_size {
        return area;
    }
    let x = area.x.saturating_add(grid.col.min(area.width));
    let y = area.y.saturating_add(grid.line.min(area.height));
    let width = grid
        .width
        .unwrap_or(area.width)
        .min(area.right().saturating_sub(x));
    let height = grid
        .height
        .unwrap_or(area.height)
        .min(area.bottom().saturating_sub(y));
    Rect::new(x, y, width, height)
}

/// Terminal rect of a child spanning `placement` cells of a
/// `columns` x `rows` grid drawn in `grid`.
pub fn cell_rect(grid: Rect, columns: u16, rows: u16, placement: Placement) -> Rect {
    let columns = u32::from(columns.max(1));
    let rows = u32::from(rows.max(1));
    let edge = |origin: u16, extent: u16, count: u32, index: u32| {
        let offset = u32::from(extent) * index.min(count) / count;
        origin.saturating_add(offset as u16)
    };

    let left = edge(grid.x, grid.width, columns, u32::from(placement.col));
    let right = edge(
        grid.x,
        grid.width,
        columns,
        u32::from(placement.col) + u32::from(placement.width),
    );
    let top = edge(grid.y, grid.height, rows, u32::from(placement.line));
    let bottom = edge(
        grid.y,
        grid.height,
        rows,
        u32::from(placement.line) + u32::from(placement.height),
    );
    Rect::new(left, top, right - left, bottom - top)
}

/// Draw the widget tree: the root grid with a dotted cell lattice and one
/// bordered box per attached child.
pub fn render_preview(f: &mut Frame, area: Rect, tree: &WidgetTree) {
    let block = Block::default().borders(Borders::ALL).title("Preview");
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let Some(root) = tree.root() else {
        f.render_widget(
            Paragraph::new(Line::from("no widget")).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };
    let WidgetOptions::Grid(grid) = &root.options else {
        return;
    };

    let grid_rect = grid_area(inner, grid);
    if grid_rect.width == 0 || grid_rect.height == 0 {
        return;
    }
    let lattice = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!("grid {}x{}", grid.columns, grid.rows));
    f.render_widget(lattice, grid_rect);

    // One dot per cell, and only while every cell is at least one terminal
    // cell wide and tall. Denser grids get no lattice.
    let lattice_fits = grid.columns <= grid_rect.width && grid.rows <= grid_rect.height;
    let (lattice_columns, lattice_rows) = if lattice_fits {
        (grid.columns, grid.rows)
    } else {
        (0, 0)
    };
    for row in 0..lattice_rows {
        for col in 0..lattice_columns {
            let cell = cell_rect(grid_rect, grid.columns, grid.rows, Placement {
                col,
                line: row,
                width: 1,
                height: 1,
            });
            if cell.width > 0 && cell.height > 0 {
                let dot = Paragraph::new("·").style(Style::default().fg(Color::DarkGray));
                f.render_widget(dot, Rect::new(cell.x, cell.y, 1, 1));
            }
        }
    }

    for child in tree.children(root.handle) {
        let (Some(placement), WidgetOptions::Box(options)) = (child.placement, &child.options)
        else {
            continue;
        };
        let rect = cell_rect(grid_rect, grid.columns, grid.rows, placement);
        if rect.width == 0 || rect.height == 0 {
            continue;
        }
        let boxed = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(options.title.clone());
        f.render_widget(boxed, rect);
    }
}
