//! Terminal rendering of engine snapshots.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use life_engine::Snapshot;

/// Splits the screen into the grid panel and the statistics panel.
pub fn layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)].as_ref())
        .split(area);
    (chunks[0], chunks[1])
}

/// Draws the game grid to the terminal interface.
///
/// # Arguments
///
/// * `f` - The frame to draw on
/// * `snapshot` - The latest published engine state
/// * `area` - The area of the terminal to draw in
pub fn draw_grid(f: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Game of Life [Space: Play/Pause | Enter: Step | r: Random | c: Clear | q: Quit]");

    let paragraph = Paragraph::new(snapshot.board.to_string())
        .style(Style::default().fg(Color::Green))
        .block(block);

    f.render_widget(paragraph, area);
}

/// Draws the statistics panel to the terminal interface.
pub fn draw_stats(f: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let stats = &snapshot.stats;
    let stats_text = format!(
        "Statistics:\n\
        Generation: {}\n\
        Current Population: {}\n\
        Cells Created: {}\n\
        Cells Destroyed: {}\n\
        Birth Rate: {:.2}/gen\n\
        Death Rate: {:.2}/gen\n\
        Board: {}x{}\n\
        Status: {}\n",
        stats.generation,
        stats.population,
        stats.cells_created,
        stats.cells_destroyed,
        stats.birth_rate(),
        stats.death_rate(),
        snapshot.board.rows(),
        snapshot.board.cols(),
        if snapshot.run_state.is_running() { "Running" } else { "Paused" }
    );

    let stats_widget = Paragraph::new(stats_text)
        .block(Block::default().borders(Borders::ALL).title("Statistics"))
        .wrap(Wrap { trim: true });

    f.render_widget(stats_widget, area);
}

/// Maps a mouse position to the board cell drawn under it, if any.
///
/// Cells are one terminal column wide and sit inside the grid panel's border.
pub fn cell_at(
    grid_area: Rect,
    column: u16,
    row: u16,
    rows: usize,
    cols: usize,
) -> Option<(usize, usize)> {
    let col = column.checked_sub(grid_area.x + 1)? as usize;
    let row = row.checked_sub(grid_area.y + 1)? as usize;
    (row < rows && col < cols).then_some((row, col))
}
