use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::simulation::environment::{Cell, GridSnapshot};

fn cell_style(cell: Cell) -> Style {
    match cell {
        Cell::Empty => Style::default(),
        Cell::Mouse => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Cell::Platform => Style::default().fg(Color::Cyan),
        Cell::Found => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    }
}

/// Colours the bordered board of `snapshot` for a ratatui paragraph.
#[must_use]
pub fn board_lines(snapshot: &GridSnapshot) -> Vec<Line<'static>> {
    let frame = Style::default().fg(Color::DarkGray);
    let border = Line::from(Span::styled(
        format!("+ {} +", vec!["-"; snapshot.bounds.cols].join(" ")),
        frame,
    ));

    let mut lines = Vec::with_capacity(snapshot.bounds.rows + 2);
    lines.push(border.clone());
    for row in snapshot.cells.chunks(snapshot.bounds.cols) {
        let mut spans = vec![Span::styled("|", frame)];
        for &cell in row {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(cell.symbol().to_string(), cell_style(cell)));
        }
        spans.push(Span::raw(" "));
        spans.push(Span::styled("|", frame));
        lines.push(Line::from(spans));
    }
    lines.push(border);
    lines
}
