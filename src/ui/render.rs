use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const KEY_HELP: &str =
    "n: new trial | m: move | s: simulate trial | r: relocate | x: reset | q: quit";

pub fn draw_ui(f: &mut Frame, board: Vec<Line<'static>>, hud_info: &str, status: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // HUD
            Constraint::Min(0),    // Board
            Constraint::Length(1), // Status
            Constraint::Length(1), // Keys
        ])
        .split(f.area());

    let hud = Paragraph::new(Span::styled(
        hud_info.to_owned(),
        Style::default().add_modifier(Modifier::REVERSED),
    ));
    f.render_widget(hud, chunks[0]);

    let field = Paragraph::new(board)
        .block(Block::default().borders(Borders::NONE))
        .style(Style::default().fg(Color::White).bg(Color::Black));
    f.render_widget(field, chunks[1]);

    f.render_widget(Paragraph::new(Line::from(status.to_owned())), chunks[2]);
    f.render_widget(
        Paragraph::new(Span::styled(KEY_HELP, Style::default().fg(Color::DarkGray))),
        chunks[3],
    );
}
