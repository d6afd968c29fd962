use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::create_box_bar;
use crate::store::ProgressStore;
use crate::tui::App;
use crate::{format_due, truncate};

pub fn draw<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let items: Vec<ListItem> = app
        .queue
        .items
        .iter()
        .map(|entry| {
            let (bar, due_text, due_color) = match &entry.progress {
                Some(p) => {
                    let color = if p.is_due(app.now) {
                        Color::Red
                    } else {
                        Color::White
                    };
                    (
                        create_box_bar(p.box_level),
                        format_due(p.next_review_at, app.now),
                        color,
                    )
                }
                None => (create_box_bar(0), "new".to_string(), Color::Cyan),
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<5}", entry.item.id),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<42}", truncate(&entry.item.text, 40)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(bar, Style::default().fg(Color::Green)),
                Span::raw("  "),
                Span::styled(
                    format!("{:<14}", entry.item.difficulty.label()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(due_text, Style::default().fg(due_color)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Queue ({}) ", app.queue.items.len()))
        .title_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Rows
        ])
        .split(inner);

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("  {:<5}", "ID"), header_style),
        Span::styled(format!("{:<42}", "Question"), header_style),
        Span::styled("Box     ", header_style),
        Span::styled(format!("{:<14}", "Difficulty"), header_style),
        Span::styled("Due", header_style),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.queue.selected);

    f.render_stateful_widget(list, chunks[1], &mut state);
}
