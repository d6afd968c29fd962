use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::create_box_bar;
use crate::store::ProgressStore;
use crate::tui::App;
use crate::{format_due, truncate};

pub fn draw<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_stats(f, app, chunks[0]);
    draw_up_next(f, app, chunks[1]);
}

fn stat_line(label: &str, value: usize, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(
            value.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn draw_stats<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let stats = &app.stats;
    let due_color = if stats.due > 0 {
        Color::Yellow
    } else {
        Color::White
    };

    let text = vec![
        stat_line("Questions", stats.total, Color::White),
        stat_line("Started", stats.started, Color::Cyan),
        stat_line("Learned", stats.learned, Color::Green),
        stat_line("Struggling", stats.struggling, Color::Red),
        stat_line("Due", stats.due, due_color),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_up_next<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let items: Vec<ListItem> = app
        .dashboard_preview()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (style, bar, due) = match &entry.progress {
                Some(p) => (
                    Style::default().fg(Color::Yellow),
                    create_box_bar(p.box_level),
                    format_due(p.next_review_at, app.now),
                ),
                None => (
                    Style::default().fg(Color::Red),
                    create_box_bar(0),
                    "new".to_string(),
                ),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<32}", truncate(&entry.item.text, 30)), style),
                Span::styled(bar, Style::default().fg(Color::Green)),
                Span::raw(" "),
                Span::styled(due, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Up Next ")
        .title_style(Style::default().fg(Color::Yellow));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
