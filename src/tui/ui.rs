use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{dashboard, queue, session};
use super::{App, View};
use crate::store::ProgressStore;

pub fn draw<S: ProgressStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);
}

fn draw_tabs<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let tab_titles = vec!["Dashboard", "Queue", "Study"];
    let selected = match app.view {
        View::Dashboard => 0,
        View::Queue => 1,
        View::Session => 2,
    };

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.title())),
        )
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    match app.view {
        View::Dashboard => dashboard::draw(f, app, area),
        View::Queue => queue::draw(f, app, area),
        View::Session => session::draw(f, app, area),
    }
}

fn key(k: &str) -> Span<'_> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let mut spans = vec![key("h/l"), Span::raw(" Views  ")];

    match app.view {
        View::Dashboard => {
            spans.extend(vec![
                key("<CR>"),
                Span::raw(" Study  "),
                key("^r"),
                Span::raw(" Refresh  "),
            ]);
        }
        View::Queue => {
            spans.extend(vec![
                key("j/k"),
                Span::raw(" Nav  "),
                key("g/G"),
                Span::raw(" Top/Bot  "),
            ]);
        }
        View::Session if app.session.editing => {
            spans.extend(vec![
                key("1/2/3"),
                Span::raw(" New rating  "),
                key("<Esc>"),
                Span::raw(" Cancel  "),
            ]);
        }
        View::Session if app.session.rated.is_some() => {
            spans.extend(vec![
                key("n/<CR>"),
                Span::raw(" Next  "),
                key("e"),
                Span::raw(" Edit rating  "),
            ]);
        }
        View::Session => {
            spans.extend(vec![
                key("<Space>"),
                Span::raw(" Answer  "),
                key("1/2/3"),
                Span::raw(" Rate  "),
                key("s"),
                Span::raw(" Skip  "),
            ]);
        }
    }

    spans.extend(vec![key("q"), Span::raw(" Quit")]);

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
