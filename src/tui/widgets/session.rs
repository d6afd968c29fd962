use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::create_box_bar;
use crate::format_due;
use crate::models::{Score, StudyItem};
use crate::store::ProgressStore;
use crate::tui::App;

pub fn draw<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let Some(item) = app.session.current() else {
        let block = Block::default().borders(Borders::ALL).title(" Study ");
        let paragraph = Paragraph::new("Nothing to study. Add questions to the catalog.").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Question
            Constraint::Min(0),    // Answer
            Constraint::Length(5), // Rating
        ])
        .split(area);

    draw_question(f, app, item, chunks[0]);
    draw_answer(f, app, item, chunks[1]);
    draw_rating(f, app, chunks[2]);
}

fn draw_question<S: ProgressStore>(f: &mut Frame, app: &App<S>, item: &StudyItem, area: Rect) {
    let text = vec![
        Line::from(vec![
            Span::styled(app.category_title(item), Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled(item.difficulty.label(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            item.text.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " Question {} of {} ",
            app.session.index + 1,
            app.session.queue.len()
        ))
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_answer<S: ProgressStore>(f: &mut Frame, app: &App<S>, item: &StudyItem, area: Rect) {
    let mut text = Vec::new();

    if app.session.revealed {
        text.push(Line::from(Span::styled(
            item.answer.as_deref().unwrap_or("No reference answer."),
            Style::default().fg(Color::White),
        )));
        if !item.sources.is_empty() {
            text.push(Line::from(""));
            for source in &item.sources {
                text.push(Line::from(vec![
                    Span::styled(source.name.as_str(), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!(" <{}>", source.url),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
            }
        }
    } else {
        text.push(Line::from(Span::styled(
            "Answer out loud, then press <Space> to compare.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Answer ")
        .title_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn score_color(score: Score) -> Color {
    match score {
        Score::Poor => Color::Red,
        Score::Ok => Color::Yellow,
        Score::Good => Color::Green,
    }
}

fn draw_rating<S: ProgressStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let text = match (app.session.rated, &app.session.record) {
        (Some(score), Some(record)) => {
            let stars = format!(
                "{}{}",
                "★".repeat(score.as_u8() as usize),
                "☆".repeat(3 - score.as_u8() as usize)
            );
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(stars, Style::default().fg(score_color(score))),
                    Span::raw(" "),
                    Span::styled(
                        score.label(),
                        Style::default()
                            .fg(score_color(score))
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Box ", Style::default().fg(Color::Gray)),
                    Span::styled(
                        create_box_bar(record.box_level),
                        Style::default().fg(Color::Green),
                    ),
                    Span::styled(
                        format!(
                            " {}  next {}",
                            record.box_label(),
                            format_due(record.next_review_at, app.now)
                        ),
                        Style::default().fg(Color::Gray),
                    ),
                ]),
            ];
            if app.session.editing {
                lines.push(Line::from(Span::styled(
                    "Correct rating: press 1, 2 or 3",
                    Style::default().fg(Color::Yellow),
                )));
            }
            lines
        }
        _ => vec![Line::from(vec![
            Span::styled("1", Style::default().fg(Color::Red)),
            Span::raw(" poor   "),
            Span::styled("2", Style::default().fg(Color::Yellow)),
            Span::raw(" ok   "),
            Span::styled("3", Style::default().fg(Color::Green)),
            Span::raw(" good"),
        ])],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Rating ")
        .title_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}
