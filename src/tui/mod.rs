mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::coach::{now_ms, Coach};
use crate::error::Result;
use crate::models::{ProgressRecord, Score, Stats, StudyItem};
use crate::store::ProgressStore;

const DASHBOARD_PREVIEW: usize = 5;
const DEFAULT_TITLE: &str = "Study Coach";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Queue,
    Session,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Queue,
            View::Queue => View::Session,
            View::Session => View::Dashboard,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Dashboard => View::Session,
            View::Queue => View::Dashboard,
            View::Session => View::Queue,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }
}

#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub item: StudyItem,
    pub progress: Option<ProgressRecord>,
}

/// Study loop state: a snapshot of the smart queue walked front to back.
#[derive(Debug, Default)]
pub struct Session {
    pub queue: Vec<StudyItem>,
    pub index: usize,
    pub revealed: bool,
    pub rated: Option<Score>,
    pub editing: bool,
    pub record: Option<ProgressRecord>,
}

impl Session {
    pub fn current(&self) -> Option<&StudyItem> {
        self.queue.get(self.index)
    }

    fn reset_card(&mut self) {
        self.revealed = false;
        self.rated = None;
        self.editing = false;
        self.record = None;
    }
}

pub struct App<S: ProgressStore> {
    coach: Coach<S>,
    pub view: View,
    pub stats: Stats,
    pub queue: StatefulList<QueueEntry>,
    pub session: Session,
    pub now: i64,
    pub should_quit: bool,
}

impl<S: ProgressStore> App<S> {
    pub fn new(coach: Coach<S>) -> Self {
        let mut app = Self {
            coach,
            view: View::Dashboard,
            stats: Stats::default(),
            queue: StatefulList::with_items(Vec::new()),
            session: Session::default(),
            now: now_ms(),
            should_quit: false,
        };
        app.refresh_data();
        app
    }

    pub fn refresh_data(&mut self) {
        self.now = now_ms();
        self.stats = self.coach.get_stats_at(self.now);

        let progress = self.coach.store().get();
        let entries = self
            .coach
            .get_smart_queue()
            .into_iter()
            .map(|item| QueueEntry {
                progress: progress.get(&item.id).cloned(),
                item,
            })
            .collect();
        let selected = self.queue.selected;
        self.queue = StatefulList::with_items(entries);
        if let Some(i) = selected {
            if i < self.queue.items.len() {
                self.queue.selected = Some(i);
            }
        }
    }

    pub fn dashboard_preview(&self) -> &[QueueEntry] {
        let n = self.queue.items.len().min(DASHBOARD_PREVIEW);
        &self.queue.items[..n]
    }

    pub fn title(&self) -> &str {
        match self.coach.catalog().title() {
            "" => DEFAULT_TITLE,
            title => title,
        }
    }

    pub fn category_title<'a>(&'a self, item: &'a StudyItem) -> &'a str {
        self.coach
            .catalog()
            .category_title(&item.category_id)
            .unwrap_or(&item.category_id)
    }

    fn start_session(&mut self) {
        self.session = Session {
            queue: self.coach.get_smart_queue(),
            ..Session::default()
        };
        self.view = View::Session;
    }

    fn switch_view(&mut self, view: View) {
        if view == View::Session && self.session.queue.is_empty() {
            self.start_session();
        } else {
            self.view = view;
        }
    }

    fn advance(&mut self) {
        self.session.reset_card();
        self.session.index += 1;
        if self.session.index >= self.session.queue.len() {
            log::debug!("Session queue exhausted; rebuilding");
            self.session.queue = self.coach.get_smart_queue();
            self.session.index = 0;
        }
        self.refresh_data();
    }

    fn rate(&mut self, score: Score) -> Result<()> {
        let Some(item_id) = self.session.current().map(|item| item.id) else {
            return Ok(());
        };

        if self.session.editing {
            if let Some(record) = self.coach.update_last_rating(item_id, score)? {
                self.session.record = Some(record);
                self.session.rated = Some(score);
            }
            self.session.editing = false;
        } else if self.session.rated.is_none() {
            let record = self.coach.save_progress(item_id, score)?;
            self.session.record = Some(record);
            self.session.rated = Some(score);
            self.session.revealed = true;
        }
        self.refresh_data();
        Ok(())
    }

    fn skip(&mut self) -> Result<()> {
        if self.session.rated.is_some() {
            return Ok(());
        }
        if let Some(item_id) = self.session.current().map(|item| item.id) {
            self.coach.skip_question(item_id)?;
            self.advance();
        }
        Ok(())
    }

    fn handle_session_key(&mut self, key: KeyCode) -> Result<bool> {
        match key {
            KeyCode::Char(' ') => self.session.revealed = true,
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(score) = Score::from_str(&c.to_string()) {
                    self.rate(score)?;
                }
            }
            KeyCode::Char('e') if self.session.rated.is_some() => self.session.editing = true,
            KeyCode::Esc if self.session.editing => self.session.editing = false,
            KeyCode::Char('s') => self.skip()?,
            KeyCode::Char('n') | KeyCode::Enter if self.session.rated.is_some() => self.advance(),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        if self.view == View::Session && self.handle_session_key(key)? {
            return Ok(());
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data();
            }

            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
                self.switch_view(self.view.prev());
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
                self.switch_view(self.view.next());
            }

            KeyCode::Char('j') | KeyCode::Down if self.view == View::Queue => self.queue.next(),
            KeyCode::Char('k') | KeyCode::Up if self.view == View::Queue => {
                self.queue.previous()
            }
            KeyCode::Char('g') if self.view == View::Queue && !self.queue.items.is_empty() => {
                self.queue.selected = Some(0);
            }
            KeyCode::Char('G') if self.view == View::Queue && !self.queue.items.is_empty() => {
                self.queue.selected = Some(self.queue.items.len() - 1);
            }

            // Start studying from the dashboard
            KeyCode::Enter if self.view == View::Dashboard => self.start_session(),

            _ => {}
        }
        Ok(())
    }
}

pub fn run<S: ProgressStore>(coach: Coach<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(coach);

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<S: ProgressStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers)?;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
