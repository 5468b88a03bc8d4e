use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dispensary_finder::{
    company_message, dispensary_message, resolve, CompanyRecord, DispensaryDetail, Finder,
    LocationRecord, LocationSelection,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

const PAGE_STEP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    DispensaryFinder,
    CompanyInformation,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::DispensaryFinder => Page::CompanyInformation,
            Page::CompanyInformation => Page::DispensaryFinder,
        }
    }

    pub fn previous(&self) -> Self {
        // Two pages: previous == next
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::DispensaryFinder => "Dispensary Finder",
            Page::CompanyInformation => "Company Information",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    City,
    State,
}

impl FilterMode {
    pub fn toggle(&self) -> Self {
        match self {
            FilterMode::City => FilterMode::State,
            FilterMode::State => FilterMode::City,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            FilterMode::City => "City",
            FilterMode::State => "State",
        }
    }
}

/// Which list the arrow keys move on the dispensary page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Options,
    Results,
}

pub struct App {
    finder: Finder,
    pub current_page: Page,

    // Dispensary page
    pub filter_mode: FilterMode,
    pub focus: Focus,
    cities: Vec<String>,
    state_labels: Vec<String>,
    pub option_state: ListState,
    /// Current filtered subset, sorted by name
    pub results: Vec<LocationRecord>,
    /// Distinct names of `results`
    pub choices: Vec<String>,
    pub choice_state: ListState,
    pub message: Option<String>,

    // Company page
    pub company_state_state: ListState,
    pub company_query: String,
    pub editing_query: bool,
    pub companies: Vec<CompanyRecord>,
    pub company_table_state: TableState,
    pub company_notice: Option<String>,
}

impl App {
    pub fn new(finder: Finder) -> Self {
        let cities = finder.cities();
        let state_labels = finder.state_labels();

        let mut app = Self {
            finder,
            current_page: Page::DispensaryFinder,
            filter_mode: FilterMode::City,
            focus: Focus::Options,
            cities,
            state_labels,
            option_state: ListState::default(),
            results: Vec::new(),
            choices: Vec::new(),
            choice_state: ListState::default(),
            message: None,
            company_state_state: ListState::default(),
            company_query: String::new(),
            editing_query: false,
            companies: Vec::new(),
            company_table_state: TableState::default(),
            company_notice: None,
        };

        app.reset_option_selection();
        if !app.state_labels.is_empty() {
            app.company_state_state.select(Some(0));
        }
        app.refresh_dispensaries();
        app.refresh_companies();
        app
    }

    // ========================================================================
    // DISPENSARY PAGE
    // ========================================================================

    /// Options for the current filter mode (cities or state labels)
    pub fn options(&self) -> &[String] {
        match self.filter_mode {
            FilterMode::City => &self.cities,
            FilterMode::State => &self.state_labels,
        }
    }

    pub fn selection(&self) -> Option<LocationSelection> {
        let option = self.option_state.selected().and_then(|i| self.options().get(i))?;

        Some(match self.filter_mode {
            FilterMode::City => LocationSelection::City(option.clone()),
            FilterMode::State => LocationSelection::State(option.clone()),
        })
    }

    fn reset_option_selection(&mut self) {
        let first = if self.options().is_empty() { None } else { Some(0) };
        self.option_state.select(first);
    }

    pub fn toggle_filter_mode(&mut self) {
        self.filter_mode = self.filter_mode.toggle();
        self.focus = Focus::Options;
        self.reset_option_selection();
        self.refresh_dispensaries();
    }

    /// Re-run the filter for the selected option
    pub fn refresh_dispensaries(&mut self) {
        self.results.clear();
        self.choices.clear();
        self.message = None;

        let Some(selection) = self.selection() else {
            self.message = Some(format!("No {} options available", self.filter_mode.title().to_lowercase()));
            self.choice_state.select(None);
            return;
        };

        match self.finder.find_dispensaries(&selection) {
            Ok(records) => {
                self.choices = dispensary_finder::choices(&records);
                self.results = records;
            }
            Err(e) => self.message = Some(dispensary_message(&selection, &e)),
        }

        let first = if self.choices.is_empty() { None } else { Some(0) };
        self.choice_state.select(first);
    }

    pub fn selected_choice(&self) -> Option<&str> {
        self.choice_state
            .selected()
            .and_then(|i| self.choices.get(i))
            .map(String::as_str)
    }

    /// Detail of the chosen dispensary (first in name order on duplicates)
    pub fn selected_detail(&self) -> Option<DispensaryDetail> {
        let name = self.selected_choice()?;
        resolve(&self.results, name).ok().map(DispensaryDetail::from)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Options => Focus::Results,
            Focus::Results => Focus::Options,
        };
    }

    /// Move on the focused dispensary list
    pub fn move_dispensary(&mut self, delta: isize) {
        match self.focus {
            Focus::Options => {
                let len = self.options().len();
                step(&mut self.option_state, len, delta);
                self.refresh_dispensaries();
            }
            Focus::Results => {
                let len = self.choices.len();
                step(&mut self.choice_state, len, delta);
            }
        }
    }

    // ========================================================================
    // COMPANY PAGE
    // ========================================================================

    pub fn company_state_label(&self) -> Option<&str> {
        self.company_state_state
            .selected()
            .and_then(|i| self.state_labels.get(i))
            .map(String::as_str)
    }

    pub fn refresh_companies(&mut self) {
        let state = self.company_state_label().map(str::to_string);

        match self.finder.find_companies(state.as_deref(), &self.company_query) {
            Ok(records) => {
                self.companies = records;
                self.company_notice = None;
            }
            Err(e) => {
                self.companies.clear();
                self.company_notice = Some(company_message(state.as_deref(), &self.company_query, &e));
            }
        }

        let first = if self.companies.is_empty() { None } else { Some(0) };
        self.company_table_state.select(first);
    }

    pub fn move_company_state(&mut self, delta: isize) {
        let len = self.state_labels.len();
        step(&mut self.company_state_state, len, delta);
        self.refresh_companies();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.company_query.push(c);
        self.refresh_companies();
    }

    pub fn pop_query_char(&mut self) {
        if self.company_query.pop().is_some() {
            self.refresh_companies();
        }
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.editing_query = false;
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.editing_query = false;
    }

    /// Apply one key press. Returns false when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.editing_query {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.editing_query = false,
                KeyCode::Backspace => self.pop_query_char(),
                KeyCode::Char(c) => self.push_query_char(c),
                _ => {}
            }
            return true;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            _ => match self.current_page {
                Page::DispensaryFinder => self.handle_dispensary_key(key),
                Page::CompanyInformation => self.handle_company_key(key),
            },
        }

        true
    }

    fn handle_dispensary_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('f') => self.toggle_filter_mode(),
            KeyCode::Left | KeyCode::Right | KeyCode::Enter => self.toggle_focus(),
            KeyCode::Down | KeyCode::Char('j') => self.move_dispensary(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_dispensary(-1),
            KeyCode::PageDown => self.move_dispensary(PAGE_STEP as isize),
            KeyCode::PageUp => self.move_dispensary(-(PAGE_STEP as isize)),
            _ => {}
        }
    }

    fn handle_company_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => self.editing_query = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_company_state(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_company_state(-1),
            KeyCode::PageDown => self.move_company_state(PAGE_STEP as isize),
            KeyCode::PageUp => self.move_company_state(-(PAGE_STEP as isize)),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.company_query.clear();
                self.refresh_companies();
            }
            _ => {}
        }
    }
}

/// Move a list selection by `delta`. Single steps wrap around, page steps clamp.
fn step(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }

    let current = state.selected().unwrap_or(0) as isize;
    let last = len as isize - 1;

    let next = match delta {
        1 if current >= last => 0,
        -1 if current <= 0 => last,
        _ => (current + delta).clamp(0, last),
    };

    state.select(Some(next as usize));
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::DispensaryFinder => render_dispensary_page(f, chunks[1], app),
        Page::CompanyInformation => render_company_page(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn highlight() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.finder.data().summary();

    let mut tab_spans = vec![];
    for (i, page) in [Page::DispensaryFinder, Page::CompanyInformation].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Dispensaries: {}", summary.dispensaries),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("Companies: {}", summary.companies),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("Cities: {}", summary.cities),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Dispensary and Company Information Finder "),
    );

    f.render_widget(header, area);
}

fn render_dispensary_page(f: &mut Frame, area: Rect, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28), // Filter options
            Constraint::Percentage(32), // Matching dispensaries
            Constraint::Percentage(40), // Detail panel
        ])
        .split(area);

    // Filter options
    let options: Vec<ListItem> = app
        .options()
        .iter()
        .map(|o| ListItem::new(o.clone()))
        .collect();

    let options = List::new(options)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused_border(app.focus == Focus::Options))
                .title(format!(" Filter by {} (f) ", app.filter_mode.title())),
        )
        .highlight_style(highlight())
        .highlight_symbol("→ ");

    f.render_stateful_widget(options, columns[0], &mut app.option_state);

    // Results
    let title = format!(" Dispensaries ({}) ", app.results.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border(app.focus == Focus::Results))
        .title(title);

    if let Some(message) = &app.message {
        let notice = Paragraph::new(message.clone())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(notice, columns[1]);
    } else {
        let items: Vec<ListItem> = app.choices.iter().map(|c| ListItem::new(c.clone())).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight())
            .highlight_symbol("→ ");
        f.render_stateful_widget(list, columns[1], &mut app.choice_state);
    }

    render_detail_panel(f, columns[2], app);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let label = |text: &str| {
        Span::styled(
            text.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    };

    let content = match app.selected_detail() {
        Some(detail) => vec![
            Line::from(""),
            Line::from(vec![label("  Name:         "), Span::raw(detail.name)]),
            Line::from(vec![label("  Address:      "), Span::raw(detail.address)]),
            Line::from(vec![label("  Phone Number: "), Span::raw(detail.phone_number)]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "  Map View",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![Span::styled(
                format!("  {}", detail.map_link),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            )]),
        ],
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Choose a dispensary",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ],
    };

    let panel = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Details "),
    );

    f.render_widget(panel, area);
}

fn render_company_page(f: &mut Frame, area: Rect, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
        .split(area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(columns[1]);

    // State selector
    let states: Vec<ListItem> = app
        .state_labels
        .iter()
        .map(|s| ListItem::new(s.clone()))
        .collect();
    let states = List::new(states)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused_border(!app.editing_query))
                .title(" Select state "),
        )
        .highlight_style(highlight())
        .highlight_symbol("→ ");
    f.render_stateful_widget(states, columns[0], &mut app.company_state_state);

    // Name search
    let cursor = if app.editing_query { "▏" } else { "" };
    let search = Paragraph::new(format!("{}{}", app.company_query, cursor)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused_border(app.editing_query))
            .title(" Company name (/ to edit) "),
    );
    f.render_widget(search, right[0]);

    // Results
    if let Some(notice) = &app.company_notice {
        let notice = Paragraph::new(notice.clone())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Companies "));
        f.render_widget(notice, right[1]);
        return;
    }

    let header_cells = ["Company Legal Name", "Company emails", "Company Phone"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.companies.iter().map(|company| {
        Row::new(vec![
            Cell::from(truncate(company.legal_name.as_deref().unwrap_or("-"), 38)),
            Cell::from(truncate(&company.emails, 34)),
            Cell::from(company.phone.clone()),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(40),
            Constraint::Length(36),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Companies ({}) ", app.companies.len())),
    )
    .highlight_style(highlight());

    f.render_stateful_widget(table, right[1], &mut app.company_table_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut status_spans = vec![];

    match app.current_page {
        Page::DispensaryFinder => {
            status_spans.push(Span::styled(
                format!(" Filter: {} ", app.filter_mode.title()),
                Style::default().fg(Color::Green),
            ));
            status_spans.push(Span::raw("| "));
            status_spans.push(key("f"));
            status_spans.push(Span::raw(" City/State | "));
            status_spans.push(key("←/→"));
            status_spans.push(Span::raw(" Focus | "));
            status_spans.push(key("↑/↓"));
            status_spans.push(Span::raw(" Nav | "));
        }
        Page::CompanyInformation if app.editing_query => {
            status_spans.push(Span::styled(" Editing ", Style::default().fg(Color::Green)));
            status_spans.push(Span::raw("| "));
            status_spans.push(key("Enter/Esc"));
            status_spans.push(Span::raw(" Done | "));
        }
        Page::CompanyInformation => {
            status_spans.push(key(" /"));
            status_spans.push(Span::raw(" Search | "));
            status_spans.push(key("Ctrl+U"));
            status_spans.push(Span::raw(" Clear | "));
            status_spans.push(key("↑/↓"));
            status_spans.push(Span::raw(" State | "));
        }
    }

    status_spans.push(key("Tab"));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
