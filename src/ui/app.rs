use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::circulation::Circulation;
use crate::config::AdminCredentials;
use crate::error::{LibraryError, LibraryResult};
use crate::models::{Availability, Book, User};

use super::forms::FieldForm;
use super::helpers::{centered_rect, surface_error};
use super::screens::{BookScreen, BookView, UserScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const HEADER_HEIGHT: u16 = 3;
/// Failed logins tolerated before the app gives up and exits.
pub const MAX_LOGIN_ATTEMPTS: u8 = 3;
const PAGE_STEP: isize = 5;

/// High-level navigation states, cycled with Tab.
enum Screen {
    Books(BookScreen),
    Users(UserScreen),
}

impl Screen {
    fn tab_index(&self) -> usize {
        match self {
            Screen::Books(screen) if screen.view == BookView::Available => 0,
            Screen::Books(_) => 1,
            Screen::Users(_) => 2,
        }
    }
}

/// Fresh data for whichever screen asked for a refresh.
enum Refreshed {
    Books(Vec<Book>),
    Users(Vec<User>),
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Login(FieldForm),
    Normal,
    AddingBook(FieldForm),
    IssuingBook(FieldForm),
    ReturningBook(FieldForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    admin: AdminCredentials,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    failed_logins: u8,
}

impl App {
    /// Start at the login prompt. Nothing is read from the store until the
    /// admin has signed in.
    pub fn new(conn: Connection, admin: AdminCredentials) -> Self {
        Self {
            conn,
            admin,
            screen: Screen::Books(BookScreen::new(BookView::Available, Vec::new())),
            mode: Mode::Login(FieldForm::login()),
            status: None,
            failed_logins: 0,
        }
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Login(form) => self.handle_login(code, form, &mut exit),
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingBook(form) => self.handle_add_book(code, form),
            Mode::IssuingBook(form) => self.handle_issue(code, form),
            Mode::ReturningBook(form) => self.handle_return(code, form),
        };

        Ok(exit)
    }

    pub fn is_logged_in(&self) -> bool {
        !matches!(self.mode, Mode::Login(_))
    }

    fn circulation(&self) -> Circulation<'_> {
        Circulation::new(&self.conn)
    }

    fn handle_login(&mut self, code: KeyCode, mut form: FieldForm, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Esc => *exit = true,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter if !form.is_last_field() => form.next_field(),
            KeyCode::Enter => {
                if self.admin.verify(form.value(0), form.value(1)) {
                    tracing::info!(username = form.value(0), "admin logged in");
                    self.set_status("Logged in.", StatusKind::Info);
                    self.refresh_screen(None);
                    return Mode::Normal;
                }

                self.failed_logins += 1;
                tracing::warn!(attempt = self.failed_logins, "rejected login");
                if self.failed_logins >= MAX_LOGIN_ATTEMPTS {
                    self.set_status("Invalid credentials. Exiting...", StatusKind::Error);
                    *exit = true;
                } else {
                    let remaining = MAX_LOGIN_ATTEMPTS - self.failed_logins;
                    form.error = Some(format!(
                        "Invalid credentials. {remaining} attempt(s) left."
                    ));
                    form.clear(1);
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Login(form)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Tab => self.cycle_screen(1),
            KeyCode::BackTab => self.cycle_screen(-1),
            KeyCode::Char('b') | KeyCode::Char('B') => self.open_books(BookView::Available),
            KeyCode::Char('c') | KeyCode::Char('C') => self.open_books(BookView::Catalog),
            KeyCode::Char('u') | KeyCode::Char('U') => self.open_users(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.select_edge(true),
            KeyCode::End => self.select_edge(false),
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Mode::AddingBook(FieldForm::add_book());
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.clear_status();
                let (book_id, user_id) = match &self.screen {
                    Screen::Books(books) => (
                        books.current_book().map(|book| book.id.to_string()),
                        None,
                    ),
                    Screen::Users(users) => {
                        (None, users.current_user().map(|user| user.id.to_string()))
                    }
                };
                return Mode::IssuingBook(FieldForm::issue(book_id, user_id));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                let book_id = match &self.screen {
                    Screen::Books(books) if books.view == BookView::Catalog => books
                        .current_book()
                        .filter(|book| book.issued)
                        .map(|book| book.id.to_string()),
                    _ => None,
                };
                return Mode::ReturningBook(FieldForm::return_book(book_id));
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                self.clear_status();
                self.refresh_screen(None);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: FieldForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let outcome = self
                    .circulation()
                    .add_book(form.value(0).trim(), form.value(1).trim());
                match outcome {
                    Ok(book) => {
                        if book.has_blank_fields() {
                            self.set_status(
                                format!("Added book {} with a blank title or author.", book.id),
                                StatusKind::Warning,
                            );
                        } else {
                            self.set_status(
                                format!("Book added successfully (ID {}).", book.id),
                                StatusKind::Info,
                            );
                        }
                        self.refresh_screen(Some(&book));
                        return Mode::Normal;
                    }
                    Err(err) => self.report_form_error(&mut form, &err),
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::AddingBook(form)
    }

    fn handle_issue(&mut self, code: KeyCode, mut form: FieldForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Issue cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let outcome = self.circulation().issue_book(form.value(0), form.value(1));
                match outcome {
                    Ok(()) => {
                        self.set_status("Book issued successfully.", StatusKind::Info);
                        self.refresh_screen(None);
                        return Mode::Normal;
                    }
                    Err(err) => self.report_form_error(&mut form, &err),
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::IssuingBook(form)
    }

    fn handle_return(&mut self, code: KeyCode, mut form: FieldForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Return cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let outcome = self.circulation().return_book(form.value(0));
                match outcome {
                    Ok(()) => {
                        self.set_status("Book returned successfully.", StatusKind::Info);
                        self.refresh_screen(None);
                        return Mode::Normal;
                    }
                    Err(err) => self.report_form_error(&mut form, &err),
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::ReturningBook(form)
    }

    fn report_form_error(&mut self, form: &mut FieldForm, err: &LibraryError) {
        let message = surface_error(err);
        form.error = Some(message.clone());
        self.set_status(message, StatusKind::Error);
    }

    fn cycle_screen(&mut self, offset: isize) {
        self.clear_status();
        let next = (self.screen.tab_index() as isize + offset).rem_euclid(3);
        match next {
            0 => self.open_books(BookView::Available),
            1 => self.open_books(BookView::Catalog),
            _ => self.open_users(),
        }
    }

    fn open_books(&mut self, view: BookView) {
        match self.load_books(view) {
            Ok(books) => self.screen = Screen::Books(BookScreen::new(view, books)),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn open_users(&mut self) {
        let loaded = self.circulation().list_users();
        match loaded {
            Ok(users) => self.screen = Screen::Users(UserScreen::new(users)),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn load_books(&self, view: BookView) -> LibraryResult<Vec<Book>> {
        match view {
            BookView::Available => self.circulation().list_available_books(),
            BookView::Catalog => self.circulation().list_catalog(),
        }
    }

    /// Re-query whatever the current screen shows. Storage failures land in
    /// the footer and leave the stale list in place.
    fn refresh_screen(&mut self, focus: Option<&Book>) {
        let loaded = match &self.screen {
            Screen::Books(books) => self.load_books(books.view).map(Refreshed::Books),
            Screen::Users(_) => self.circulation().list_users().map(Refreshed::Users),
        };
        let refreshed = match loaded {
            Ok(refreshed) => refreshed,
            Err(err) => {
                self.set_status(surface_error(&err), StatusKind::Error);
                return;
            }
        };

        match (refreshed, &mut self.screen) {
            (Refreshed::Books(list), Screen::Books(books)) => {
                let current = books.current_book().cloned();
                books.set_books(list, focus.or(current.as_ref()));
            }
            (Refreshed::Users(list), Screen::Users(users)) => {
                users.users = list;
                users.selection.clamp(users.users.len());
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, offset: isize) {
        match &mut self.screen {
            Screen::Books(books) => {
                let len = books.len();
                books.selection.move_by(offset, len);
            }
            Screen::Users(users) => {
                let len = users.len();
                users.selection.move_by(offset, len);
            }
        }
    }

    fn select_edge(&mut self, first: bool) {
        match &mut self.screen {
            Screen::Books(books) if first => books.selection.first(),
            Screen::Books(books) => {
                let len = books.len();
                books.selection.last(len);
            }
            Screen::Users(users) if first => users.selection.first(),
            Screen::Users(users) => {
                let len = users.len();
                users.selection.last(len);
            }
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        if let Mode::Login(form) = &self.mode {
            self.draw_login(frame, area, form);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match &self.screen {
            Screen::Books(books) => self.draw_books(frame, chunks[1], books),
            Screen::Users(users) => self.draw_users(frame, chunks[1], users),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_form(frame, area, "Add New Book", form),
            Mode::IssuingBook(form) => self.draw_form(frame, area, "Issue Book", form),
            Mode::ReturningBook(form) => self.draw_form(frame, area, "Return Book", form),
            Mode::Login(_) | Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(vec![
            BookView::Available.title(),
            BookView::Catalog.title(),
            "Users",
        ])
        .select(self.screen.tab_index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Library Management System"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(tabs, area);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect, screen: &BookScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(screen.view.title());

        if screen.books.is_empty() {
            let text = match screen.view {
                BookView::Available => "No books available. Press 'a' to add one.",
                BookView::Catalog => "The catalog is empty. Press 'a' to add a book.",
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = screen
            .books
            .iter()
            .map(|book| {
                let mut spans = vec![Span::raw(book.summary())];
                if screen.view == BookView::Catalog {
                    let style = match book.availability() {
                        Availability::Available => Style::default().fg(Color::Green),
                        Availability::Issued => Style::default().fg(Color::Red),
                    };
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(format!("[{}]", book.availability()), style));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        self.render_list(frame, area, items, block, screen.selection.index);
    }

    fn draw_users(&self, frame: &mut Frame, area: Rect, screen: &UserScreen) {
        let block = Block::default().borders(Borders::ALL).title("Users");

        if screen.users.is_empty() {
            let message = Paragraph::new("No users registered.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = screen
            .users
            .iter()
            .map(|user| ListItem::new(user.summary()))
            .collect();

        self.render_list(frame, area, items, block, screen.selection.index);
    }

    fn render_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        items: Vec<ListItem<'static>>,
        block: Block<'static>,
        selected: usize,
    ) {
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[Tab]", " Switch View   "),
                ("[a]", " Add Book   "),
                ("[i]", " Issue   "),
                ("[r]", " Return   "),
                ("[g]", " Refresh   "),
                ("[q]", " Quit"),
            ],
            Mode::ReturningBook(_) => &[("[Enter]", " Save   "), ("[Esc]", " Cancel")],
            _ => &[
                ("[Enter]", " Save   "),
                ("[Tab]", " Next Field   "),
                ("[Esc]", " Cancel"),
            ],
        };

        Line::from(
            pairs
                .iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(label.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect, form: &FieldForm) {
        let background = Paragraph::new("Library Management System")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(background, area);
        self.draw_form(frame, area, "Admin Login", form);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &FieldForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = (0..form.fields.len())
            .map(|index| form.build_line(index))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to submit • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if inner.width > 0 && inner.height > form.active as u16 {
            let cursor_x = (inner.x + form.cursor_column()).min(inner.right().saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y + form.active as u16));
        }
    }
}
