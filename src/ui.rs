use crate::dates;
use crate::filter::{DateRange, GratitudeFilter};
use crate::gratitude_entry::GratitudeEntry;
use crate::journal_state::JournalState;
use crate::streak::JournalStats;
use chrono::{Datelike, NaiveDate};
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use std::{
    io::{stdout, Stdout},
    rc::Rc,
    time::{Duration, Instant},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const BAR_WIDTH: u16 = 5;
const BAR_GAP: u16 = 1;

pub enum Action {
    Write,
    View,
    Edit,
    Delete,
    Search,
    Filter,
    ResetFilter,
    Stats,
    ClearAll,
    Quit,
}

/// Text and date typed into the entry form, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub content: String,
    pub date: String,
}

/// Editable text with a cursor. The cursor is a byte offset that always sits
/// on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    text: String,
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    pub fn new(text: &str, multiline: bool) -> Self {
        TextInput {
            text: text.to_string(),
            cursor: text.len(),
            multiline,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn with_cursor(&self, marker: char) -> String {
        let mut rendered = self.text.clone();
        rendered.insert(self.cursor, marker);
        rendered
    }

    pub fn insert(&mut self, c: char) {
        if c == '\n' && !self.multiline {
            return;
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.text.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    fn line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(self.text.len())
    }

    fn column(&self) -> usize {
        self.text[self.line_start(self.cursor)..self.cursor]
            .chars()
            .count()
    }

    /// Byte offset of `column` within the line starting at `start`, clamped
    /// to the end of that line.
    fn offset_in_line(&self, start: usize, column: usize) -> usize {
        let line = &self.text[start..self.line_end(start)];
        start
            + line
                .char_indices()
                .nth(column)
                .map(|(i, _)| i)
                .unwrap_or(line.len())
    }

    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return;
        }
        let column = self.column();
        let previous_start = self.line_start(start - 1);
        self.cursor = self.offset_in_line(previous_start, column);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.text.len() {
            return;
        }
        let column = self.column();
        self.cursor = self.offset_in_line(end + 1, column);
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Enter => self.insert('\n'),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Home => self.cursor = self.line_start(self.cursor),
            KeyCode::End => self.cursor = self.line_end(self.cursor),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryField {
    Content,
    Date,
}

/// Cuts `text` to fit `max_width` terminal columns, ending with `…` when
/// something was dropped.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width - 1 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn entry_items(entries: &[GratitudeEntry], width: usize) -> Vec<ListItem<'static>> {
    entries
        .iter()
        .map(|e| {
            ListItem::new(truncate_to_width(
                &format!("[{}] {}", e.date, e.headline()),
                width,
            ))
        })
        .collect()
}

fn grouped_items(
    groups: &[(String, Vec<GratitudeEntry>)],
    today: NaiveDate,
    width: usize,
) -> Vec<ListItem<'static>> {
    let mut items = Vec::new();
    for (date, entries) in groups {
        items.push(ListItem::new(Line::from(Span::styled(
            format!("{} ({})", dates::format_date_label(date, today), entries.len()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))));
        for entry in entries {
            items.push(ListItem::new(truncate_to_width(
                &format!("  • {}", entry.headline()),
                width,
            )));
        }
    }
    items
}

fn key_legend(keys: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw("Press ")];
    for (i, (key, label)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::styled(
            *key,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" to {}", label)));
    }
    Line::from(spans)
}

fn title(text: impl Into<String>) -> Paragraph<'static> {
    Paragraph::new(text.into())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}

fn instructions(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

fn input_block(label: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(label)
}

/// Title, body, instructions.
fn three_rows(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(area)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn is_cancel(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

fn read_key() -> Result<Option<KeyEvent>> {
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

fn poll_key(timeout: Duration) -> Result<Option<KeyEvent>> {
    if event::poll(timeout)? {
        read_key()
    } else {
        Ok(None)
    }
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    cursor_visible: bool,
    last_cursor_update: Instant,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            cursor_visible: true,
            last_cursor_update: Instant::now(),
        })
    }

    pub fn display(
        &mut self,
        journal: &JournalState,
        filter: &GratitudeFilter,
        status: Option<&str>,
    ) -> Result<()> {
        let today = dates::today();
        let streak = journal.streak(today);
        let groups = journal.grouped_entries(filter);
        let empty = journal.is_empty();
        let total = journal.get_entries().len();
        let shown: usize = groups.iter().map(|(_, entries)| entries.len()).sum();

        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(2),
                    Constraint::Length(1),
                ])
                .split(f.area());

            let heading = if streak > 0 {
                format!("Gratitude Journal · {}-day streak", streak)
            } else {
                "Gratitude Journal".to_string()
            };
            f.render_widget(title(heading), chunks[0]);

            let summary_color = if filter.is_active() {
                Color::Magenta
            } else {
                Color::DarkGray
            };
            let summary = Paragraph::new(format!(
                "Showing {} of {} · {}",
                shown,
                total,
                filter.summary()
            ))
            .style(Style::default().fg(summary_color));
            f.render_widget(summary, chunks[1]);

            let width = chunks[2].width.saturating_sub(2) as usize;
            let items = if groups.is_empty() {
                let message = if empty {
                    "No entries yet. Press w to write one."
                } else {
                    "No entries match the current filter."
                };
                vec![ListItem::new(message)]
            } else {
                grouped_items(&groups, today, width)
            };
            let entries_list =
                List::new(items).block(Block::default().borders(Borders::ALL).title("Entries"));
            f.render_widget(entries_list, chunks[2]);

            let controls = if empty {
                key_legend(&[("w", "write"), ("t", "see stats"), ("q", "quit")])
            } else {
                key_legend(&[
                    ("w", "write"),
                    ("v", "view"),
                    ("e", "edit"),
                    ("d", "delete"),
                    ("s", "search"),
                    ("f", "filter"),
                    ("r", "reset filter"),
                    ("t", "see stats"),
                    ("c", "clear all"),
                    ("q", "quit"),
                ])
            };
            let controls_paragraph = Paragraph::new(controls)
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(controls_paragraph, chunks[3]);

            if let Some(message) = status {
                f.render_widget(
                    Paragraph::new(message).style(Style::default().fg(Color::Green)),
                    chunks[4],
                );
            }
        })?;

        Ok(())
    }

    pub fn handle_input(&self, journal: &JournalState) -> Result<Option<Action>> {
        let Some(key) = read_key()? else {
            return Ok(None);
        };
        let has_entries = !journal.is_empty();

        let action = match key.code {
            KeyCode::Char('w') => Some(Action::Write),
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('t') => Some(Action::Stats),
            KeyCode::Char('v') if has_entries => Some(Action::View),
            KeyCode::Char('e') if has_entries => Some(Action::Edit),
            KeyCode::Char('d') if has_entries => Some(Action::Delete),
            KeyCode::Char('s') if has_entries => Some(Action::Search),
            KeyCode::Char('f') if has_entries => Some(Action::Filter),
            KeyCode::Char('r') if has_entries => Some(Action::ResetFilter),
            KeyCode::Char('c') if has_entries => Some(Action::ClearAll),
            _ => None,
        };
        Ok(action)
    }

    pub fn get_new_entry(&mut self) -> Result<Option<EntryDraft>> {
        let today = dates::format_entry_date(dates::today());
        self.entry_form("New Gratitude Entry", "", &today)
    }

    pub fn edit_entry(&mut self, entry: &GratitudeEntry) -> Result<Option<GratitudeEntry>> {
        let draft = self.entry_form("Edit Gratitude Entry", &entry.content, &entry.date)?;
        Ok(draft.map(|draft| GratitudeEntry {
            content: draft.content,
            date: draft.date,
            ..entry.clone()
        }))
    }

    /// Esc keeps what was typed, Ctrl-C throws it away.
    fn entry_form(
        &mut self,
        heading: &str,
        content: &str,
        date: &str,
    ) -> Result<Option<EntryDraft>> {
        let mut content = TextInput::new(content, true);
        let mut date = TextInput::new(date, false);
        let mut focus = EntryField::Content;

        loop {
            let now = Instant::now();
            if now.duration_since(self.last_cursor_update) >= Duration::from_millis(500) {
                self.cursor_visible = !self.cursor_visible;
                self.last_cursor_update = now;
            }
            let cursor_visible = self.cursor_visible;

            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(6),
                        Constraint::Length(3),
                        Constraint::Length(3),
                    ])
                    .split(f.area());

                f.render_widget(title(heading), chunks[0]);

                let render = |input: &TextInput, field: EntryField| {
                    if focus == field && cursor_visible {
                        input.with_cursor('|')
                    } else {
                        input.text().to_string()
                    }
                };

                let content_input = Paragraph::new(render(&content, EntryField::Content))
                    .wrap(Wrap { trim: false })
                    .block(input_block(
                        "What are you grateful for?",
                        focus == EntryField::Content,
                    ));
                f.render_widget(content_input, chunks[1]);

                let date_input = Paragraph::new(render(&date, EntryField::Date))
                    .block(input_block("Date (YYYY-MM-DD)", focus == EntryField::Date));
                f.render_widget(date_input, chunks[2]);

                f.render_widget(
                    instructions("Tab: Switch field, Esc: Save, Ctrl-C: Discard"),
                    chunks[3],
                );
            })?;

            let Some(key) = poll_key(Duration::from_millis(50))? else {
                continue;
            };
            if is_cancel(&key) {
                return Ok(None);
            }
            match key.code {
                KeyCode::Esc => break,
                KeyCode::Tab | KeyCode::BackTab => {
                    focus = match focus {
                        EntryField::Content => EntryField::Date,
                        EntryField::Date => EntryField::Content,
                    };
                }
                code => {
                    match focus {
                        EntryField::Content => content.handle_key(code),
                        EntryField::Date => date.handle_key(code),
                    }
                    self.cursor_visible = true;
                    self.last_cursor_update = Instant::now();
                }
            }
        }

        Ok(Some(EntryDraft {
            content: content.text().to_string(),
            date: date.text().to_string(),
        }))
    }

    fn pick_entry(
        &mut self,
        heading: &str,
        entries: &[GratitudeEntry],
        hint: &str,
        initial: usize,
    ) -> Result<Option<usize>> {
        if entries.is_empty() {
            return Ok(None);
        }
        let mut selected_index = initial.min(entries.len() - 1);

        loop {
            self.terminal.draw(|f| {
                let chunks = three_rows(f.area());
                f.render_widget(title(heading), chunks[0]);

                let width = chunks[1].width.saturating_sub(4) as usize;
                let entries_list = List::new(entry_items(entries, width))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(format!("Entries ({})", entries.len())),
                    )
                    .highlight_style(Style::default().add_modifier(Modifier::BOLD))
                    .highlight_symbol("> ");

                f.render_stateful_widget(
                    entries_list,
                    chunks[1],
                    &mut ListState::default().with_selected(Some(selected_index)),
                );

                f.render_widget(instructions(hint), chunks[2]);
            })?;

            if let Some(key) = read_key()? {
                match key.code {
                    KeyCode::Up => selected_index = selected_index.saturating_sub(1),
                    KeyCode::Down => {
                        if selected_index + 1 < entries.len() {
                            selected_index += 1;
                        }
                    }
                    KeyCode::Enter => return Ok(Some(selected_index)),
                    KeyCode::Esc => return Ok(None),
                    _ => {}
                }
            }
        }
    }

    pub fn view_entries(&mut self, heading: &str, entries: &[GratitudeEntry]) -> Result<()> {
        let hint = "Up/Down: Navigate, Enter: View full entry, Esc: Back";
        let mut last = 0;
        while let Some(index) = self.pick_entry(heading, entries, hint, last)? {
            self.view_full_entry(&entries[index])?;
            last = index;
        }
        Ok(())
    }

    pub fn select_entry(
        &mut self,
        heading: &str,
        entries: &[GratitudeEntry],
    ) -> Result<Option<GratitudeEntry>> {
        let hint = "Up/Down: Navigate, Enter: Select, Esc: Cancel";
        Ok(self
            .pick_entry(heading, entries, hint, 0)?
            .map(|index| entries[index].clone()))
    }

    fn view_full_entry(&mut self, entry: &GratitudeEntry) -> Result<()> {
        let today = dates::today();
        loop {
            self.terminal.draw(|f| {
                let chunks = three_rows(f.area());

                let heading = format!("Entry from {}", dates::format_date_label(&entry.date, today));
                f.render_widget(title(heading), chunks[0]);

                let content = Paragraph::new(entry.content.clone())
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::ALL).title(format!(
                        "#{} · {} · written {}",
                        entry.id,
                        entry.date,
                        entry.created_at.format("%Y-%m-%d %H:%M")
                    )));
                f.render_widget(content, chunks[1]);

                f.render_widget(instructions("Any key: Back"), chunks[2]);
            })?;

            if read_key()?.is_some() {
                break;
            }
        }

        Ok(())
    }

    /// Yes/no popup over the current screen. Enter counts as yes.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        loop {
            self.terminal.draw(|f| {
                let width = (prompt.width() as u16).saturating_add(6).max(30);
                let area = centered(f.area(), width, 5);
                let dialog = Paragraph::new(vec![
                    Line::from(prompt),
                    Line::from(""),
                    key_legend(&[("y", "confirm"), ("n", "cancel")]),
                ])
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red))
                        .title("Confirm"),
                );
                f.render_widget(Clear, area);
                f.render_widget(dialog, area);
            })?;

            if let Some(key) = read_key()? {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => return Ok(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                    _ => {}
                }
            }
        }
    }

    pub fn get_search_query(&mut self) -> Result<Option<String>> {
        let mut query = TextInput::new("", false);

        loop {
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Min(1),
                    ])
                    .split(f.area());

                f.render_widget(title("Search Entries"), chunks[0]);

                let search_input = Paragraph::new(query.with_cursor('|'))
                    .block(input_block("Search Query", true));
                f.render_widget(search_input, chunks[1]);

                f.render_widget(instructions("Enter: Submit, Esc: Cancel"), chunks[2]);
            })?;

            if let Some(key) = read_key()? {
                match key.code {
                    KeyCode::Enter => return Ok(Some(query.text().to_string())),
                    KeyCode::Esc => return Ok(None),
                    code => query.handle_key(code),
                }
            }
        }
    }

    pub fn display_search_results(&mut self, query: &str, results: &[GratitudeEntry]) -> Result<()> {
        self.view_entries(&format!("Results for \"{}\"", query), results)
    }

    /// Form for date range, keyword and sort order. Returns `None` when the
    /// user backs out.
    pub fn edit_filter(&mut self, current: &GratitudeFilter) -> Result<Option<GratitudeFilter>> {
        const SORT_FIELD: usize = 3;
        const LABELS: [&str; 3] = [
            "Start date (YYYY-MM-DD, blank for no limit)",
            "End date (YYYY-MM-DD, blank for no limit)",
            "Keyword",
        ];

        let bound = |date: Option<NaiveDate>| {
            date.filter(|d| *d != NaiveDate::MIN && *d != NaiveDate::MAX)
                .map(dates::format_entry_date)
                .unwrap_or_default()
        };
        let mut fields = [
            TextInput::new(&bound(current.date_range.map(|r| r.start())), false),
            TextInput::new(&bound(current.date_range.map(|r| r.end())), false),
            TextInput::new(current.keyword.as_deref().unwrap_or(""), false),
        ];
        let mut sort_order = current.sort_order;
        let mut focus = 0;
        let mut error: Option<String> = None;

        loop {
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Length(1),
                        Constraint::Min(3),
                    ])
                    .split(f.area());

                f.render_widget(title("Filter Entries"), chunks[0]);

                for (i, field) in fields.iter().enumerate() {
                    let text = if focus == i {
                        field.with_cursor('|')
                    } else {
                        field.text().to_string()
                    };
                    f.render_widget(
                        Paragraph::new(text).block(input_block(LABELS[i], focus == i)),
                        chunks[1 + i],
                    );
                }

                let sort = Paragraph::new(format!("◀ {} ▶", sort_order.label()))
                    .alignment(Alignment::Center)
                    .block(input_block("Sort order", focus == SORT_FIELD));
                f.render_widget(sort, chunks[4]);

                if let Some(message) = &error {
                    f.render_widget(
                        Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red)),
                        chunks[5],
                    );
                }

                f.render_widget(
                    instructions("Tab: Next field, Left/Right: Change sort, Enter: Apply, Esc: Cancel"),
                    chunks[6],
                );
            })?;

            let Some(key) = read_key()? else {
                continue;
            };
            match key.code {
                KeyCode::Esc => return Ok(None),
                KeyCode::Tab | KeyCode::Down => focus = (focus + 1) % (SORT_FIELD + 1),
                KeyCode::BackTab | KeyCode::Up => focus = (focus + SORT_FIELD) % (SORT_FIELD + 1),
                KeyCode::Left if focus == SORT_FIELD => sort_order = sort_order.previous(),
                KeyCode::Right if focus == SORT_FIELD => sort_order = sort_order.next(),
                KeyCode::Enter => match DateRange::parse(fields[0].text(), fields[1].text()) {
                    Ok(date_range) => {
                        let keyword = fields[2].text().trim();
                        return Ok(Some(GratitudeFilter {
                            date_range,
                            keyword: (!keyword.is_empty()).then(|| keyword.to_string()),
                            sort_order,
                        }));
                    }
                    Err(e) => error = Some(e.to_string()),
                },
                code if focus < SORT_FIELD => fields[focus].handle_key(code),
                _ => {}
            }
        }
    }

    pub fn view_stats(&mut self, stats: &JournalStats) -> Result<()> {
        loop {
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Length(6),
                        Constraint::Min(8),
                        Constraint::Length(3),
                    ])
                    .split(f.area());

                f.render_widget(title("Statistics"), chunks[0]);

                let bold = Style::default().add_modifier(Modifier::BOLD);
                let row = |label: &'static str, value: String| {
                    Line::from(vec![Span::raw(label), Span::styled(value, bold)])
                };
                let summary = Paragraph::new(vec![
                    row("Total entries:   ", stats.total_entries.to_string()),
                    row("Days written:    ", stats.active_days.to_string()),
                    row("Current streak:  ", format!("{} days", stats.current_streak)),
                    row("Longest streak:  ", format!("{} days", stats.longest_streak)),
                ])
                .block(Block::default().borders(Borders::ALL).title("Summary"));
                f.render_widget(summary, chunks[1]);

                let chart_area = chunks[2];
                let slots = (chart_area.width.saturating_sub(2) / (BAR_WIDTH + BAR_GAP)).max(1);
                let counts = &stats.daily_counts;
                let recent = &counts[counts.len().saturating_sub(slots as usize)..];
                let labels: Vec<(String, u64)> = recent
                    .iter()
                    .map(|(day, n)| (format!("{}.{}", day.month(), day.day()), *n as u64))
                    .collect();
                let data: Vec<(&str, u64)> =
                    labels.iter().map(|(l, n)| (l.as_str(), *n)).collect();

                let chart_block = Block::default()
                    .borders(Borders::ALL)
                    .title("Entries per day");
                if data.is_empty() {
                    f.render_widget(
                        Paragraph::new("Nothing to chart yet.")
                            .alignment(Alignment::Center)
                            .block(chart_block),
                        chart_area,
                    );
                } else {
                    let chart = BarChart::default()
                        .block(chart_block)
                        .data(data.as_slice())
                        .bar_width(BAR_WIDTH)
                        .bar_gap(BAR_GAP)
                        .bar_style(Style::default().fg(Color::Blue))
                        .value_style(Style::default().fg(Color::White).bg(Color::Blue));
                    f.render_widget(chart, chart_area);
                }

                f.render_widget(instructions("Any key: Back"), chunks[3]);
            })?;

            if read_key()?.is_some() {
                break;
            }
        }

        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_deleting_multibyte_text() {
        let mut input = TextInput::new("", true);
        for c in "감사 day".chars() {
            input.insert(c);
        }
        assert_eq!(input.text(), "감사 day");

        input.move_left();
        input.move_left();
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.text(), "감 day");
        assert_eq!(input.with_cursor('|'), "감| day");

        input.delete();
        assert_eq!(input.text(), "감day");
    }

    #[test]
    fn single_line_input_ignores_newlines() {
        let mut input = TextInput::new("2024-06-15", false);
        input.handle_key(KeyCode::Enter);
        assert_eq!(input.text(), "2024-06-15");
    }

    #[test]
    fn vertical_movement_keeps_column() {
        let mut input = TextInput::new("first line\nab\nthird line", true);
        input.move_up();
        assert_eq!(input.with_cursor('|'), "first line\nab|\nthird line");

        input.move_up();
        assert_eq!(input.with_cursor('|'), "fi|rst line\nab\nthird line");

        input.move_down();
        input.move_down();
        assert_eq!(input.with_cursor('|'), "first line\nab\nth|ird line");

        input.move_down();
        assert_eq!(input.with_cursor('|'), "first line\nab\nth|ird line");
    }

    #[test]
    fn home_and_end_stay_on_the_current_line() {
        let mut input = TextInput::new("one\ntwo", true);
        input.handle_key(KeyCode::Home);
        assert_eq!(input.with_cursor('|'), "one\n|two");
        input.handle_key(KeyCode::Up);
        input.handle_key(KeyCode::End);
        assert_eq!(input.with_cursor('|'), "one|\ntwo");
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("a longer line", 6), "a lon…");
        // Hangul syllables are two columns wide.
        assert_eq!(truncate_to_width("감사합니다", 5), "감사…");
        assert_eq!(truncate_to_width("anything", 0), "");
    }

    #[test]
    fn centered_rect_is_clamped_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered(area, 40, 40), area);
    }

    #[test]
    fn legend_lists_each_key() {
        let line = key_legend(&[("w", "write"), ("q", "quit")]);
        let text: String = line.spans.iter().map(|s| &*s.content).collect();
        assert_eq!(text, "Press w to write, q to quit");
    }
}
