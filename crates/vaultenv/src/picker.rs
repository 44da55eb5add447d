//! Interactive single-choice picker using ratatui
//!
//! Items are narrowed by a fuzzy filter as the user types. Best matches are
//! listed first; equal scores keep the order the items were given in.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::cmp::Reverse;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors from an interactive selection
#[derive(Debug, Error)]
pub enum SelectError {
    /// The user dismissed the picker without choosing
    #[error("Selection cancelled")]
    Cancelled,

    /// The terminal could not be driven
    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// Asks the user to pick exactly one item.
pub trait Selector {
    /// Present `items` under `prompt` and return the chosen one.
    fn choose(&mut self, prompt: &str, items: &[String]) -> Result<String, SelectError>;
}

/// Full-screen fuzzy picker on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct FuzzyPicker;

impl FuzzyPicker {
    /// Create a picker for the current terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Selector for FuzzyPicker {
    fn choose(&mut self, prompt: &str, items: &[String]) -> Result<String, SelectError> {
        tracing::debug!(prompt, count = items.len(), "Opening picker");

        let mut guard = TerminalGuard::enter()?;
        let mut state = PickerState::new(prompt, items.to_vec());
        let outcome = run_event_loop(&mut guard.terminal, &mut state);
        drop(guard);

        match outcome? {
            Outcome::Selected(item) => {
                tracing::debug!(prompt, item = %item, "Picker selection");
                Ok(item)
            }
            Outcome::Cancelled => Err(SelectError::Cancelled),
        }
    }
}

/// Raw mode and alternate screen for the lifetime of the value.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                restore_terminal(&mut io::stdout());
                Err(e)
            }
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal(self.terminal.backend_mut());
        let _ = self.terminal.show_cursor();
    }
}

fn restore_terminal<W: io::Write>(out: &mut W) {
    if let Err(e) = disable_raw_mode() {
        tracing::warn!(error = %e, "Failed to disable raw mode");
    }
    if let Err(e) = execute!(out, LeaveAlternateScreen) {
        tracing::warn!(error = %e, "Failed to leave alternate screen");
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Selected(String),
    Cancelled,
}

struct PickerState {
    prompt: String,
    items: Vec<String>,
    filter: String,
    /// Indices into `items`, best match first
    matches: Vec<usize>,
    list_state: ListState,
}

impl PickerState {
    fn new(prompt: &str, items: Vec<String>) -> Self {
        let mut state = Self {
            prompt: prompt.to_string(),
            items,
            filter: String::new(),
            matches: Vec::new(),
            list_state: ListState::default(),
        };
        state.update_filter();
        state
    }

    fn update_filter(&mut self) {
        let mut scored: Vec<(usize, i64)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| fuzzy_score(&self.filter, item).map(|score| (i, score)))
            .collect();
        // stable: ties keep input order
        scored.sort_by_key(|&(_, score)| Reverse(score));
        self.matches = scored.into_iter().map(|(i, _)| i).collect();

        if self.matches.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    fn select_previous(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.matches.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn select_next(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.matches.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    fn selected_item(&self) -> Option<&str> {
        self.list_state
            .selected()
            .and_then(|i| self.matches.get(i))
            .map(|&idx| self.items[idx].as_str())
    }

    /// Apply a key press. Returns an outcome once the picker should close.
    fn handle_key(&mut self, key: KeyEvent) -> Option<Outcome> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Some(Outcome::Cancelled),
            KeyCode::Char('c') if ctrl => return Some(Outcome::Cancelled),

            KeyCode::Enter => {
                return self
                    .selected_item()
                    .map(|item| Outcome::Selected(item.to_string()));
            }

            KeyCode::Up => self.select_previous(),
            KeyCode::Char('p') if ctrl => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Char('n') if ctrl => self.select_next(),

            KeyCode::Char('u') if ctrl => {
                self.filter.clear();
                self.update_filter();
            }
            KeyCode::Char(c) if !ctrl => {
                self.filter.push(c);
                self.update_filter();
            }
            KeyCode::Backspace => {
                if self.filter.pop().is_some() {
                    self.update_filter();
                }
            }

            _ => {}
        }
        None
    }
}

/// Score `candidate` against `pattern` as a case-insensitive in-order
/// subsequence. `None` means no match; higher is better.
///
/// Consecutive matches score higher, as do matches at the very start or
/// right after a separator (`/`, `-`, `_`, `.`, space).
pub fn fuzzy_score(pattern: &str, candidate: &str) -> Option<i64> {
    if pattern.is_empty() {
        return Some(0);
    }

    let candidate: Vec<char> = candidate.to_lowercase().chars().collect();
    let mut score = 0_i64;
    let mut next = 0_usize;
    let mut last_match: Option<usize> = None;

    for pc in pattern.to_lowercase().chars() {
        let offset = candidate[next..].iter().position(|&c| c == pc)?;
        let pos = next + offset;

        score += 1;
        if pos == 0 {
            score += 10;
        } else if matches!(candidate[pos - 1], '/' | '-' | '_' | '.' | ' ') {
            score += 4;
        }
        if last_match.is_some_and(|last| last + 1 == pos) {
            score += 6;
        }

        last_match = Some(pos);
        next = pos + 1;
    }

    Some(score)
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut PickerState,
) -> io::Result<Outcome> {
    loop {
        terminal.draw(|f| draw_ui(f, state))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(outcome) = state.handle_key(key)
        {
            return Ok(outcome);
        }
    }
}

fn draw_ui(f: &mut Frame, state: &mut PickerState) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // filter input
        Constraint::Min(3),    // matches
        Constraint::Length(1), // help
    ])
    .split(f.area());

    draw_filter_input(f, state, chunks[0]);
    draw_match_list(f, state, chunks[1]);
    draw_help_footer(f, chunks[2]);
}

fn draw_filter_input(f: &mut Frame, state: &PickerState, area: Rect) {
    let (text, style) = if state.filter.is_empty() {
        (
            "Type to filter...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (state.filter.clone(), Style::default().fg(Color::Cyan))
    };

    let title = format!(" {} ({}/{}) ", state.prompt, state.matches.len(), state.items.len());
    let input = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(input, area);

    let typed = u16::try_from(state.filter.chars().count()).unwrap_or(u16::MAX);
    let cursor_x = area
        .x
        .saturating_add(1)
        .saturating_add(typed)
        .min((area.x + area.width).saturating_sub(2));
    f.set_cursor_position((cursor_x, area.y + 1));
}

fn draw_match_list(f: &mut Frame, state: &mut PickerState, area: Rect) {
    let items: Vec<ListItem> = state
        .matches
        .iter()
        .map(|&idx| {
            ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Cyan)),
                Span::raw(state.items[idx].as_str()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::RIGHT)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut state.list_state);
}

fn draw_help_footer(f: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled("↑/↓", Style::default().fg(Color::Cyan)),
        Span::raw(" navigate │ "),
        Span::styled("enter", Style::default().fg(Color::Cyan)),
        Span::raw(" select │ "),
        Span::styled("esc", Style::default().fg(Color::Cyan)),
        Span::raw(" cancel │ type to filter"),
    ]);

    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .centered();
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(items: &[&str]) -> PickerState {
        PickerState::new(
            "Select resource",
            items.iter().map(ToString::to_string).collect(),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(state: &mut PickerState, text: &str) {
        for c in text.chars() {
            assert_eq!(state.handle_key(key(KeyCode::Char(c))), None);
        }
    }

    fn visible(state: &PickerState) -> Vec<&str> {
        state
            .matches
            .iter()
            .map(|&i| state.items[i].as_str())
            .collect()
    }

    #[test]
    fn test_fuzzy_score_subsequence() {
        assert!(fuzzy_score("bap", "billing-api").is_some());
        assert!(fuzzy_score("BAPI", "billing-api").is_some());
        assert!(fuzzy_score("pab", "billing-api").is_none());
        assert!(fuzzy_score("x", "billing-api").is_none());
        assert_eq!(fuzzy_score("", "anything"), Some(0));
    }

    #[test]
    fn test_fuzzy_score_prefers_contiguous_and_prefix() {
        let contiguous = fuzzy_score("api", "api-gateway").unwrap();
        let scattered = fuzzy_score("api", "a-p-i").unwrap();
        assert!(contiguous > scattered);

        let prefix = fuzzy_score("bill", "billing").unwrap();
        let inner = fuzzy_score("bill", "prebilling").unwrap();
        assert!(prefix > inner);

        let boundary = fuzzy_score("w", "api-worker").unwrap();
        let middle = fuzzy_score("w", "apiworker").unwrap();
        assert!(boundary > middle);
    }

    #[test]
    fn test_filter_narrows_and_ranks() {
        let mut picker = state(&["worker", "billing-api", "api", "web"]);
        assert_eq!(visible(&picker), vec!["worker", "billing-api", "api", "web"]);

        type_str(&mut picker, "api");
        assert_eq!(visible(&picker), vec!["api", "billing-api"]);
        assert_eq!(picker.list_state.selected(), Some(0));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut picker = state(&["staging", "development", "sandbox"]);
        type_str(&mut picker, "n");
        assert_eq!(visible(&picker), vec!["staging", "development", "sandbox"]);
    }

    #[test]
    fn test_backspace_widens_filter() {
        let mut picker = state(&["development", "staging"]);
        type_str(&mut picker, "dx");
        assert!(visible(&picker).is_empty());
        assert_eq!(picker.list_state.selected(), None);

        picker.handle_key(key(KeyCode::Backspace));
        assert_eq!(visible(&picker), vec!["development"]);

        picker.handle_key(ctrl('u'));
        assert_eq!(visible(&picker).len(), 2);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut picker = state(&["a", "b", "c"]);
        assert_eq!(picker.list_state.selected(), Some(0));

        picker.handle_key(key(KeyCode::Down));
        assert_eq!(picker.list_state.selected(), Some(1));
        picker.handle_key(ctrl('n'));
        assert_eq!(picker.list_state.selected(), Some(2));
        picker.handle_key(key(KeyCode::Down));
        assert_eq!(picker.list_state.selected(), Some(0));

        picker.handle_key(ctrl('p'));
        assert_eq!(picker.list_state.selected(), Some(2));
        picker.handle_key(key(KeyCode::Up));
        assert_eq!(picker.list_state.selected(), Some(1));
    }

    #[test]
    fn test_enter_returns_highlighted_match() {
        let mut picker = state(&["development", "staging"]);
        type_str(&mut picker, "stg");
        assert_eq!(
            picker.handle_key(key(KeyCode::Enter)),
            Some(Outcome::Selected("staging".to_string()))
        );
    }

    #[test]
    fn test_enter_after_navigation() {
        let mut picker = state(&["development", "staging"]);
        picker.handle_key(key(KeyCode::Down));
        assert_eq!(
            picker.handle_key(key(KeyCode::Enter)),
            Some(Outcome::Selected("staging".to_string()))
        );
    }

    #[test]
    fn test_cancel_keys() {
        let mut picker = state(&["a"]);
        assert_eq!(picker.handle_key(key(KeyCode::Esc)), Some(Outcome::Cancelled));
        assert_eq!(picker.handle_key(ctrl('c')), Some(Outcome::Cancelled));
    }

    #[test]
    fn test_empty_list_can_only_cancel() {
        let mut picker = state(&[]);
        assert_eq!(picker.list_state.selected(), None);
        assert_eq!(picker.handle_key(key(KeyCode::Enter)), None);
        picker.handle_key(key(KeyCode::Down));
        assert_eq!(picker.handle_key(key(KeyCode::Enter)), None);
        assert_eq!(picker.handle_key(key(KeyCode::Esc)), Some(Outcome::Cancelled));
    }

    #[test]
    fn test_enter_with_no_match_does_nothing() {
        let mut picker = state(&["staging"]);
        type_str(&mut picker, "zzz");
        assert_eq!(picker.handle_key(key(KeyCode::Enter)), None);
    }
}
