// Parade TUI: option buttons, hover preview, and the pick flow.
//
// The TUI owns a `ViewState` mirroring the session's displayed options. The
// loop is synchronous: poll for a key event, let `input::handle_key` either
// mutate the view locally (hover movement) or return a `Command` that the
// loop executes against the `ParadeSession`, then re-render.

pub mod input;

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tracing::info;

use crate::clan::Rgb;
use crate::session::{ParadeOption, ParadeSession};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A key press the loop must act on (everything else mutates `ViewState`
/// directly inside the input handler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Commit the option at this sub-draw index.
    Pick(usize),
    Quit,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// What the parade screen is currently doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Options on screen, no pick committed yet.
    Choosing,
    /// A pick was committed; the label is the chosen clan's display name.
    Chosen(String),
}

/// TUI-local state for rendering and input dispatch.
pub struct ViewState {
    /// The displayed options, in sub-draw order.
    pub options: Vec<ParadeOption>,
    /// Index of the hovered option; meaningless when `options` is empty.
    pub cursor: usize,
    /// Digit keys bound to option indices. Rebuilt whenever the sub-draw
    /// changes so stale bindings from a previous draw can never fire.
    pub bindings: Vec<char>,
    pub phase: Phase,
    pub confirm_quit: bool,
    pub profile_name: String,
}

impl ViewState {
    pub fn new(profile_name: &str) -> Self {
        ViewState {
            options: Vec::new(),
            cursor: 0,
            bindings: Vec::new(),
            phase: Phase::Choosing,
            confirm_quit: false,
            profile_name: profile_name.to_string(),
        }
    }

    /// Replace the displayed options and rebuild the digit binding table.
    /// The cursor resets to the first option.
    pub fn set_options(&mut self, options: Vec<ParadeOption>) {
        self.bindings = (1..=options.len().min(9))
            .map(|n| char::from_digit(n as u32, 10).unwrap_or('?'))
            .collect();
        self.options = options;
        self.cursor = 0;
    }

    /// The hovered option, if any.
    pub fn hovered(&self) -> Option<&ParadeOption> {
        self.options.get(self.cursor)
    }

    pub fn move_cursor_left(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.cursor = if self.cursor == 0 {
            self.options.len() - 1
        } else {
            self.cursor - 1
        };
    }

    pub fn move_cursor_right(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.options.len();
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Render the complete parade frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(7),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_title(frame, rows[0], state);
    render_options(frame, rows[1], state);
    render_preview(frame, rows[2], state);
    render_help_bar(frame, rows[3], state);
}

fn render_title(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = match &state.phase {
        Phase::Choosing => format!(" Clan parade for `{}`: choose a clan", state.profile_name),
        Phase::Chosen(name) => {
            format!(" Clan parade for `{}`: {} assigned", state.profile_name, name)
        }
    };
    let paragraph =
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Parade"));
    frame.render_widget(paragraph, area);
}

fn render_options(frame: &mut Frame, area: Rect, state: &ViewState) {
    if state.options.is_empty() {
        let paragraph = Paragraph::new("No clans to show. The pool is empty; press q to quit.")
            .block(Block::default().borders(Borders::ALL).title("Options"));
        frame.render_widget(paragraph, area);
        return;
    }

    let constraints: Vec<Constraint> = state
        .options
        .iter()
        .map(|_| Constraint::Ratio(1, state.options.len() as u32))
        .collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, option) in state.options.iter().enumerate() {
        let hovered = i == state.cursor;
        let key = state.bindings.get(i).copied().unwrap_or('?');
        let title = format!("[{key}]");

        let mut name_style = Style::default().fg(to_color(option.color));
        let mut block = Block::default().borders(Borders::ALL).title(title);
        if hovered {
            name_style = name_style.add_modifier(Modifier::BOLD);
            block = block.border_style(Style::default().fg(to_color(option.color)));
        }

        let paragraph = Paragraph::new(Line::from(Span::styled(option.name.clone(), name_style)))
            .block(block);
        frame.render_widget(paragraph, columns[i]);
    }
}

/// The preview panel takes on the hovered clan's color, standing in for the
/// colored creature preview of the original screen.
fn render_preview(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (text, color) = match state.hovered() {
        Some(option) => (format!("{} ({})", option.name, option.clan), to_color(option.color)),
        None => ("--".to_string(), Color::White),
    };
    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(color)))
        .block(Block::default().borders(Borders::ALL).title("Preview"));
    frame.render_widget(paragraph, area);
}

fn render_help_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = if state.confirm_quit {
        " Quit? y/q:Yes | n/Esc:No"
    } else {
        " 1-9:Pick | Left/Right:Hover | Enter:Pick hovered | q:Quit"
    };
    let paragraph = Paragraph::new(Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    ))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Poll cadence for the synchronous event loop (also caps the frame rate).
const POLL_INTERVAL: Duration = Duration::from_millis(33);

/// Run the parade screen against an already-started session.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs the synchronous poll/handle/render loop.
/// 4. Restores the terminal on clean exit.
pub fn run(session: &mut ParadeSession) -> Result<()> {
    let mut terminal = ratatui::init();

    // Chain our restore in front of the original hook so a panic still
    // leaves the terminal usable.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::new(session.profile_name());
    view_state.set_options(session.options());
    if let Some(selection) = session.selection() {
        view_state.cursor = selection.index.min(view_state.options.len().saturating_sub(1));
        if let Some(option) = view_state.options.get(selection.index) {
            view_state.phase = Phase::Chosen(option.name.clone());
        }
    }

    let result = event_loop(&mut terminal, session, &mut view_state);

    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    session: &mut ParadeSession,
    view_state: &mut ViewState,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render_frame(frame, view_state))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        let Some(command) = input::handle_key(key_event, view_state) else {
            continue;
        };

        match command {
            Command::Pick(index) => {
                if let Some(clan) = session.pick(index)? {
                    let name = session
                        .options()
                        .get(index)
                        .map(|o| o.name.clone())
                        .unwrap_or_else(|| clan.to_string());
                    view_state.cursor = index;
                    view_state.phase = Phase::Chosen(name);
                }
            }
            Command::Quit => {
                if session.selection().is_some() {
                    // The parade is done; the snapshot is only needed to
                    // resume an unfinished one.
                    session.finish()?;
                }
                info!("parade screen closed");
                return Ok(());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
