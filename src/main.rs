use std::io;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use coach_terminal::analysis_fetch::{AnalysisService, HttpAnalysisService};
use coach_terminal::config::ServiceConfig;
use coach_terminal::demo::OfflineAnalysisService;
use coach_terminal::feed;
use coach_terminal::game_mode::default_registry;
use coach_terminal::model::Capability;
use coach_terminal::narrative::{Entry, FieldValue, Item, Narrative, Tone};
use coach_terminal::state::{self, AppState, Message, MessageBody, Role, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<state::ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<state::ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.input_active {
            match key.code {
                KeyCode::Enter => {
                    self.state.submit_input();
                }
                KeyCode::Esc => {
                    self.state.input.clear();
                    self.state.input_active = false;
                }
                KeyCode::Backspace => {
                    self.state.input.pop();
                }
                KeyCode::Char(c) => self.state.input.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.invoke(Capability::Insights),
            KeyCode::Char('2') => self.invoke(Capability::MacroReview),
            KeyCode::Char('3') => self.invoke(Capability::Prediction),
            KeyCode::Char('g') | KeyCode::Char('G') => self.state.cycle_game_mode(),
            KeyCode::Char('i') | KeyCode::Char('I') => self.state.input_active = true,
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(1),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(1),
            KeyCode::PageUp => self.state.scroll_up(10),
            KeyCode::PageDown => self.state.scroll_down(10),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn invoke(&mut self, capability: Capability) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Analysis provider unavailable");
            return;
        };
        let (request_id, request) = self.state.begin_invocation(capability);
        if tx
            .send(state::ProviderCommand::Invoke {
                request_id,
                request,
            })
            .is_err()
        {
            self.state.pending = self.state.pending.saturating_sub(1);
            self.state
                .push_log(format!("[WARN] #{request_id} could not be dispatched"));
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = ServiceConfig::from_env();
    let service: Arc<dyn AnalysisService> = if cfg.offline {
        Arc::new(OfflineAnalysisService)
    } else {
        Arc::new(HttpAnalysisService::new(cfg.clone())?)
    };
    let state = AppState::new(cfg.game_mode.clone(), service.describe());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(tx, cmd_rx, service);

    let mut app = App::new(state, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_transcript(frame, chunks[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    render_input(frame, chunks[3], &app.state);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[4]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let game = &default_registry().profile(&state.game_mode).display_name;
    let status = if state.is_loading() {
        format!("Analyzing... ({} pending)", state.pending)
    } else {
        "Ready".to_string()
    };
    let line1 = format!("  .-.  COACH TERMINAL | {game} | {status}");
    let line2 = format!(" /___\\ {}", state.service_label);
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.input_active {
        "Enter Send | Esc Cancel".to_string()
    } else {
        "1 Insights | 2 Macro Review | 3 Prediction | g Game | i Ask | j/k Scroll | ? Help | q Quit"
            .to_string()
    }
}

fn render_transcript(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in &state.transcript {
        push_message_lines(&mut lines, message);
        lines.push(Line::default());
    }

    let width = area.width.max(1) as usize;
    let total: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    let visible = area.height as usize;
    let bottom = total.saturating_sub(visible);
    let offset = bottom.saturating_sub(state.scroll as usize);

    let transcript = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(transcript, area);
}

fn push_message_lines(lines: &mut Vec<Line<'static>>, message: &Message) {
    let (who, who_style) = match message.role {
        Role::User => ("You", Style::default().fg(Color::Cyan)),
        Role::Assistant => ("Coach", Style::default().fg(Color::Magenta)),
    };
    lines.push(Line::from(vec![
        Span::styled(who, who_style.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", message.timestamp.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    match &message.body {
        MessageBody::Text(text) => {
            lines.extend(text.lines().map(|l| Line::from(l.to_string())));
        }
        MessageBody::Analysis(narrative) => push_card_lines(lines, narrative),
        MessageBody::Failure { text, .. } => {
            let style = Style::default().fg(Color::Red);
            lines.extend(text.lines().map(|l| Line::styled(l.to_string(), style)));
        }
    }
}

fn push_card_lines(lines: &mut Vec<Line<'static>>, narrative: &Narrative) {
    lines.push(Line::styled(
        format!("{} {}", narrative.icon, narrative.title),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    for section in &narrative.sections {
        lines.push(Line::default());
        lines.push(Line::styled(
            format!("{} {}", section.icon, section.heading),
            tone_style(section.tone).add_modifier(Modifier::BOLD),
        ));
        for item in &section.items {
            push_item_lines(lines, item);
        }
    }
}

fn push_item_lines(lines: &mut Vec<Line<'static>>, item: &Item) {
    match item {
        Item::Paragraph { text } => {
            lines.extend(text.lines().map(|l| Line::from(format!("  {l}"))));
        }
        Item::Field { label, value, tone } => {
            let value_style = tone.map(tone_style).unwrap_or_default();
            let label_span = Span::styled(
                format!("  {label}: "),
                Style::default().fg(Color::Gray),
            );
            match value {
                FieldValue::Inline(text) => lines.push(Line::from(vec![
                    label_span,
                    Span::styled(text.clone(), value_style),
                ])),
                FieldValue::List(values) => {
                    lines.push(Line::from(label_span));
                    lines.extend(values.iter().map(|v| Line::from(format!("    - {v}"))));
                }
            }
        }
        Item::Entry(entry) => push_entry_lines(lines, entry),
    }
}

fn push_entry_lines(lines: &mut Vec<Line<'static>>, entry: &Entry) {
    let mut spans = vec![Span::raw("  ")];
    if let Some(n) = entry.ordinal {
        spans.push(Span::raw(format!("{n}. ")));
    }
    let style = entry.tone.map(tone_style).unwrap_or_default();
    if let Some(badge) = &entry.badge {
        spans.push(Span::styled(format!("[{badge}] "), style));
    }
    spans.push(Span::styled(
        entry.headline.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(spans));

    for detail in &entry.details {
        let text = match &detail.label {
            Some(label) => format!("     {label}: {}", detail.text),
            None => format!("     {}", detail.text),
        };
        lines.push(Line::styled(text, Style::default().fg(Color::Gray)));
    }
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Critical => Style::default().fg(Color::Red),
        Tone::Warning => Style::default().fg(Color::LightRed),
        Tone::Info => Style::default().fg(Color::Yellow),
        Tone::Positive => Style::default().fg(Color::Green),
        Tone::Neutral => Style::default(),
    }
}

fn render_input(frame: &mut Frame, area: Rect, state: &AppState) {
    let (text, style) = if state.input_active {
        (format!("> {}_", state.input), Style::default())
    } else {
        (
            "Press i to ask the coach a question".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };
    let input = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::TOP | Borders::BOTTOM));
    frame.render_widget(input, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Coach Terminal - Help",
        "",
        "Features (demo data for the active game):",
        "  1            Personalized Player Insights",
        "  2            Automated Macro Review",
        "  3            Hypothetical Predictions",
        "",
        "Session:",
        "  g            Cycle game mode",
        "  i            Ask a question (Enter send, Esc cancel)",
        "  j/k or ↑/↓   Scroll transcript",
        "  PgUp/PgDn    Scroll faster",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
