use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::board::{Board, Card, Command};
use crate::models::{display_date, JobDetail, Outcome};

/// Everything the event loop reacts to: keys from the input thread and
/// completions from spawned request tasks. Board and terminal are only
/// touched from the loop, so applying these is serialized even while several
/// requests are in flight.
enum AppEvent {
    Input(KeyEvent),
    Detail {
        token: u64,
        job_id: i64,
        result: Result<JobDetail>,
    },
    Marked {
        job_id: i64,
        outcome: Outcome,
        result: Result<bool>,
    },
    Hidden {
        job_id: i64,
        result: Result<bool>,
    },
}

pub async fn run(api: ApiClient) -> Result<()> {
    let jobs = api
        .all_jobs()
        .await
        .context("Failed to load jobs from backend")?;
    let mut board = Board::new(jobs);
    if board.visible().next().is_none() {
        println!("No jobs to show.");
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut board, &api).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    board: &mut Board,
    api: &ApiClient,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Keyboard reader on its own thread so the loop can await completions;
    // it dies with the process.
    {
        let tx = tx.clone();
        std::thread::spawn(move || {
            while let Ok(event) = event::read() {
                if let Event::Key(key) = event {
                    if tx.send(AppEvent::Input(key)).is_err() {
                        break;
                    }
                }
            }
        });
    }

    let mut list_state = ListState::default();
    let mut scroll_offset: u16 = 0;

    loop {
        list_state.select(selected_index(board));
        terminal.draw(|frame| draw(frame, board, &mut list_state, scroll_offset))?;

        let Some(event) = rx.recv().await else { break };
        match event {
            AppEvent::Input(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Down | KeyCode::Char('j') => {
                        if let Some(id) = neighbor(board, 1) {
                            dispatch(api, &tx, board.select(id));
                            scroll_offset = 0;
                        }
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        if let Some(id) = neighbor(board, -1) {
                            dispatch(api, &tx, board.select(id));
                            scroll_offset = 0;
                        }
                    }
                    KeyCode::Char('J') | KeyCode::PageDown => {
                        scroll_offset = scroll_offset.saturating_add(3)
                    }
                    KeyCode::Char('K') | KeyCode::PageUp => {
                        scroll_offset = scroll_offset.saturating_sub(3)
                    }
                    KeyCode::Char('a') => mark_selected(api, &tx, board, Outcome::Applied),
                    KeyCode::Char('x') => mark_selected(api, &tx, board, Outcome::Rejected),
                    KeyCode::Char('i') => mark_selected(api, &tx, board, Outcome::Interview),
                    KeyCode::Char('h') => hide_selected(api, &tx, board),
                    _ => {}
                }
            }
            AppEvent::Detail {
                token,
                job_id,
                result,
            } => match result {
                Ok(detail) => {
                    if board.detail_arrived(token, detail) {
                        scroll_offset = 0;
                    }
                }
                Err(err) => warn!(job_id, error = %err, "detail fetch failed"),
            },
            AppEvent::Marked {
                job_id,
                outcome,
                result,
            } => match result {
                Ok(ok) => board.outcome_result(job_id, outcome, ok),
                Err(err) => {
                    warn!(job_id, outcome = outcome.label(), error = %err, "mark request failed")
                }
            },
            AppEvent::Hidden { job_id, result } => match result {
                Ok(ok) => dispatch(api, &tx, board.hide_result(job_id, ok)),
                Err(err) => warn!(job_id, error = %err, "hide request failed"),
            },
        }
    }
    Ok(())
}

/// Spawn the request a board command asks for; its completion comes back
/// through the channel.
fn dispatch(api: &ApiClient, tx: &UnboundedSender<AppEvent>, command: Option<Command>) {
    let Some(Command::FetchDetail { job_id, token }) = command else {
        return;
    };
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = api.job_details(job_id).await;
        let _ = tx.send(AppEvent::Detail {
            token,
            job_id,
            result,
        });
    });
}

fn mark_selected(api: &ApiClient, tx: &UnboundedSender<AppEvent>, board: &Board, outcome: Outcome) {
    let Some(job_id) = board.selected_id() else {
        return;
    };
    info!(job_id, outcome = outcome.label(), "marking job");
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = api.mark(job_id, outcome).await;
        let _ = tx.send(AppEvent::Marked {
            job_id,
            outcome,
            result,
        });
    });
}

fn hide_selected(api: &ApiClient, tx: &UnboundedSender<AppEvent>, board: &Board) {
    let Some(job_id) = board.selected_id() else {
        return;
    };
    info!(job_id, "hiding job");
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = api.hide(job_id).await;
        let _ = tx.send(AppEvent::Hidden { job_id, result });
    });
}

/// Id of the visible card one step from the selection; first visible card
/// when nothing is selected yet.
fn neighbor(board: &Board, delta: i64) -> Option<i64> {
    let ids: Vec<i64> = board.visible().map(|c| c.id).collect();
    let Some(pos) = board
        .selected_id()
        .and_then(|id| ids.iter().position(|&x| x == id))
    else {
        return ids.first().copied();
    };
    if delta > 0 {
        ids.get(pos + 1).copied()
    } else {
        pos.checked_sub(1).and_then(|p| ids.get(p).copied())
    }
}

fn selected_index(board: &Board) -> Option<usize> {
    let id = board.selected_id()?;
    board.visible().position(|c| c.id == id)
}

fn draw(frame: &mut Frame, board: &Board, list_state: &mut ListState, scroll_offset: u16) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(frame.area());

    // Left panel: job list
    let items: Vec<ListItem> = board
        .visible()
        .map(|card| {
            let company = card.company.as_deref().unwrap_or("?");
            ListItem::new(format!(
                "{} #{:<4} {} | {}",
                card_marker(card),
                card.id,
                truncate(&card.title, 35),
                company
            ))
        })
        .collect();

    let count = items.len();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Jobs ({}) ", count)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: job detail
    let detail = build_detail(board);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer help
    let help_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let help = Paragraph::new(
        " j/k:navigate  J/K:scroll  a:applied x:rejected i:interview h:hide  q:quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area[1]);
}

fn card_marker(card: &Card) -> &'static str {
    if card.interview {
        "*"
    } else if card.applied {
        "+"
    } else if card.rejected {
        "x"
    } else {
        " "
    }
}

/// Detail pane content, rebuilt from the last fetched detail. Backend text
/// goes into spans as-is and is never interpreted as markup. Empty when the
/// pane was cleared or nothing has been selected yet.
fn build_detail(board: &Board) -> Text<'_> {
    let Some(job) = board.detail() else {
        return Text::default();
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        job.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    match (job.company.as_deref(), job.location.as_deref()) {
        (Some(company), Some(location)) => {
            lines.push(Line::from(format!("{}, {}", company, location)))
        }
        (Some(company), None) => lines.push(Line::from(company.to_string())),
        (None, Some(location)) => lines.push(Line::from(location.to_string())),
        (None, None) => {}
    }

    if let Some(date) = &job.date {
        lines.push(Line::from(display_date(date)));
    }

    if let Some(url) = &job.job_url {
        lines.push(Line::from(Span::styled(
            format!("Apply: {}", url),
            Style::default().fg(Color::Cyan),
        )));
    }

    lines.push(Line::from(""));

    if let Some(text) = &job.job_description {
        for line in textwrap::fill(text, 70).lines() {
            lines.push(Line::from(line.to_string()));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "(No description)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    Text::from(lines)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
