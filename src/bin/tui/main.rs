mod app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use app::{format_interval, truncate, AppState, ConnectionStatus, SocialFeed};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut movers_state = TableState::default();
    movers_state.select(None);

    let result = run_loop(&mut terminal, &mut app, &client, &mut movers_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    movers_state: &mut TableState,
) -> io::Result<()> {
    // Polls the API's view; the dashboard owns the real refresh cadence.
    let poll_interval = Duration::from_secs(2);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, movers_state))?;

        let timeout = poll_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.manual_refresh(client).await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            let max = app.movers.rows.len().saturating_sub(1);
                            let next = movers_state.selected().map_or(0, |i| (i + 1).min(max));
                            movers_state.select(Some(next));
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            let prev = movers_state
                                .selected()
                                .map_or(0, |i| i.saturating_sub(1));
                            movers_state.select(Some(prev));
                        }
                        KeyCode::Enter => {
                            if let Some(row) = movers_state.selected() {
                                app.select(client, row).await;
                            }
                        }
                        KeyCode::Char('t') | KeyCode::Char('T') => {
                            if let Some(row) = movers_state.selected() {
                                app.trade(client, row).await;
                            }
                        }
                        KeyCode::Char('+') | KeyCode::Char('=') => app.cycle_interval(client, true).await,
                        KeyCode::Char('-') => app.cycle_interval(client, false).await,
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= poll_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, movers_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | body | whales | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // header
            Constraint::Min(14),    // movers + detail
            Constraint::Length(10), // whale feed
            Constraint::Length(1),  // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, movers_state, chunks[1]);
    render_whales(f, app, chunks[2]);
    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let failing = |n: u64| if n > 0 { Color::Red } else { Color::White };

    let title_spans = vec![
        Span::styled(
            " Solana Top Movers  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(
            format!("Last update: {}", app.movers.last_update.as_deref().unwrap_or("—")),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("every {}", format_interval(app.interval_ms)),
            Style::default().fg(if app.health.timer_running { Color::White } else { Color::DarkGray }),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("market fails {}", app.health.market.consecutive_failures),
            Style::default().fg(failing(app.health.market.consecutive_failures)),
        ),
        Span::raw("  "),
        Span::styled(
            format!("whale fails {}", app.health.whales.consecutive_failures),
            Style::default().fg(failing(app.health.whales.consecutive_failures)),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(title_spans))
        .block(Block::default().borders(Borders::ALL).border_style(
            Style::default().fg(Color::DarkGray),
        ));

    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, movers_state: &mut TableState, area: Rect) {
    // Horizontal split: movers (55%) | chart + social (45%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_movers_table(f, app, movers_state, halves[0]);

    let detail = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(5)])
        .split(halves[1]);

    render_chart(f, app, detail[0]);
    render_social(f, app, detail[1]);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn change_color(up: bool) -> Color {
    if up { Color::Green } else { Color::Red }
}

fn render_movers_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    if let Some(placeholder) = &app.movers.placeholder {
        let p = Paragraph::new(placeholder.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .block(panel(" TOP MOVERS (1h) "));
        f.render_widget(p, area);
        return;
    }

    let header_cells = ["#", "Token", "Price", "1h", "24h", "Mint"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .movers
        .rows
        .iter()
        .map(|m| {
            let label = if m.symbol.is_empty() {
                truncate(&m.name, 18)
            } else {
                truncate(&format!("{} ({})", m.name, m.symbol), 18)
            };
            Row::new(vec![
                Cell::from(m.rank.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(label),
                Cell::from(m.price.clone()),
                Cell::from(m.change_h1.clone()).style(Style::default().fg(change_color(m.change_h1_up))),
                Cell::from(m.change_h24.clone()).style(Style::default().fg(change_color(m.change_h24_up))),
                Cell::from(truncate(&m.token_address, 10)).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(panel(" TOP MOVERS (1h) "))
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(table, area, state);
}

fn render_chart(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(chart) = app.chart.current() else {
        let p = Paragraph::new("Select a row and press Enter.")
            .style(Style::default().fg(Color::DarkGray))
            .block(panel(" PRICE "));
        f.render_widget(p, area);
        return;
    };

    let x_max = chart.points.len().saturating_sub(1).max(1) as f64;
    let [lo, hi] = chart.y_bounds;

    let dataset = Dataset::default()
        .name(chart.label.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&chart.points);

    let title = format!(" PRICE · {} · draw #{} ", chart.label, app.chart.draws());
    let widget = Chart::new(vec![dataset])
        .block(panel(&title))
        .x_axis(Axis::default().bounds([0.0, x_max]).style(Style::default().fg(Color::DarkGray)))
        .y_axis(
            Axis::default()
                .bounds([lo, hi])
                .labels([format!("{lo:.6}"), format!("{hi:.6}")])
                .style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(widget, area);
}

fn render_social(f: &mut Frame, app: &AppState, area: Rect) {
    let lines = match app.selection.as_ref().map(|s| &s.social) {
        Some(SocialFeed::Handle { handle, timeline_url }) => vec![
            Line::from(Span::styled(format!("Tweets by {handle}"), Style::default().fg(Color::White))),
            Line::from(Span::styled(timeline_url.clone(), Style::default().fg(Color::Blue))),
        ],
        Some(SocialFeed::NoHandle { message }) => {
            vec![Line::from(Span::styled(message.clone(), Style::default().fg(Color::DarkGray)))]
        }
        None => Vec::new(),
    };

    let p = Paragraph::new(lines).wrap(Wrap { trim: true }).block(panel(" SOCIAL "));
    f.render_widget(p, area);
}

fn render_whales(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(placeholder) = &app.whales.placeholder {
        let p = Paragraph::new(placeholder.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .block(panel(" WHALE FEED "));
        f.render_widget(p, area);
        return;
    }

    let lines: Vec<Line> = app
        .whales
        .lines
        .iter()
        .map(|w| {
            let kind_color = if w.kind == "trade" { Color::Magenta } else { Color::White };
            let mut spans = vec![
                Span::styled(format!("{:<8}", truncate(&w.symbol, 8)), Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::styled(format!("{:<5}", w.kind), Style::default().fg(kind_color)),
                Span::raw(" "),
                Span::styled(format!("{:>14}", w.amount), Style::default().fg(Color::White)),
            ];
            if let Some(url) = &w.explorer_url {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(url.clone(), Style::default().fg(Color::DarkGray)));
            }
            Line::from(spans)
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(panel(" WHALE FEED ")), area);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("refresh  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll  "),
        Span::styled("[enter] ", Style::default().fg(Color::Yellow)),
        Span::raw("chart  "),
        Span::styled("[t] ", Style::default().fg(Color::Yellow)),
        Span::raw("trade  "),
        Span::styled("[+/-] ", Style::default().fg(Color::Yellow)),
        Span::raw("interval  "),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::LightBlue)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::White)), area);
}
