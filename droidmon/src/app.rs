//! App state and main loop: key handling, queued lifecycle commands, stream
//! ingestion, and drawing.

use std::{collections::VecDeque, io, path::PathBuf, time::Duration};

use anyhow::Context;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use droidmon::api::{stream_url, HttpBackend};
use droidmon::controller::{Command, SessionController};
use droidmon::error::SessionError;
use droidmon::export::save_export;
use droidmon::history::PerCoreHistory;
use droidmon::sample::Metric;
use droidmon::types::ConnectOptions;
use droidmon::ws::{spawn_stream, StreamEvent};

use crate::ui::{
    cards::draw_cards, chart::draw_metric_chart, cpu::draw_per_core, footer::draw_footer,
    gpu::draw_gpu, header::draw_header, notice::draw_notice,
};

/// Sampling intervals offered by `+`/`-` (seconds).
pub const INTERVAL_PRESETS: [f64; 5] = [0.5, 1.0, 2.0, 3.0, 5.0];

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub server: String,
    pub interval: f64,
    pub connect: ConnectOptions,
    pub export_dir: PathBuf,
}

/// Modal message the user must dismiss.
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: &'static str,
    pub body: String,
}

impl From<&SessionError> for Notice {
    fn from(e: &SessionError) -> Self {
        let title = match e {
            SessionError::Validation(_) => "Invalid input",
            SessionError::PreconditionFailed { .. } => "Not allowed now",
            SessionError::BackendRejected(_) => "Backend refused",
            SessionError::Transport(_) => "Connection problem",
            SessionError::MalformedSample(_) => "Bad sample",
            SessionError::NothingToExport => "Export",
            SessionError::Io(_) => "File error",
        };
        Notice {
            title,
            body: e.to_string(),
        }
    }
}

/// Notices waiting to be dismissed, oldest first.
#[derive(Debug, Default)]
pub struct NoticeQueue(VecDeque<Notice>);

impl NoticeQueue {
    pub fn push(&mut self, notice: Notice) {
        self.0.push_back(notice);
    }

    pub fn front(&self) -> Option<&Notice> {
        self.0.front()
    }

    pub fn dismiss(&mut self) -> Option<Notice> {
        self.0.pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct App {
    pub controller: SessionController<HttpBackend>,
    pub options: AppOptions,
    pub per_core_hist: PerCoreHistory,
    pub notices: NoticeQueue,
    pub status: String,

    commands_tx: UnboundedSender<Command>,
    commands_rx: UnboundedReceiver<Command>,
    events_tx: UnboundedSender<StreamEvent>,
    events_rx: UnboundedReceiver<StreamEvent>,
    stream: Option<JoinHandle<()>>,

    should_quit: bool,
}

impl App {
    pub fn new(options: AppOptions) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(&options.server)
            .with_context(|| format!("invalid server {}", options.server))?;
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            controller: SessionController::new(backend),
            options,
            per_core_hist: PerCoreHistory::new(60),
            notices: NoticeQueue::default(),
            status: "press c to connect".into(),
            commands_tx,
            commands_rx,
            events_tx,
            events_rx,
            stream: None,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        match self.controller.capability_check().await {
            Ok(true) => {}
            Ok(false) => self.notices.push(Notice {
                title: "Warning",
                body: "The backend reports no usable device tooling (adb). \
                       Install it and make sure a device is attached."
                    .into(),
            }),
            Err(e) => self.notify(&e),
        }
        self.ensure_stream();

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        if let Some(h) = self.stream.take() {
            h.abort();
        }
        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.handle_key(k);
                    }
                }
            }
            if self.should_quit {
                break;
            }

            self.ingest_stream();
            self.run_commands(terminal).await?;

            terminal.draw(|f| self.draw(f))?;
            sleep(Duration::from_millis(100)).await;
        }
        Ok(())
    }

    // Queued lifecycle commands run one at a time. Keys keep being read while a
    // call is in flight: `q` abandons it, anything else is replayed afterwards.
    async fn run_commands<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        while !self.should_quit {
            let Ok(cmd) = self.commands_rx.try_recv() else {
                break;
            };
            self.status = busy_label(&cmd).to_string();
            terminal.draw(|f| self.draw(f))?;

            let quit_allowed = self.notices.is_empty();
            let mut pending = Vec::new();
            let outcome = tokio::select! {
                res = self.controller.dispatch(cmd) => Some(res),
                quit = watch_for_quit(&mut pending, quit_allowed) => {
                    quit?;
                    None
                }
            };
            match outcome {
                Some(res) => self.report(res),
                None => {
                    info!("quit while a backend call was in flight");
                    self.should_quit = true;
                }
            }
            for k in pending {
                self.handle_key(k);
            }
        }
        Ok(())
    }

    fn ingest_stream(&mut self) {
        while let Ok(ev) = self.events_rx.try_recv() {
            match self.controller.handle_stream(ev) {
                Ok(true) => {
                    if let Some(s) = self.controller.buffer().latest() {
                        self.per_core_hist.push_sample(s);
                    }
                }
                Ok(false) => {}
                Err(e) => self.notify(&e),
            }
        }
        if self.controller.buffer().is_empty() {
            self.per_core_hist.clear();
        }
    }

    pub fn handle_key(&mut self, k: KeyEvent) {
        if !self.notices.is_empty() {
            if matches!(k.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.notices.dismiss();
            }
            return;
        }
        if is_quit_key(&k) {
            self.should_quit = true;
            return;
        }
        match k.code {
            KeyCode::Char('c') => self.queue(Command::Connect(self.options.connect.clone())),
            KeyCode::Char('d') => self.queue(Command::Disconnect),
            KeyCode::Char('s') => {
                self.ensure_stream();
                self.queue(Command::StartMonitoring {
                    interval: self.options.interval,
                })
            }
            KeyCode::Char('x') => self.queue(Command::StopMonitoring),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_interval(1),
            KeyCode::Char('-') => self.step_interval(-1),
            KeyCode::Tab => {
                let i = Metric::ALL
                    .iter()
                    .position(|m| *m == self.controller.metric())
                    .unwrap_or(0);
                self.queue(Command::SelectMetric(Metric::ALL[(i + 1) % Metric::ALL.len()]));
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.queue(Command::SelectMetric(Metric::ALL[idx]));
            }
            _ => {}
        }
    }

    fn queue(&mut self, cmd: Command) {
        // receiver lives in self, send only fails during teardown
        let _ = self.commands_tx.send(cmd);
    }

    fn step_interval(&mut self, dir: i32) {
        self.options.interval = next_preset(self.options.interval, dir);
        self.status = format!(
            "interval {}s (applies on next start)",
            self.options.interval
        );
    }

    fn export(&mut self) {
        let res = self.controller.export().and_then(|bytes| {
            save_export(&self.options.export_dir, Utc::now(), &bytes)
        });
        match res {
            Ok(path) => {
                info!(path = %path.display(), "session exported");
                self.status = format!(
                    "exported {} samples to {}",
                    self.controller.buffer().len(),
                    path.display()
                );
            }
            Err(e) => self.notify(&e),
        }
    }

    // (Re)subscribe to the sample stream if the reader task is gone.
    fn ensure_stream(&mut self) {
        if self.stream.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        match stream_url(self.controller.backend().base()) {
            Ok(url) => {
                self.stream = Some(spawn_stream(url.to_string(), self.events_tx.clone()));
            }
            Err(e) => self.notify(&e),
        }
    }

    fn report(&mut self, res: Result<String, SessionError>) {
        match res {
            Ok(msg) => self.status = msg,
            Err(e) => self.notify(&e),
        }
    }

    fn notify(&mut self, e: &SessionError) {
        warn!(error = %e, "operation failed");
        self.notices.push(Notice::from(e));
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        // Root rows: header, main (chart + cores/gpu), cards, footer
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        draw_header(
            f,
            rows[0],
            &self.options.server,
            self.controller.state(),
            self.controller.buffer().len(),
        );

        let main_lr = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
            .split(rows[1]);
        draw_metric_chart(f, main_lr[0], self.controller.sink());

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(4)])
            .split(main_lr[1]);
        let latest = self.controller.buffer().latest();
        draw_per_core(f, right[0], latest, &self.per_core_hist);
        draw_gpu(f, right[1], latest);

        draw_cards(f, rows[2], latest);
        draw_footer(f, rows[3], self.options.interval, &self.status);

        if let Some(n) = self.notices.front() {
            draw_notice(f, area, n, self.notices.len());
        }
    }
}

fn is_quit_key(k: &KeyEvent) -> bool {
    matches!(
        k.code,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
    )
}

fn busy_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Connect(_) => "connecting...",
        Command::Disconnect => "disconnecting...",
        Command::StartMonitoring { .. } => "starting monitoring...",
        Command::StopMonitoring => "stopping monitoring...",
        Command::SelectMetric(_) => "redrawing chart...",
    }
}

/// Nearest preset strictly above (`dir > 0`) or below `current`, clamped to the
/// ends of [`INTERVAL_PRESETS`].
fn next_preset(current: f64, dir: i32) -> f64 {
    let first = INTERVAL_PRESETS[0];
    let last = INTERVAL_PRESETS[INTERVAL_PRESETS.len() - 1];
    if dir > 0 {
        INTERVAL_PRESETS
            .iter()
            .copied()
            .find(|v| *v > current)
            .unwrap_or(last)
    } else {
        INTERVAL_PRESETS
            .iter()
            .rev()
            .copied()
            .find(|v| *v < current)
            .unwrap_or(first)
    }
}

// Resolves once a quit key is pressed; every other key is buffered in `pending`.
// Never resolves when `quit_allowed` is false (an open notice owns Esc).
async fn watch_for_quit(pending: &mut Vec<KeyEvent>, quit_allowed: bool) -> io::Result<()> {
    loop {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(k) = event::read()? {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if quit_allowed && is_quit_key(&k) {
                    return Ok(());
                }
                pending.push(k);
            }
        }
        sleep(Duration::from_millis(50)).await;
    }
}
