use crate::board::PriceBoard;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Search(String),
    ClearSearch,
    Refresh,
    Retry,
    Hidden,
    Visible,
    Offline,
    Online,
    Unload,
}

/// Runs `refresh()` on its own task so stopping the timer never cancels it.
fn spawn_refresh(board: &Arc<PriceBoard>) -> JoinHandle<()> {
    let board = Arc::clone(board);
    tokio::spawn(async move {
        board.refresh().await;
    })
}

/// Repeating refresh timer. The first tick fires one full period after start.
pub struct AutoRefresh {
    board: Arc<PriceBoard>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    pub fn new(board: Arc<PriceBoard>, period: Duration) -> Self {
        Self {
            board,
            period,
            task: None,
        }
    }

    pub fn start(&mut self) {
        self.stop();

        let board = Arc::clone(&self.board);
        let period = self.period;
        debug!("Starting auto-refresh every {:?}", period);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                trace!("Auto-refresh timer ticked");
                if !board.is_busy() {
                    spawn_refresh(&board);
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Stopping auto-refresh");
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct Session {
    board: Arc<PriceBoard>,
    auto_refresh: AutoRefresh,
    listeners: Vec<JoinHandle<()>>,
    hidden: bool,
    offline: bool,
    disposed: bool,
}

impl Session {
    pub fn init(board: Arc<PriceBoard>, period: Duration, listeners: Vec<JoinHandle<()>>) -> Self {
        let mut session = Self {
            auto_refresh: AutoRefresh::new(Arc::clone(&board), period),
            board,
            listeners,
            hidden: false,
            offline: false,
            disposed: false,
        };

        spawn_refresh(&session.board);
        session.auto_refresh.start();
        info!(
            "Session started with {} listener(s), refreshing every {:?}",
            session.listeners.len(),
            period
        );
        session
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.auto_refresh.is_running()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn handle(&mut self, event: HostEvent) {
        if self.disposed {
            debug!("Session disposed, ignoring {:?}", event);
            return;
        }

        debug!("Handling host event {:?}", event);
        match event {
            HostEvent::Search(term) => self.board.set_filter(&term),
            HostEvent::ClearSearch => self.board.clear_filter(),
            HostEvent::Refresh => {
                if !self.board.is_busy() {
                    spawn_refresh(&self.board);
                }
            }
            // Retry goes straight to refresh, which still observes the busy flag.
            HostEvent::Retry => {
                spawn_refresh(&self.board);
            }
            HostEvent::Hidden => {
                self.hidden = true;
                self.auto_refresh.stop();
            }
            HostEvent::Offline => {
                self.offline = true;
                self.auto_refresh.stop();
            }
            HostEvent::Visible => {
                self.hidden = false;
                if !self.offline {
                    self.auto_refresh.start();
                    if !self.board.is_busy() {
                        spawn_refresh(&self.board);
                    }
                }
            }
            // Resume the timer only; the next tick or a user action fetches.
            HostEvent::Online => {
                self.offline = false;
                if !self.hidden {
                    self.auto_refresh.start();
                }
            }
            HostEvent::Unload => self.dispose(),
        }
    }

    /// Stops the timer and detaches every listener. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.auto_refresh.stop();
        for listener in self.listeners.drain(..) {
            listener.abort();
        }
        self.disposed = true;
        info!("Session disposed");
    }

    #[instrument(skip_all)]
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<HostEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
            if self.disposed {
                break;
            }
        }

        self.dispose();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}
