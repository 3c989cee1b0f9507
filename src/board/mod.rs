pub mod filter;

use crate::board::filter::{EmptyCause, FilterState};
use crate::format;
use crate::market::asset::{Asset, GlobalStats};
use crate::market::source::MarketDataSource;
use crate::view::{AssetRow, DisplayMode, Frame, View};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;

const NO_DATA_MESSAGE: &str = "No cryptocurrency data available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed { assets: usize },
    Failed { message: String },
    Skipped, // another refresh was already in flight
}

struct BoardState {
    snapshot: Vec<Asset>,
    filter: FilterState,
    global: Option<GlobalStats>,
    last_updated: Option<DateTime<Local>>,
    mode: DisplayMode,
    refreshing: bool,
}

impl BoardState {
    fn visible(&self) -> Vec<&Asset> {
        self.filter.apply(&self.snapshot)
    }

    fn reapply_filter(&mut self) {
        let visible_len = self.visible().len();
        self.mode = match self.filter.empty_cause(visible_len) {
            None => DisplayMode::List,
            Some(EmptyCause::NoMatches) => DisplayMode::NoResults,
            // Nothing loaded and nothing typed is reported as an error, not as an empty search.
            Some(EmptyCause::NoData) => DisplayMode::error(NO_DATA_MESSAGE),
        };
    }

    fn frame(&self) -> Frame {
        let (total_market_cap, total_volume) = Frame::global_stats_text(self.global.as_ref());

        Frame {
            mode: self.mode.clone(),
            rows: self.visible().into_iter().map(AssetRow::from_asset).collect(),
            total_market_cap,
            total_volume,
            last_updated: self.last_updated.map(|at| format::format_clock(at.naive_local().time())),
            clear_visible: !self.filter.is_empty(),
            refreshing: self.refreshing,
        }
    }
}

struct Inner {
    state: BoardState,
    view: Box<dyn View>,
}

impl Inner {
    fn present(&mut self) {
        let frame = self.state.frame();
        self.view.present(&frame);
    }
}

/// The state lock is never held across an await.
pub struct PriceBoard {
    source: Arc<dyn MarketDataSource>,
    busy: AtomicBool,
    inner: Mutex<Inner>,
}

struct RefreshGuard<'a> {
    board: &'a PriceBoard,
}

impl<'a> RefreshGuard<'a> {
    fn acquire(board: &'a PriceBoard) -> Option<Self> {
        board
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        let mut inner = board.inner.lock();
        inner.state.mode = DisplayMode::Loading;
        inner.state.refreshing = true;
        inner.present();

        Some(Self { board })
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.board.inner.lock();
        inner.state.refreshing = false;
        inner.present();
        self.board.busy.store(false, Ordering::Release);
    }
}

impl PriceBoard {
    pub fn new(source: Arc<dyn MarketDataSource>, view: Box<dyn View>) -> Self {
        let mut inner = Inner {
            state: BoardState {
                snapshot: Vec::new(),
                filter: FilterState::default(),
                global: None,
                last_updated: None,
                mode: DisplayMode::Loading,
                refreshing: false,
            },
            view,
        };
        inner.present();

        Self {
            source,
            busy: AtomicBool::new(false),
            inner: Mutex::new(inner),
        }
    }

    /// Returns `Skipped` without touching the network while another refresh is in flight.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(guard) = RefreshGuard::acquire(self) else {
            debug!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        let (assets, global) = tokio::join!(
            self.source.fetch_assets(),
            self.source.fetch_global_stats()
        );

        let outcome = {
            let mut inner = guard.board.inner.lock();
            match assets {
                Ok(assets) => {
                    let global = match global {
                        Ok(global) => Some(global),
                        Err(e) => {
                            debug!("Global market stats not available: {}", e);
                            None
                        }
                    };

                    let count = assets.len();
                    inner.state.snapshot = assets;
                    inner.state.global = global;
                    inner.state.last_updated = Some(Local::now());
                    inner.state.reapply_filter();
                    info!("Loaded {} assets", count);
                    RefreshOutcome::Completed { assets: count }
                }
                Err(e) => {
                    error!("Error loading crypto data ({:?}): {}", e.kind(), e);
                    let message = e.to_string();
                    inner.state.mode = DisplayMode::error(message.clone());
                    RefreshOutcome::Failed { message }
                }
            }
        };

        drop(guard);
        outcome
    }

    pub fn set_filter(&self, raw: &str) {
        let filter = FilterState::new(raw);
        debug!("Filter set to {:?}", filter.term());

        let mut inner = self.inner.lock();
        inner.state.filter = filter;
        inner.state.reapply_filter();
        inner.present();
    }

    pub fn clear_filter(&self) {
        self.set_filter("");
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn mode(&self) -> DisplayMode {
        self.inner.lock().state.mode.clone()
    }

    pub fn filter_term(&self) -> String {
        self.inner.lock().state.filter.term().to_string()
    }

    pub fn snapshot(&self) -> Vec<Asset> {
        self.inner.lock().state.snapshot.clone()
    }

    pub fn visible(&self) -> Vec<Asset> {
        self.inner
            .lock()
            .state
            .visible()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn global_stats(&self) -> Option<GlobalStats> {
        self.inner.lock().state.global.clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.inner.lock().state.last_updated
    }
}
