use crate::market::asset::{Asset, GlobalStats};
use crate::market::error::MarketDataError;
use crate::market::source::MarketDataSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted source for tests. Each call sleeps for `latency` before answering.
pub struct StubSource {
    assets: Mutex<Result<Vec<Asset>, u16>>,
    global: Mutex<Option<GlobalStats>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets: Mutex::new(Ok(assets)),
            global: Mutex::new(Some(GlobalStats::default())),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_assets(&self, assets: Vec<Asset>) {
        *self.assets.lock() = Ok(assets);
    }

    pub fn fail_with_status(&self, status: u16) {
        *self.assets.lock() = Err(status);
    }

    pub fn set_global(&self, global: Option<GlobalStats>) {
        *self.global.lock() = global;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for StubSource {
    async fn fetch_assets(&self) -> Result<Vec<Asset>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let scripted = self.assets.lock().clone();
        match scripted {
            Ok(assets) if assets.is_empty() => Err(MarketDataError::EmptyData),
            Ok(assets) => Ok(assets),
            Err(status) => Err(MarketDataError::HttpStatus(
                reqwest::StatusCode::from_u16(status)
                    .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            )),
        }
    }

    async fn fetch_global_stats(&self) -> Result<GlobalStats, MarketDataError> {
        let scripted = self.global.lock().clone();
        scripted.ok_or_else(|| "global stats unavailable".into())
    }
}
