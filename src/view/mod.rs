pub mod html;
pub mod text;

use crate::format::{self, Direction, NOT_AVAILABLE};
use crate::market::asset::{Asset, GlobalStats};

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayMode {
    Loading,
    List,
    Error(String),
    NoResults,
}

impl DisplayMode {
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return DisplayMode::Error(
                "An unexpected error occurred. Please try again.".to_string(),
            );
        }
        DisplayMode::Error(message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRow {
    pub id: String,
    pub rank: String,
    pub name: String,
    pub symbol: String,
    pub logo_url: String,
    pub price: String,
    pub direction: Direction,
    pub change: String,
    pub market_cap: String,
    pub volume: String,
}

impl AssetRow {
    pub fn from_asset(asset: &Asset) -> Self {
        let (direction, change) = format::format_price_change(asset.price_change_24h);
        let price = match asset.current_price {
            Some(ref price) => format!("${}", format::format_price(Some(price))),
            None => NOT_AVAILABLE.to_string(),
        };

        Self {
            id: asset.id.clone(),
            rank: format::format_rank(asset.market_cap_rank),
            name: asset.name.clone(),
            symbol: asset.symbol.to_uppercase(),
            logo_url: asset.image.clone(),
            price,
            direction,
            change,
            market_cap: format::format_magnitude(asset.market_cap.as_ref()),
            volume: format::format_magnitude(asset.total_volume.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub mode: DisplayMode,
    pub rows: Vec<AssetRow>,
    pub total_market_cap: String,
    pub total_volume: String,
    pub last_updated: Option<String>,
    pub clear_visible: bool,
    pub refreshing: bool,
}

impl Frame {
    pub fn global_stats_text(stats: Option<&GlobalStats>) -> (String, String) {
        match stats {
            Some(stats) => (
                format::format_magnitude(stats.total_market_cap.as_ref()),
                format::format_magnitude(stats.total_volume.as_ref()),
            ),
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        }
    }
}

/// Write-only render sink. The board never reads anything back.
pub trait View: Send {
    fn present(&mut self, frame: &Frame);
}
