use crate::view::{DisplayMode, Frame, View};
use std::io::{self, Write};
use tracing::warn;

pub struct TextView<W: Write + Send> {
    out: W,
}

impl TextView<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> TextView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

pub fn render_text(frame: &Frame) -> String {
    let mut text = format!(
        "Market Cap: {} | 24h Volume: {} | Updated: {}{}\n",
        frame.total_market_cap,
        frame.total_volume,
        frame.last_updated.as_deref().unwrap_or("--:--:--"),
        if frame.refreshing { " (refreshing)" } else { "" },
    );

    match frame.mode {
        DisplayMode::Loading => text.push_str("Loading...\n"),
        DisplayMode::Error(ref message) => text.push_str(&format!("Error: {}\n", message)),
        DisplayMode::NoResults => text.push_str("No matching cryptocurrencies\n"),
        DisplayMode::List => {
            text.push_str(&format!(
                "{:>5}  {:<24} {:<8} {:>16} {:>9} {:>12} {:>12}\n",
                "#", "Name", "Symbol", "Price", "24h", "Market Cap", "Volume"
            ));
            for row in &frame.rows {
                text.push_str(&format!(
                    "{:>5}  {:<24} {:<8} {:>16} {:>9} {:>12} {:>12}\n",
                    row.rank,
                    row.name,
                    row.symbol,
                    row.price,
                    format!("{}{}", row.direction.arrow(), row.change),
                    row.market_cap,
                    row.volume
                ));
            }
        }
    }

    text
}

impl<W: Write + Send> View for TextView<W> {
    fn present(&mut self, frame: &Frame) {
        let text = render_text(frame);
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("Failed to write board: {}", e);
        }
    }
}
