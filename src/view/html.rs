use crate::format::escape_html;
use crate::view::{AssetRow, DisplayMode, Frame, View};
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

const FALLBACK_LOGO: &str = "data:image/svg+xml;utf8,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%2232%22 height=%2232%22%3E%3Ccircle cx=%2216%22 cy=%2216%22 r=%2216%22 fill=%22%23F3F4F6%22/%3E%3C/svg%3E";

/// Only the newest pending document is written.
pub struct HtmlView {
    documents: mpsc::UnboundedSender<String>,
    writer: JoinHandle<()>,
}

impl HtmlView {
    /// Must be called inside a tokio runtime.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (documents, receiver) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_documents(path, receiver));
        Self { documents, writer }
    }

    pub async fn close(self) {
        drop(self.documents);
        let _ = self.writer.await;
    }
}

async fn write_documents(path: PathBuf, mut receiver: mpsc::UnboundedReceiver<String>) {
    while let Some(mut document) = receiver.recv().await {
        while let Ok(newer) = receiver.try_recv() {
            document = newer;
        }

        if let Err(e) = fs::write(&path, document).await {
            warn!("Failed to write board to {}: {}", path.display(), e);
        }
    }
}

impl View for HtmlView {
    fn present(&mut self, frame: &Frame) {
        if self.documents.send(render_document(frame)).is_err() {
            warn!("HTML writer task is gone, frame dropped");
        }
    }
}

fn display(visible: bool, shown_as: &str) -> String {
    if visible {
        format!("display:{}", shown_as)
    } else {
        "display:none".to_string()
    }
}

fn render_row(out: &mut String, row: &AssetRow) {
    let _ = write!(
        out,
        r#"
      <div class="crypto-item" data-id="{id}">
        <div class="crypto-rank">{rank}</div>
        <div class="crypto-name">
          <img src="{logo}" alt="{name}" class="crypto-logo" loading="lazy" onerror="this.src='{fallback}'" />
          <div class="crypto-details">
            <h3>{name}</h3>
            <span class="crypto-symbol">{symbol}</span>
          </div>
        </div>
        <div class="crypto-price">{price}</div>
        <div class="crypto-change {class}">{arrow} {change}</div>
        <div class="crypto-market-cap">{market_cap}</div>
        <div class="crypto-volume">{volume}</div>
      </div>"#,
        id = escape_html(&row.id),
        rank = escape_html(&row.rank),
        logo = escape_html(&row.logo_url),
        name = escape_html(&row.name),
        fallback = FALLBACK_LOGO,
        symbol = escape_html(&row.symbol),
        price = escape_html(&row.price),
        class = row.direction.css_class(),
        arrow = row.direction.arrow(),
        change = escape_html(&row.change),
        market_cap = escape_html(&row.market_cap),
        volume = escape_html(&row.volume),
    );
}

pub fn render_document(frame: &Frame) -> String {
    let error_message = match frame.mode {
        DisplayMode::Error(ref message) => escape_html(message),
        _ => String::new(),
    };

    let mut rows = String::new();
    for row in &frame.rows {
        render_row(&mut rows, row);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Crypto Price Board</title>
</head>
<body>
  <header>
    <div class="stat">Market Cap: <span id="totalMarketCap">{market_cap}</span></div>
    <div class="stat">24h Volume: <span id="total24hVolume">{volume}</span></div>
    <div class="stat">Last updated: <span id="lastUpdated">{last_updated}</span></div>
    <button id="refreshBtn" class="{refresh_class}">Refresh</button>
    <button id="clearSearch" class="{clear_class}">Clear</button>
  </header>
  <div id="loadingState" style="{loading}">Loading...</div>
  <div id="errorState" style="{error}"><p id="errorMessage">{error_message}</p></div>
  <div id="cryptoList" style="{list}">
    <div id="cryptoItems">{rows}
    </div>
  </div>
  <div id="noResults" style="{no_results}">No matching cryptocurrencies</div>
</body>
</html>
"#,
        market_cap = escape_html(&frame.total_market_cap),
        volume = escape_html(&frame.total_volume),
        last_updated = escape_html(frame.last_updated.as_deref().unwrap_or("--:--:--")),
        refresh_class = if frame.refreshing { "loading" } else { "" },
        clear_class = if frame.clear_visible { "visible" } else { "" },
        loading = display(frame.mode == DisplayMode::Loading, "flex"),
        error = display(matches!(frame.mode, DisplayMode::Error(_)), "flex"),
        list = display(frame.mode == DisplayMode::List, "block"),
        no_results = display(frame.mode == DisplayMode::NoResults, "flex"),
        error_message = error_message,
        rows = rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::asset::dummy_asset;

    fn frame(mode: DisplayMode) -> Frame {
        Frame {
            mode,
            rows: vec![AssetRow::from_asset(&dummy_asset(
                "evil",
                "<script>alert('x')</script>",
                "x&y",
            ))],
            total_market_cap: "$2.50T".to_string(),
            total_volume: "N/A".to_string(),
            last_updated: Some("02:05:09 PM".to_string()),
            clear_visible: true,
            refreshing: false,
        }
    }

    #[test]
    fn test_text_is_escaped() {
        let document = render_document(&frame(DisplayMode::List));
        assert!(!document.contains("<script>"));
        assert!(document.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
        assert!(document.contains("X&amp;Y"));
        assert!(document.contains(r#"<span id="totalMarketCap">$2.50T</span>"#));
        assert!(document.contains(r#"<button id="clearSearch" class="visible">"#));
    }

    #[test]
    fn test_only_active_section_is_visible() {
        let document = render_document(&frame(DisplayMode::List));
        assert!(document.contains(r#"<div id="cryptoList" style="display:block">"#));
        assert!(document.contains(r#"<div id="loadingState" style="display:none">"#));
        assert!(document.contains(r#"<div id="errorState" style="display:none">"#));
        assert!(document.contains(r#"<div id="noResults" style="display:none">"#));

        let document = render_document(&frame(DisplayMode::Error("HTTP error! status: 500".to_string())));
        assert!(document.contains(r#"<div id="errorState" style="display:flex">"#));
        assert!(document.contains("HTTP error! status: 500"));
        assert!(document.contains(r#"<div id="cryptoList" style="display:none">"#));
    }

    #[tokio::test]
    async fn test_present_writes_latest_document() {
        let path = std::env::temp_dir().join(format!("price-board-{}.html", std::process::id()));
        let mut view = HtmlView::new(&path);
        view.present(&frame(DisplayMode::Loading));
        view.present(&frame(DisplayMode::NoResults));
        view.close().await;

        let written = fs::read_to_string(&path).await.unwrap();
        assert!(written.contains(r#"<div id="noResults" style="display:flex">"#));
        assert!(written.contains(r#"<div id="loadingState" style="display:none">"#));
        let _ = fs::remove_file(&path).await;
    }
}
