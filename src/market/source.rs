use crate::config::Config;
use crate::market::asset::{Asset, GlobalStats};
use crate::market::error::MarketDataError;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::header;
use serde::Deserialize;
use serde_json::Number;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;
use tracing::instrument;

const VS_CURRENCY: &str = "usd";

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Assets in server order (descending market cap). Never empty on success.
    async fn fetch_assets(&self) -> Result<Vec<Asset>, MarketDataError>;

    async fn fetch_global_stats(&self) -> Result<GlobalStats, MarketDataError>;
}

#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    per_page: u32,
}

impl CoinGeckoSource {
    pub fn new(config: &Config) -> Result<Self, MarketDataError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self::with_client(http_client, config))
    }

    fn with_client(http_client: reqwest::Client, config: &Config) -> Self {
        Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.coingecko_api_key.trim().to_string(),
            per_page: config.per_page,
        }
    }

    fn markets_url(&self) -> String {
        format!(
            "{}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=false&price_change_percentage=24h",
            self.base_url, VS_CURRENCY, self.per_page
        )
    }

    fn global_url(&self) -> String {
        format!("{}/global", self.base_url)
    }

    async fn get_body(&self, url: &str) -> Result<String, MarketDataError> {
        let mut http_req_build = self
            .http_client
            .get(url)
            .header(header::ACCEPT, "application/json");

        if !self.api_key.is_empty() {
            http_req_build = http_req_build.header("x-cg-demo-api-key", &self.api_key);
        }

        let response = http_req_build.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus(status));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoSource {
    #[instrument(skip(self))]
    async fn fetch_assets(&self) -> Result<Vec<Asset>, MarketDataError> {
        let url = self.markets_url();
        debug!("Requesting markets from {}", url);
        let body = self.get_body(&url).await?;
        parse_assets(&body)
    }

    #[instrument(skip(self))]
    async fn fetch_global_stats(&self) -> Result<GlobalStats, MarketDataError> {
        let body = self.get_body(&self.global_url()).await?;
        parse_global_stats(&body)
    }
}

#[derive(Debug, Deserialize)]
struct AssetRecord {
    id: String,
    name: String,
    symbol: String,
    current_price: Option<Number>,
    price_change_percentage_24h: Option<Number>,
    market_cap: Option<Number>,
    total_volume: Option<Number>,
    market_cap_rank: Option<Number>,
    image: Option<String>,
}

impl AssetRecord {
    fn into_asset(self) -> Result<Asset, MarketDataError> {
        Ok(Asset {
            current_price: to_decimal(self.current_price.as_ref())?,
            price_change_24h: self.price_change_percentage_24h.and_then(|n| n.as_f64()),
            market_cap: to_decimal(self.market_cap.as_ref())?,
            total_volume: to_decimal(self.total_volume.as_ref())?,
            market_cap_rank: self
                .market_cap_rank
                .and_then(|n| n.as_u64())
                .and_then(|rank| u32::try_from(rank).ok()),
            image: self.image.unwrap_or_default(),
            id: self.id,
            name: self.name,
            symbol: self.symbol,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: Option<GlobalData>,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    #[serde(default)]
    total_market_cap: HashMap<String, Number>,
    #[serde(default)]
    total_volume: HashMap<String, Number>,
}

fn to_decimal(value: Option<&Number>) -> Result<Option<BigDecimal>, MarketDataError> {
    match value {
        Some(number) => Ok(Some(BigDecimal::from_str(number.as_str())?)),
        None => Ok(None),
    }
}

pub fn parse_assets(body: &str) -> Result<Vec<Asset>, MarketDataError> {
    // example response
    // [{"id":"bitcoin","symbol":"btc","name":"Bitcoin","image":"https://...","current_price":65761,
    //   "market_cap":1296146916218,"market_cap_rank":1,"total_volume":31563014040,
    //   "price_change_percentage_24h":1.88412}, ...]
    let items = match serde_json::from_str::<serde_json::Value>(body)? {
        serde_json::Value::Array(items) if !items.is_empty() => items,
        _ => return Err(MarketDataError::EmptyData),
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value::<AssetRecord>(item)?.into_asset())
        .collect()
}

pub fn parse_global_stats(body: &str) -> Result<GlobalStats, MarketDataError> {
    let response: GlobalResponse = serde_json::from_str(body)?;
    let data = response
        .data
        .ok_or("missing `data` object in the global response")?;

    Ok(GlobalStats {
        total_market_cap: to_decimal(data.total_market_cap.get(VS_CURRENCY))?,
        total_volume: to_decimal(data.total_volume.get(VS_CURRENCY))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single HTTP request and hands back the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api/v3", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (base_url, server)
    }

    fn local_source(base_url: String, api_key: &str) -> CoinGeckoSource {
        let config = Config {
            api_base_url: base_url,
            coingecko_api_key: api_key.to_string(),
            ..Config::default()
        };
        let http_client = reqwest::Client::builder().no_proxy().build().unwrap();
        CoinGeckoSource::with_client(http_client, &config)
    }

    #[tokio::test]
    async fn test_http_500_maps_to_status_error() {
        let (base_url, server) =
            serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let source = local_source(base_url, "secret-key");

        let err = source.fetch_assets().await.unwrap_err();
        assert!(matches!(err, MarketDataError::HttpStatus(status) if status.as_u16() == 500));
        assert_eq!("HTTP error! status: 500", err.to_string());

        let request = server.await.unwrap();
        assert!(request.starts_with("get /api/v3/coins/markets?vs_currency=usd"));
        assert!(request.contains("x-cg-demo-api-key: secret-key"));
        assert!(request.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn test_success_without_api_key() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"[{"id":"bitcoin","symbol":"btc","name":"Bitcoin","image":"x","current_price":65000.5,
                "market_cap":1,"market_cap_rank":1,"total_volume":2,"price_change_percentage_24h":0.5}]"#,
        )
        .await;
        let source = local_source(base_url, "  ");

        let assets = source.fetch_assets().await.unwrap();
        assert_eq!(1, assets.len());
        assert_eq!(Some(BigDecimal::from_str("65000.5").unwrap()), assets[0].current_price);

        let request = server.await.unwrap();
        assert!(!request.contains("x-cg-demo-api-key"));
    }

    #[tokio::test]
    async fn test_global_stats_status_error() {
        let (base_url, server) = serve_once("503 Service Unavailable", "").await;
        let source = local_source(base_url, "");

        let err = source.fetch_global_stats().await.unwrap_err();
        assert_eq!("HTTP error! status: 503", err.to_string());
        assert!(server.await.unwrap().starts_with("get /api/v3/global "));
    }

    #[test]
    fn test_parse_assets() {
        let body = r#"[
            {"id":"bitcoin","symbol":"btc","name":"Bitcoin","image":"https://img/btc.png",
             "current_price":65761.123456789,"market_cap":1296146916218,"market_cap_rank":1,
             "total_volume":31563014040,"price_change_percentage_24h":-1.5},
            {"id":"tiny","symbol":"tny","name":"Tiny","image":null,
             "current_price":0.00000012,"market_cap":null,"market_cap_rank":null,
             "total_volume":null,"price_change_percentage_24h":null}
        ]"#;

        let assets = parse_assets(body).unwrap();
        assert_eq!(2, assets.len());
        assert_eq!("bitcoin", assets[0].id);
        assert_eq!(
            Some(BigDecimal::from_str("65761.123456789").unwrap()),
            assets[0].current_price
        );
        assert_eq!(Some(-1.5), assets[0].price_change_24h);
        assert_eq!(Some(1), assets[0].market_cap_rank);

        assert_eq!(
            Some(BigDecimal::from_str("0.00000012").unwrap()),
            assets[1].current_price
        );
        assert_eq!(None, assets[1].market_cap);
        assert_eq!(None, assets[1].market_cap_rank);
        assert_eq!(None, assets[1].price_change_24h);
        assert_eq!("", assets[1].image);
    }

    #[test]
    fn test_parse_assets_rejects_empty_and_non_array() {
        assert!(matches!(parse_assets("[]"), Err(MarketDataError::EmptyData)));
        assert!(matches!(
            parse_assets(r#"{"status":{"error_code":429}}"#),
            Err(MarketDataError::EmptyData)
        ));
        assert!(matches!(
            parse_assets("not json"),
            Err(MarketDataError::JsonParse(_))
        ));
    }

    #[test]
    fn test_parse_global_stats() {
        let body = r#"{"data":{"total_market_cap":{"usd":2500000000000.5,"eur":1},
                       "total_volume":{"usd":98000000000}}}"#;
        let stats = parse_global_stats(body).unwrap();
        assert_eq!(
            Some(BigDecimal::from_str("2500000000000.5").unwrap()),
            stats.total_market_cap
        );
        assert_eq!(
            Some(BigDecimal::from_str("98000000000").unwrap()),
            stats.total_volume
        );
    }

    #[test]
    fn test_parse_global_stats_missing_parts() {
        let stats = parse_global_stats(r#"{"data":{"total_volume":{"eur":5}}}"#).unwrap();
        assert_eq!(GlobalStats::default(), stats);

        assert!(matches!(
            parse_global_stats(r#"{"status":"down"}"#),
            Err(MarketDataError::Other(_))
        ));
    }

    #[test]
    fn test_urls() {
        let config = Config {
            api_base_url: "http://localhost:9000/api/v3/".to_string(),
            per_page: 25,
            ..Config::default()
        };
        let source = CoinGeckoSource::new(&config).unwrap();
        assert_eq!(
            "http://localhost:9000/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=25&page=1&sparkline=false&price_change_percentage=24h",
            source.markets_url()
        );
        assert_eq!("http://localhost:9000/api/v3/global", source.global_url());
    }
}
