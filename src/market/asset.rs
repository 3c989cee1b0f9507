use bigdecimal::BigDecimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub current_price: Option<BigDecimal>,
    pub price_change_24h: Option<f64>, // percent
    pub market_cap: Option<BigDecimal>,
    pub total_volume: Option<BigDecimal>,
    pub market_cap_rank: Option<u32>,
    pub image: String,
}

impl Asset {
    // `term` must already be lowercase
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term) || self.symbol.to_lowercase().contains(term)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalStats {
    pub total_market_cap: Option<BigDecimal>,
    pub total_volume: Option<BigDecimal>,
}

#[cfg(test)]
pub fn dummy_asset(id: &str, name: &str, symbol: &str) -> Asset {
    use std::str::FromStr;

    Asset {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        current_price: Some(BigDecimal::from_str("1.5").unwrap()),
        price_change_24h: Some(1.25),
        market_cap: Some(BigDecimal::from_str("2500000").unwrap()),
        total_volume: Some(BigDecimal::from_str("1234").unwrap()),
        market_cap_rank: Some(1),
        image: format!("https://example.invalid/{}.png", id),
    }
}
