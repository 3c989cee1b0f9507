use std::error;
use std::fmt;

#[derive(Debug)]
pub enum MarketDataError {
    HttpRequest(reqwest::Error),
    HttpStatus(reqwest::StatusCode),
    JsonParse(serde_json::Error),
    ParseBigDecimal(bigdecimal::ParseBigDecimalError),
    EmptyData,
    Other(String),
}

/// Which part of a fetch went wrong, independent of the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    DataShape,
}

impl MarketDataError {
    pub fn kind(&self) -> FailureKind {
        match *self {
            MarketDataError::HttpRequest(_) | MarketDataError::HttpStatus(_) => {
                FailureKind::Network
            }
            MarketDataError::JsonParse(_)
            | MarketDataError::ParseBigDecimal(_)
            | MarketDataError::EmptyData
            | MarketDataError::Other(_) => FailureKind::DataShape,
        }
    }
}

impl fmt::Display for MarketDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MarketDataError::HttpRequest(ref err) => write!(f, "HTTP Request Error: {}", err),
            MarketDataError::HttpStatus(status) => {
                write!(f, "HTTP error! status: {}", status.as_u16())
            }
            MarketDataError::JsonParse(ref err) => write!(f, "JSON Parse Error: {}", err),
            MarketDataError::ParseBigDecimal(ref err) => {
                write!(f, "BigDecimal Parse Error: {}", err)
            }
            MarketDataError::EmptyData => write!(f, "No cryptocurrency data received"),
            MarketDataError::Other(ref err) => write!(f, "Other Error: {}", err),
        }
    }
}

impl error::Error for MarketDataError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            MarketDataError::HttpRequest(ref err) => Some(err),
            MarketDataError::JsonParse(ref err) => Some(err),
            MarketDataError::ParseBigDecimal(ref err) => Some(err),
            MarketDataError::HttpStatus(_)
            | MarketDataError::EmptyData
            | MarketDataError::Other(_) => None,
        }
    }
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> MarketDataError {
        MarketDataError::HttpRequest(err)
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(err: serde_json::Error) -> MarketDataError {
        MarketDataError::JsonParse(err)
    }
}

impl From<bigdecimal::ParseBigDecimalError> for MarketDataError {
    fn from(err: bigdecimal::ParseBigDecimalError) -> MarketDataError {
        MarketDataError::ParseBigDecimal(err)
    }
}

impl From<&str> for MarketDataError {
    fn from(err: &str) -> MarketDataError {
        MarketDataError::Other(err.to_string())
    }
}

impl From<String> for MarketDataError {
    fn from(err: String) -> MarketDataError {
        MarketDataError::Other(err)
    }
}
