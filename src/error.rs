use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid base64 input: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded input is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error: {provider} - {message}")]
    Provider {
        provider: String,
        message: String,
    },

    #[error("Not enough data to compute a change for {ticker}")]
    InsufficientData { ticker: String },

    #[error("Invalid e-mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Mail error: {0}")]
    Mail(String),
}

impl From<lettre::error::Error> for MonitorError {
    fn from(e: lettre::error::Error) -> Self {
        MonitorError::Mail(e.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for MonitorError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        MonitorError::Mail(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
