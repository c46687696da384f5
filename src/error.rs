use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 課題検索が失敗した。レスポンス本文を診断用に保持する
    #[error("Source unavailable: {status} - {body}")]
    SourceUnavailable { status: u16, body: String },

    #[error("Storage write failed: {0}")]
    SinkFailure(String),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_message_includes_body() {
        let err = Error::SourceUnavailable {
            status: 400,
            body: "{\"errorMessages\":[\"bad jql\"]}".to_string(),
        };

        let message = err.to_string();

        assert!(message.contains("400"));
        assert!(message.contains("bad jql"));
    }
}
