use thiserror::Error;

/// Failure of a single call against the Flatastic API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Short tag used in logs and in failed snapshot entries.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Decode(_) => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = FetchError::Status {
            code: 401,
            body: "invalid api key".to_string(),
        };
        assert_eq!(err.kind(), "status");
        assert_eq!(err.to_string(), "unexpected status 401: invalid api key");
    }

    #[test]
    fn test_decode_error_from_serde() {
        let err: FetchError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert_eq!(err.kind(), "decode");
    }
}
