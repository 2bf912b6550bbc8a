use std::fmt;

use coupon_core::{DispatchReceipt, LoadId, Product};

use crate::spreadsheet::SheetError;

const GENERIC_FAILURE: &str = "An unknown error occurred.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ProductsLoaded(Result<Vec<Product>, ApiError>),
    SpreadsheetLoaded {
        load_id: LoadId,
        result: Result<Vec<String>, SheetError>,
    },
    DispatchCompleted(Result<DispatchReceipt, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// `detail` field of the server's error body, if it sent one.
    pub detail: Option<String>,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    /// Text to show the user: the server's detail when present, otherwise a
    /// generic message for HTTP failures or the transport error.
    pub fn user_message(&self) -> String {
        match (&self.detail, &self.kind) {
            (Some(detail), _) => detail.clone(),
            (None, FailureKind::HttpStatus(_)) => GENERIC_FAILURE.to_string(),
            (None, kind) => kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    InvalidBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::InvalidBody => write!(f, "invalid response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] ApiError),
}
