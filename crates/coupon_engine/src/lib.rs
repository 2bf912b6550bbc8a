//! Coupon dispatch engine: backend calls and spreadsheet reading, executed
//! off the UI thread.
mod api;
mod decode;
mod engine;
mod spreadsheet;
mod types;

pub use api::{ApiSettings, DispatchApi, ReqwestApi};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use engine::EngineHandle;
pub use spreadsheet::{load_first_column, read_first_column, SheetError};
pub use types::{ApiError, EngineError, EngineEvent, FailureKind};
