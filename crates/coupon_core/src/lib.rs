//! Coupon dispatch core: pure form state machine, recipient normalization and
//! validation, and view-model helpers.
mod catalog;
mod dispatch;
mod effect;
mod form;
mod import;
mod msg;
mod phone;
mod recipients;
mod state;
mod update;
mod view_model;

pub use catalog::{PickerState, Product, ProductCatalog};
pub use dispatch::{
    assemble, utc_offset, DispatchReceipt, DispatchRequest, RecipientRecord, RecipientSource,
    RequiredSlot, SubmissionDraft, SubmitBlocked,
};
pub use effect::{Effect, Flash, FocusTarget, NavigationTarget};
pub use form::{
    char_counter, email_feedback, parse_dispatch_time, DispatchForm, EmailFeedback, FieldId,
    FormDefaults,
};
pub use import::{validate_rows, ImportError, ImportRow, ImportedBatch, MAX_IMPORT_ROWS};
pub use msg::Msg;
pub use phone::{check_phone, is_valid_phone, PhoneRuleViolation, MAX_PHONE_DIGITS};
pub use recipients::{
    normalize, EditOutcome, EnterOutcome, InputOrigin, LineMarker, Normalized, RecipientLine,
    RecipientList, MAX_MANUAL_RECIPIENTS,
};
pub use state::{AppState, Confirmation, ImportState, LoadId, RecipientTab, SessionSettings};
pub use update::update;
pub use view_model::{AppViewModel, FieldView, ImportView, ManualListView};
