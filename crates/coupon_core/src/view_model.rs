use crate::{
    Confirmation, EmailFeedback, FieldId, LineMarker, PickerState, Product, RecipientTab,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub active_tab: RecipientTab,
    pub fields: Vec<FieldView>,
    pub email_feedback: EmailFeedback,
    pub dispatch_time: String,
    pub product: Option<Product>,
    pub picker: PickerState,
    pub picker_products: Vec<Product>,
    pub manual: ManualListView,
    pub import: ImportView,
    pub pending_confirmation: Option<Confirmation>,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: FieldId,
    pub label: &'static str,
    pub value: String,
    /// "len / max".
    pub counter: String,
}

/// The manual list with its two gutters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManualListView {
    pub text: String,
    pub caret: usize,
    pub line_numbers: Vec<usize>,
    pub markers: Vec<LineMarker>,
    pub filled: usize,
    pub limit: usize,
    /// Both gutters scroll with the text.
    pub gutter_scroll: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportView {
    pub file_name: Option<String>,
    pub loading: bool,
    pub phones: Vec<String>,
    pub total: usize,
}
