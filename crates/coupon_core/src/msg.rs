use std::path::PathBuf;

use crate::{
    Confirmation, DispatchReceipt, FieldId, InputOrigin, LoadId, NavigationTarget, Product,
    RecipientTab,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited one of the text fields.
    FieldChanged { field: FieldId, value: String },
    /// User picked or typed the dispatch date/time.
    DispatchTimeChanged(String),
    /// The manual list text changed; `caret` is a character offset into `text`.
    LineChanged {
        text: String,
        caret: usize,
        origin: InputOrigin,
    },
    /// Enter pressed in the manual list with the caret at `caret`.
    EnterPressed { caret: usize },
    /// The manual list was scrolled.
    RecipientsScrolled(u32),
    /// User clicked the manual list reset button.
    ResetManualRequested,
    /// User picked a spreadsheet, or cleared the file input.
    FileSelected(Option<PathBuf>),
    /// Engine finished reading a spreadsheet's first column.
    SpreadsheetDecoded {
        load_id: LoadId,
        result: Result<Vec<String>, String>,
    },
    /// User clicked the import reset button.
    ResetImportRequested,
    /// User clicked a recipient tab.
    TabActivated(RecipientTab),
    /// User opened the product search.
    ProductSearchRequested,
    /// Engine finished fetching the product list.
    ProductsLoaded(Result<Vec<Product>, String>),
    /// User picked a product in the search dialog.
    ProductSelected(i64),
    /// User dismissed the product search.
    ProductPickerClosed,
    /// User clicked send.
    SubmitRequested,
    /// Engine finished the dispatch request.
    DispatchCompleted(Result<DispatchReceipt, String>),
    /// User answered a confirmation prompt.
    ConfirmationResolved {
        confirmation: Confirmation,
        accepted: bool,
    },
    /// User followed a link away from the form.
    NavigationRequested(NavigationTarget),
    /// User clicked cancel.
    CancelRequested,
}
