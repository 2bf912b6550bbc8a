use std::path::PathBuf;

use crate::{Confirmation, DispatchRequest, FieldId, LoadId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Blocking notice for the user.
    Alert(String),
    /// Transient visual pulse on the manual list.
    Flash(Flash),
    /// Ask the user to confirm; the answer comes back as
    /// `Msg::ConfirmationResolved`.
    Confirm {
        confirmation: Confirmation,
        prompt: String,
    },
    Focus(FocusTarget),
    FetchProducts,
    LoadSpreadsheet { load_id: LoadId, path: PathBuf },
    SubmitDispatch(Box<DispatchRequest>),
    Navigate(NavigationTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    /// A paste landed in the list.
    Pasted,
    /// Enter was refused on the current line.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Field(FieldId),
    DispatchTime,
    ManualList,
    FileInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Start over with a fresh form.
    Reload,
    Url(String),
}
