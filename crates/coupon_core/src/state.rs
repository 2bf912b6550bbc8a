use crate::catalog::ProductCatalog;
use crate::dispatch::RecipientSource;
use crate::form::{char_counter, email_feedback, DispatchForm, FieldId, FormDefaults};
use crate::import::ImportedBatch;
use crate::recipients::{RecipientList, MAX_MANUAL_RECIPIENTS};
use crate::view_model::{AppViewModel, FieldView, ImportView, ManualListView};
use crate::NavigationTarget;

/// Identifies one spreadsheet load so late results can be told apart.
pub type LoadId = u64;

/// Recipient entry mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipientTab {
    #[default]
    Manual,
    Import,
}

/// Actions that wait for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    ResetManualList,
    ResetImport,
    SwitchTab(RecipientTab),
    Submit,
    Leave(NavigationTarget),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImportState {
    #[default]
    Empty,
    Loading {
        load_id: LoadId,
        file_name: String,
    },
    Loaded(ImportedBatch),
}

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub defaults: FormDefaults,
    /// Offset of the wall-clock dispatch time typed into the form.
    pub utc_offset_minutes: i32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            defaults: FormDefaults::default(),
            utc_offset_minutes: 9 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) settings: SessionSettings,
    pub(crate) form: DispatchForm,
    pub(crate) catalog: ProductCatalog,
    pub(crate) active_tab: RecipientTab,
    pub(crate) manual: RecipientList,
    pub(crate) import: ImportState,
    pub(crate) next_load_id: LoadId,
    pub(crate) pending_confirmation: Option<Confirmation>,
    pub(crate) submitting: bool,
    pub(crate) navigation_allowed: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl AppState {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            form: DispatchForm::new(&settings.defaults),
            settings,
            catalog: ProductCatalog::default(),
            active_tab: RecipientTab::Manual,
            manual: RecipientList::new(),
            import: ImportState::Empty,
            next_load_id: 1,
            pending_confirmation: None,
            submitting: false,
            navigation_allowed: false,
            dirty: false,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn active_tab(&self) -> RecipientTab {
        self.active_tab
    }

    pub fn manual(&self) -> &RecipientList {
        &self.manual
    }

    pub fn import(&self) -> &ImportState {
        &self.import
    }

    pub fn form(&self) -> &DispatchForm {
        &self.form
    }

    pub fn pending_confirmation(&self) -> Option<&Confirmation> {
        self.pending_confirmation.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn navigation_allowed(&self) -> bool {
        self.navigation_allowed
    }

    /// True when leaving now would lose something the user entered.
    pub fn has_unsaved_input(&self) -> bool {
        self.form.has_unsaved_input(&self.settings.defaults)
            || !self.manual.is_blank()
            || self.import != ImportState::Empty
    }

    pub fn view(&self) -> AppViewModel {
        let fields = FieldId::ALL
            .iter()
            .map(|field| {
                let value = self.form.get(*field);
                FieldView {
                    field: *field,
                    label: field.label(),
                    value: value.to_string(),
                    counter: char_counter(value, field.max_len()),
                }
            })
            .collect();

        let manual = ManualListView {
            text: self.manual.text().to_string(),
            caret: self.manual.caret(),
            line_numbers: self.manual.lines().iter().map(|l| l.line_index).collect(),
            markers: self.manual.lines().iter().map(|l| l.marker).collect(),
            filled: self.manual.filled_count(),
            limit: MAX_MANUAL_RECIPIENTS,
            gutter_scroll: self.manual.scroll_offset(),
        };

        let import = match &self.import {
            ImportState::Empty => ImportView::default(),
            ImportState::Loading { file_name, .. } => ImportView {
                file_name: Some(file_name.clone()),
                loading: true,
                ..ImportView::default()
            },
            ImportState::Loaded(batch) => ImportView {
                file_name: Some(batch.file_name.clone()),
                loading: false,
                phones: batch.phones(),
                total: batch.len(),
            },
        };

        AppViewModel {
            active_tab: self.active_tab,
            fields,
            email_feedback: email_feedback(self.form.get(FieldId::RequesterEmail)),
            dispatch_time: self.form.dispatch_time_input().to_string(),
            product: self.form.product().cloned(),
            picker: self.catalog.picker().clone(),
            picker_products: self.catalog.products().to_vec(),
            manual,
            import,
            pending_confirmation: self.pending_confirmation.clone(),
            submitting: self.submitting,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn recipient_source(&self) -> RecipientSource<'_> {
        match self.active_tab {
            RecipientTab::Manual => RecipientSource::Manual(&self.manual),
            RecipientTab::Import => match &self.import {
                ImportState::Loaded(batch) => RecipientSource::Import(Some(batch)),
                ImportState::Empty | ImportState::Loading { .. } => RecipientSource::Import(None),
            },
        }
    }

    pub(crate) fn tab_has_data(&self, tab: RecipientTab) -> bool {
        match tab {
            RecipientTab::Manual => !self.manual.is_blank(),
            RecipientTab::Import => self.import != ImportState::Empty,
        }
    }

    /// Activates `tab` and throws away whatever the other tab held.
    pub(crate) fn switch_tab(&mut self, tab: RecipientTab) {
        match self.active_tab {
            RecipientTab::Manual => self.manual.reset(),
            RecipientTab::Import => self.import = ImportState::Empty,
        }
        self.active_tab = tab;
    }

    pub(crate) fn next_load_id(&mut self) -> LoadId {
        let id = self.next_load_id;
        self.next_load_id += 1;
        id
    }

    /// Back to a fresh form; the product cache survives.
    pub(crate) fn reset_form(&mut self) {
        let catalog = std::mem::take(&mut self.catalog);
        let next_load_id = self.next_load_id;
        *self = AppState::new(self.settings.clone());
        self.catalog = catalog;
        self.catalog.close();
        self.next_load_id = next_load_id;
        self.dirty = true;
    }
}
