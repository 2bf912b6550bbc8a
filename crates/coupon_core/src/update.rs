use std::path::Path;

use coupon_logging::{coupon_debug, coupon_info, coupon_warn};

use crate::dispatch::{assemble, RequiredSlot, SubmitBlocked};
use crate::import::{validate_rows, ImportError, ImportedBatch};
use crate::recipients::{EnterOutcome, InputOrigin};
use crate::state::ImportState;
use crate::{AppState, Confirmation, Effect, Flash, FocusTarget, LoadId, Msg, NavigationTarget};

const OVERFLOW_NOTICE: &str =
    "More than 100 phone numbers were entered. The extra numbers were removed.";
const LIMIT_NOTICE: &str = "Only 100 phone numbers can be entered.";
const RESET_MANUAL_PROMPT: &str = "Reset all entered phone numbers?";
const RESET_IMPORT_PROMPT: &str = "Reset the selected file?";
const SWITCH_TAB_PROMPT: &str =
    "Moving to the other tab deletes the recipients entered here. Continue?";
const LEAVE_PROMPT: &str = "Unsaved input will be lost. Leave this page?";
const CANCEL_PROMPT: &str = "Everything entered on this form will be lost. Cancel anyway?";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FieldChanged { field, value } => {
            state.form.set(field, &value);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DispatchTimeChanged(value) => {
            state.form.set_dispatch_time(&value);
            state.mark_dirty();
            Vec::new()
        }
        Msg::LineChanged {
            text,
            caret,
            origin,
        } => {
            let outcome = state.manual.apply_edit(&text, caret, origin);
            state.mark_dirty();
            let mut effects = Vec::new();
            if origin == InputOrigin::Paste {
                effects.push(Effect::Flash(Flash::Pasted));
            }
            if outcome.overflow_notice {
                effects.push(Effect::Alert(OVERFLOW_NOTICE.to_string()));
            }
            effects
        }
        Msg::EnterPressed { caret } => match state.manual.press_enter(caret) {
            EnterOutcome::Inserted => {
                state.mark_dirty();
                Vec::new()
            }
            EnterOutcome::LimitReached => vec![Effect::Alert(LIMIT_NOTICE.to_string())],
            EnterOutcome::Rejected => vec![Effect::Flash(Flash::Rejected)],
        },
        Msg::RecipientsScrolled(offset) => {
            state.manual.set_scroll_offset(offset);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ResetManualRequested => {
            if state.manual.is_blank() {
                Vec::new()
            } else {
                ask(&mut state, Confirmation::ResetManualList, RESET_MANUAL_PROMPT)
            }
        }
        Msg::FileSelected(None) => {
            state.import = ImportState::Empty;
            state.mark_dirty();
            Vec::new()
        }
        Msg::FileSelected(Some(path)) => {
            let load_id = state.next_load_id();
            let file_name = display_name(&path);
            coupon_info!("Loading spreadsheet {} (load {})", file_name, load_id);
            state.import = ImportState::Loading { load_id, file_name };
            state.mark_dirty();
            vec![Effect::LoadSpreadsheet { load_id, path }]
        }
        Msg::SpreadsheetDecoded { load_id, result } => {
            apply_spreadsheet(&mut state, load_id, result)
        }
        Msg::ResetImportRequested => {
            if state.import == ImportState::Empty {
                Vec::new()
            } else {
                ask(&mut state, Confirmation::ResetImport, RESET_IMPORT_PROMPT)
            }
        }
        Msg::TabActivated(tab) => {
            if tab == state.active_tab {
                Vec::new()
            } else if state.tab_has_data(state.active_tab) {
                ask(&mut state, Confirmation::SwitchTab(tab), SWITCH_TAB_PROMPT)
            } else {
                state.switch_tab(tab);
                state.mark_dirty();
                Vec::new()
            }
        }
        Msg::ProductSearchRequested => {
            let needs_fetch = state.catalog.open();
            state.mark_dirty();
            if needs_fetch {
                vec![Effect::FetchProducts]
            } else {
                Vec::new()
            }
        }
        Msg::ProductsLoaded(result) => {
            if let Err(message) = &result {
                coupon_warn!("Product list unavailable: {}", message);
            }
            state.catalog.loaded(result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ProductSelected(id) => match state.catalog.find(id).cloned() {
            Some(product) => {
                state.form.select_product(product);
                state.catalog.close();
                state.mark_dirty();
                Vec::new()
            }
            None => vec![Effect::Alert("Selected product not found.".to_string())],
        },
        Msg::ProductPickerClosed => {
            state.catalog.close();
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitRequested => {
            if state.submitting {
                return (state, Vec::new());
            }
            let assembled = assemble(
                &state.form,
                state.recipient_source(),
                state.settings.utc_offset_minutes,
            );
            match assembled {
                Ok(draft) => {
                    let prompt = draft.confirmation_prompt();
                    ask(&mut state, Confirmation::Submit, &prompt)
                }
                Err(blocked) => blocked_effects(blocked),
            }
        }
        Msg::DispatchCompleted(result) => {
            state.submitting = false;
            match result {
                Ok(receipt) => {
                    coupon_info!(
                        "Dispatch {} created for {} recipients",
                        receipt.id,
                        receipt.quantity
                    );
                    state.reset_form();
                    vec![Effect::Alert("Dispatch request completed.".to_string())]
                }
                Err(detail) => {
                    coupon_warn!("Dispatch failed: {}", detail);
                    state.mark_dirty();
                    vec![Effect::Alert(format!(
                        "Dispatch request failed: {detail}"
                    ))]
                }
            }
        }
        Msg::ConfirmationResolved {
            confirmation,
            accepted,
        } => {
            if state.pending_confirmation.as_ref() != Some(&confirmation) {
                coupon_debug!("Ignoring stale confirmation {:?}", confirmation);
                return (state, Vec::new());
            }
            state.pending_confirmation = None;
            state.mark_dirty();
            if accepted {
                confirmed(&mut state, confirmation)
            } else {
                Vec::new()
            }
        }
        Msg::NavigationRequested(target) => leave(&mut state, target, LEAVE_PROMPT),
        Msg::CancelRequested => leave(&mut state, NavigationTarget::Reload, CANCEL_PROMPT),
    };

    (state, effects)
}

fn ask(state: &mut AppState, confirmation: Confirmation, prompt: &str) -> Vec<Effect> {
    state.pending_confirmation = Some(confirmation.clone());
    state.mark_dirty();
    vec![Effect::Confirm {
        confirmation,
        prompt: prompt.to_string(),
    }]
}

fn confirmed(state: &mut AppState, confirmation: Confirmation) -> Vec<Effect> {
    match confirmation {
        Confirmation::ResetManualList => {
            state.manual.reset();
            Vec::new()
        }
        Confirmation::ResetImport => {
            state.import = ImportState::Empty;
            Vec::new()
        }
        Confirmation::SwitchTab(tab) => {
            state.switch_tab(tab);
            Vec::new()
        }
        Confirmation::Submit => {
            if state.submitting {
                return Vec::new();
            }
            // Re-checked: the form may have changed while the prompt was open.
            let assembled = assemble(
                &state.form,
                state.recipient_source(),
                state.settings.utc_offset_minutes,
            );
            match assembled {
                Ok(draft) => {
                    coupon_info!(
                        "Submitting dispatch for {} recipients",
                        draft.request.recipients.len()
                    );
                    state.submitting = true;
                    vec![Effect::SubmitDispatch(Box::new(draft.request))]
                }
                Err(blocked) => blocked_effects(blocked),
            }
        }
        Confirmation::Leave(target) => {
            state.navigation_allowed = true;
            vec![Effect::Navigate(target)]
        }
    }
}

fn leave(state: &mut AppState, target: NavigationTarget, prompt: &str) -> Vec<Effect> {
    if state.has_unsaved_input() && !state.navigation_allowed {
        ask(state, Confirmation::Leave(target), prompt)
    } else {
        vec![Effect::Navigate(target)]
    }
}

fn apply_spreadsheet(
    state: &mut AppState,
    load_id: LoadId,
    result: Result<Vec<String>, String>,
) -> Vec<Effect> {
    let file_name = match &state.import {
        ImportState::Loading {
            load_id: current,
            file_name,
        } if *current == load_id => file_name.clone(),
        _ => {
            coupon_debug!("Ignoring result of superseded load {}", load_id);
            return Vec::new();
        }
    };

    let validated = result
        .map_err(|reason| ImportError::Unreadable { reason })
        .and_then(|cells| validate_rows(&cells));
    state.mark_dirty();
    match validated {
        Ok(rows) => {
            state.import = ImportState::Loaded(ImportedBatch { file_name, rows });
            Vec::new()
        }
        Err(err) => {
            coupon_warn!("Spreadsheet {} rejected: {}", file_name, err);
            state.import = ImportState::Empty;
            vec![Effect::Alert(format!(
                "{err}\n\nCheck the file and upload it again."
            ))]
        }
    }
}

fn blocked_effects(blocked: SubmitBlocked) -> Vec<Effect> {
    let focus = match &blocked {
        SubmitBlocked::MissingField(RequiredSlot::Field(field)) => Some(FocusTarget::Field(*field)),
        SubmitBlocked::MissingField(RequiredSlot::DispatchTime) => Some(FocusTarget::DispatchTime),
        SubmitBlocked::EmptyManualList | SubmitBlocked::InvalidManualLines => {
            Some(FocusTarget::ManualList)
        }
        SubmitBlocked::NoImport => Some(FocusTarget::FileInput),
        SubmitBlocked::NoProduct
        | SubmitBlocked::NoRecipients
        | SubmitBlocked::InvalidUtcOffset(_) => None,
    };
    let mut effects = vec![Effect::Alert(blocked.to_string())];
    effects.extend(focus.map(Effect::Focus));
    effects
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
