//! Builds the outbound dispatch request from the form and the active
//! recipient source.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::{DispatchForm, FieldId};
use crate::import::ImportedBatch;
use crate::recipients::RecipientList;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRecord {
    pub phone_number: String,
}

/// Body of `POST /api/dispatches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub client_name: String,
    pub sales_manager: String,
    pub client_requester: String,
    pub requester_email: String,
    pub event_name: String,
    pub dispatch_datetime: DateTime<Utc>,
    pub product_id: i64,
    pub mms_title: String,
    pub mms_content: String,
    pub sender_phone: String,
    pub recipients: Vec<RecipientRecord>,
}

/// What the server returns for a created dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub event_name: Option<String>,
}

/// A form slot that must be filled before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredSlot {
    Field(FieldId),
    DispatchTime,
}

impl RequiredSlot {
    pub fn label(self) -> &'static str {
        match self {
            RequiredSlot::Field(field) => field.label(),
            RequiredSlot::DispatchTime => "Dispatch time",
        }
    }
}

enum Required {
    Slot(RequiredSlot),
    Product,
}

const REQUIRED_ORDER: [Required; 10] = [
    Required::Slot(RequiredSlot::Field(FieldId::ClientName)),
    Required::Slot(RequiredSlot::Field(FieldId::SalesManager)),
    Required::Slot(RequiredSlot::Field(FieldId::ClientRequester)),
    Required::Slot(RequiredSlot::Field(FieldId::RequesterEmail)),
    Required::Slot(RequiredSlot::Field(FieldId::EventName)),
    Required::Slot(RequiredSlot::DispatchTime),
    Required::Product,
    Required::Slot(RequiredSlot::Field(FieldId::MmsTitle)),
    Required::Slot(RequiredSlot::Field(FieldId::MmsContent)),
    Required::Slot(RequiredSlot::Field(FieldId::SenderPhone)),
];

/// Why a submission did not get as far as the confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("Required field '{}' is empty.", .0.label())]
    MissingField(RequiredSlot),
    #[error("Search for a product and select it.")]
    NoProduct,
    #[error("Enter recipient phone numbers in the manual list.")]
    EmptyManualList,
    #[error("The manual list contains invalid phone numbers (see the X markers).")]
    InvalidManualLines,
    #[error("Upload a spreadsheet first.")]
    NoImport,
    #[error("No recipient phone numbers registered.")]
    NoRecipients,
    #[error("The configured UTC offset of {0} minutes is not a valid time zone.")]
    InvalidUtcOffset(i32),
}

/// Recipient source chosen by the active tab.
#[derive(Debug, Clone, Copy)]
pub enum RecipientSource<'a> {
    Manual(&'a RecipientList),
    /// `None` when no file has been accepted.
    Import(Option<&'a ImportedBatch>),
}

/// A request ready to be confirmed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub request: DispatchRequest,
    pub product_name: String,
    pub local_time: NaiveDateTime,
}

impl SubmissionDraft {
    pub fn confirmation_prompt(&self) -> String {
        format!(
            "Send {} at {} to {} phone numbers?",
            self.product_name,
            self.local_time.format("%Y-%m-%d %H:%M"),
            self.request.recipients.len()
        )
    }
}

/// Runs the submit-time checks and builds the request.
///
/// `utc_offset_minutes` is the offset of the wall-clock time typed into the
/// form.
pub fn assemble(
    form: &DispatchForm,
    source: RecipientSource<'_>,
    utc_offset_minutes: i32,
) -> Result<SubmissionDraft, SubmitBlocked> {
    for required in &REQUIRED_ORDER {
        match required {
            Required::Slot(slot) => {
                let filled = match slot {
                    RequiredSlot::Field(field) => !form.get(*field).trim().is_empty(),
                    RequiredSlot::DispatchTime => form.dispatch_time().is_some(),
                };
                if !filled {
                    return Err(SubmitBlocked::MissingField(*slot));
                }
            }
            Required::Product => {
                if form.product().is_none() {
                    return Err(SubmitBlocked::NoProduct);
                }
            }
        }
    }
    let (Some(local_time), Some(product)) = (form.dispatch_time(), form.product()) else {
        return Err(SubmitBlocked::NoProduct);
    };
    let offset = utc_offset(utc_offset_minutes)
        .ok_or(SubmitBlocked::InvalidUtcOffset(utc_offset_minutes))?;

    let phones = match source {
        RecipientSource::Manual(list) => {
            if list.is_blank() {
                return Err(SubmitBlocked::EmptyManualList);
            }
            if list.has_invalid() {
                return Err(SubmitBlocked::InvalidManualLines);
            }
            list.phones()
        }
        RecipientSource::Import(Some(batch)) => batch.phones(),
        RecipientSource::Import(None) => return Err(SubmitBlocked::NoImport),
    };
    if phones.is_empty() {
        return Err(SubmitBlocked::NoRecipients);
    }

    let request = DispatchRequest {
        client_name: form.get(FieldId::ClientName).to_string(),
        sales_manager: form.get(FieldId::SalesManager).to_string(),
        client_requester: form.get(FieldId::ClientRequester).to_string(),
        requester_email: form.get(FieldId::RequesterEmail).to_string(),
        event_name: form.get(FieldId::EventName).to_string(),
        dispatch_datetime: local_to_utc(local_time, offset),
        product_id: product.id,
        mms_title: form.get(FieldId::MmsTitle).to_string(),
        mms_content: form.get(FieldId::MmsContent).to_string(),
        sender_phone: form.get(FieldId::SenderPhone).to_string(),
        recipients: phones
            .into_iter()
            .map(|phone_number| RecipientRecord { phone_number })
            .collect(),
    };

    Ok(SubmissionDraft {
        request,
        product_name: product.name.clone(),
        local_time,
    })
}

/// The offset `minutes` east of UTC, or `None` outside -23:59..=+23:59.
pub fn utc_offset(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    // A fixed offset maps every local time to exactly one instant.
    match offset.from_local_datetime(&local).single() {
        Some(time) => time.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&local),
    }
}
