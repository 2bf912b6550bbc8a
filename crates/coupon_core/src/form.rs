use chrono::NaiveDateTime;

use crate::catalog::Product;

/// Text inputs of the dispatch form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    ClientName,
    SalesManager,
    ClientRequester,
    RequesterPhone,
    RequesterEmail,
    EventName,
    MmsTitle,
    MmsContent,
    SenderPhone,
}

impl FieldId {
    pub const ALL: [FieldId; 9] = [
        FieldId::ClientName,
        FieldId::SalesManager,
        FieldId::ClientRequester,
        FieldId::RequesterPhone,
        FieldId::RequesterEmail,
        FieldId::EventName,
        FieldId::MmsTitle,
        FieldId::MmsContent,
        FieldId::SenderPhone,
    ];

    /// Character limit, enforced like an input `maxlength`.
    pub fn max_len(self) -> usize {
        match self {
            FieldId::ClientName
            | FieldId::SalesManager
            | FieldId::ClientRequester
            | FieldId::RequesterEmail => 30,
            FieldId::RequesterPhone | FieldId::SenderPhone => 11,
            FieldId::EventName => 50,
            FieldId::MmsTitle => 20,
            FieldId::MmsContent => 200,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::ClientName => "Client",
            FieldId::SalesManager => "Sales manager",
            FieldId::ClientRequester => "Client requester",
            FieldId::RequesterPhone => "Requester phone",
            FieldId::RequesterEmail => "Requester email",
            FieldId::EventName => "Event name",
            FieldId::MmsTitle => "Title",
            FieldId::MmsContent => "Content",
            FieldId::SenderPhone => "Sender phone",
        }
    }
}

/// Values the form starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    pub sales_manager: String,
    pub sender_phone: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            sales_manager: String::new(),
            sender_phone: "16683551".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchForm {
    client_name: String,
    sales_manager: String,
    client_requester: String,
    requester_phone: String,
    requester_email: String,
    event_name: String,
    mms_title: String,
    mms_content: String,
    sender_phone: String,
    dispatch_time: String,
    product: Option<Product>,
}

impl DispatchForm {
    pub fn new(defaults: &FormDefaults) -> Self {
        Self {
            sales_manager: defaults.sales_manager.clone(),
            sender_phone: defaults.sender_phone.clone(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::ClientName => &self.client_name,
            FieldId::SalesManager => &self.sales_manager,
            FieldId::ClientRequester => &self.client_requester,
            FieldId::RequesterPhone => &self.requester_phone,
            FieldId::RequesterEmail => &self.requester_email,
            FieldId::EventName => &self.event_name,
            FieldId::MmsTitle => &self.mms_title,
            FieldId::MmsContent => &self.mms_content,
            FieldId::SenderPhone => &self.sender_phone,
        }
    }

    /// Stores `value` cut to the field's character limit.
    pub fn set(&mut self, field: FieldId, value: &str) {
        let value: String = value.chars().take(field.max_len()).collect();
        let slot = match field {
            FieldId::ClientName => &mut self.client_name,
            FieldId::SalesManager => &mut self.sales_manager,
            FieldId::ClientRequester => &mut self.client_requester,
            FieldId::RequesterPhone => &mut self.requester_phone,
            FieldId::RequesterEmail => &mut self.requester_email,
            FieldId::EventName => &mut self.event_name,
            FieldId::MmsTitle => &mut self.mms_title,
            FieldId::MmsContent => &mut self.mms_content,
            FieldId::SenderPhone => &mut self.sender_phone,
        };
        *slot = value;
    }

    pub fn dispatch_time_input(&self) -> &str {
        &self.dispatch_time
    }

    pub fn set_dispatch_time(&mut self, value: &str) {
        self.dispatch_time = value.trim().to_string();
    }

    /// Parsed local dispatch time, `None` when blank or malformed.
    pub fn dispatch_time(&self) -> Option<NaiveDateTime> {
        parse_dispatch_time(&self.dispatch_time)
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn select_product(&mut self, product: Product) {
        self.product = Some(product);
    }

    /// True when anything differs from a freshly opened form.
    pub fn has_unsaved_input(&self, defaults: &FormDefaults) -> bool {
        if self.sales_manager != defaults.sales_manager || self.sender_phone != defaults.sender_phone
        {
            return true;
        }
        if !self.dispatch_time.is_empty() || self.product.is_some() {
            return true;
        }
        FieldId::ALL
            .iter()
            .filter(|field| !matches!(field, FieldId::SalesManager | FieldId::SenderPhone))
            .any(|field| !self.get(*field).trim().is_empty())
    }
}

const DISPATCH_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

pub fn parse_dispatch_time(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    DISPATCH_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

/// "12 / 30" style counter.
pub fn char_counter(value: &str, max_len: usize) -> String {
    format!("{} / {}", value.chars().count(), max_len)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailFeedback {
    /// Empty input: show the character counter instead.
    #[default]
    Counter,
    Valid,
    Invalid,
}

/// Shape check equivalent to `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
pub fn email_feedback(value: &str) -> EmailFeedback {
    if value.is_empty() {
        return EmailFeedback::Counter;
    }
    if looks_like_email(value) {
        EmailFeedback::Valid
    } else {
        EmailFeedback::Invalid
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let last = domain.chars().count().saturating_sub(1);
    domain
        .chars()
        .enumerate()
        .any(|(idx, c)| c == '.' && idx > 0 && idx < last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_truncates_to_field_limit() {
        let mut form = DispatchForm::new(&FormDefaults::default());
        form.set(FieldId::MmsTitle, "쿠폰이 도착했습니다! 지금 바로 확인하세요. 기간 한정");
        assert_eq!(form.get(FieldId::MmsTitle).chars().count(), 20);
        form.set(FieldId::SenderPhone, "0212345678901234");
        assert_eq!(form.get(FieldId::SenderPhone), "02123456789");
    }

    #[test]
    fn defaults_are_not_unsaved_input() {
        let defaults = FormDefaults {
            sales_manager: "Kim".to_string(),
            sender_phone: "16683551".to_string(),
        };
        let mut form = DispatchForm::new(&defaults);
        assert!(!form.has_unsaved_input(&defaults));

        form.set(FieldId::SalesManager, "Lee");
        assert!(form.has_unsaved_input(&defaults));

        let mut form = DispatchForm::new(&defaults);
        form.set(FieldId::RequesterPhone, "0101");
        assert!(form.has_unsaved_input(&defaults));

        let mut form = DispatchForm::new(&defaults);
        form.set(FieldId::EventName, "   ");
        assert!(!form.has_unsaved_input(&defaults));
        form.set_dispatch_time("2026-11-01 10:00");
        assert!(form.has_unsaved_input(&defaults));
    }

    #[test]
    fn dispatch_time_accepts_picker_formats() {
        let expected = NaiveDateTime::parse_from_str("2026-11-01 09:30", "%Y-%m-%d %H:%M").ok();
        assert_eq!(parse_dispatch_time("2026-11-01 09:30"), expected);
        assert_eq!(parse_dispatch_time("2026-11-01T09:30"), expected);
        assert_eq!(parse_dispatch_time(" 2026-11-01 09:30:00 "), expected);
        assert_eq!(parse_dispatch_time("tomorrow"), None);
        assert_eq!(parse_dispatch_time(""), None);
    }

    #[test]
    fn email_feedback_shapes() {
        assert_eq!(email_feedback(""), EmailFeedback::Counter);
        assert_eq!(email_feedback("a@b.co"), EmailFeedback::Valid);
        assert_eq!(email_feedback("name@mail.example.com"), EmailFeedback::Valid);
        assert_eq!(email_feedback("a@b"), EmailFeedback::Invalid);
        assert_eq!(email_feedback("a@.com"), EmailFeedback::Invalid);
        assert_eq!(email_feedback("a@b."), EmailFeedback::Invalid);
        assert_eq!(email_feedback("a b@c.d"), EmailFeedback::Invalid);
        assert_eq!(email_feedback("a@b@c.d"), EmailFeedback::Invalid);
        assert_eq!(email_feedback("@b.c"), EmailFeedback::Invalid);
    }

    #[test]
    fn counter_counts_characters() {
        assert_eq!(char_counter("심재준", 30), "3 / 30");
    }
}
