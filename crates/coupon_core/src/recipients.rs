//! Live normalizer for the manually entered recipient list.
//!
//! Every edit replaces the whole buffer: lines are reduced to at most eleven
//! ASCII digits, the list is capped at [`MAX_MANUAL_RECIPIENTS`] lines, blank
//! runs are collapsed and the caret is moved back by however many characters
//! the cleanup removed. Validity markers and line numbers are then rebuilt from
//! the cleaned text. Invalid lines are only marked, never rejected.

use coupon_logging::{coupon_debug, coupon_info};

use crate::phone::{check_phone, is_incomplete_010, MAX_PHONE_DIGITS};

/// Maximum number of lines in the manual list.
pub const MAX_MANUAL_RECIPIENTS: usize = 100;

/// What produced a text change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputOrigin {
    #[default]
    Typing,
    /// A clipboard paste. Only pastes report dropped overflow lines.
    Paste,
    /// Programmatic clear of the whole list.
    Reset,
}

/// Validity marker shown next to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMarker {
    Blank,
    Valid,
    Invalid,
}

impl LineMarker {
    fn for_digits(digits: &str) -> Self {
        if digits.trim().is_empty() {
            LineMarker::Blank
        } else if check_phone(digits).is_ok() {
            LineMarker::Valid
        } else {
            LineMarker::Invalid
        }
    }
}

/// One line of the normalized buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientLine {
    /// 1-based position in the list.
    pub line_index: usize,
    pub digits: String,
    pub marker: LineMarker,
}

/// Result of running the pipeline over a raw buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// Caret as a character offset into `text`.
    pub caret: usize,
    /// Lines cut by the row cap.
    pub dropped_lines: usize,
    /// The cap fired on a paste and the user should be told.
    pub overflow_notice: bool,
}

/// Rewrites `raw` into canonical form and moves `caret` (a character offset
/// into `raw`) to the matching spot in the output.
pub fn normalize(raw: &str, caret: usize, origin: InputOrigin) -> Normalized {
    let mut lines: Vec<String> = raw.split('\n').map(sanitize_line).collect();

    let mut dropped_lines = 0;
    if lines.len() > MAX_MANUAL_RECIPIENTS {
        dropped_lines = lines.len() - MAX_MANUAL_RECIPIENTS;
        lines.truncate(MAX_MANUAL_RECIPIENTS);
    }
    let overflow_notice = dropped_lines > 0 && origin == InputOrigin::Paste;

    let text = collapse_blank_runs(&lines.join("\n"));

    // Cleanup only ever removes characters.
    let out_len = text.chars().count();
    let removed = raw.chars().count().saturating_sub(out_len);
    let caret = caret.saturating_sub(removed).min(out_len);

    Normalized {
        text,
        caret,
        dropped_lines,
        overflow_notice,
    }
}

fn sanitize_line(line: &str) -> String {
    line.chars()
        .filter(char::is_ascii_digit)
        .take(MAX_PHONE_DIGITS)
        .collect()
}

fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_newline = false;
    for c in text.chars() {
        if c == '\n' {
            if !prev_newline {
                out.push(c);
            }
            prev_newline = true;
        } else {
            out.push(c);
            prev_newline = false;
        }
    }
    out
}

/// What happened to an Enter key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// A newline was inserted at the caret.
    Inserted,
    /// The list is full; the user is told.
    LimitReached,
    /// The current line is blank or an incomplete `010` number.
    Rejected,
}

/// What happened to a text edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditOutcome {
    pub dropped_lines: usize,
    pub overflow_notice: bool,
}

/// The manual list as the input field shows it, with its derived gutters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientList {
    text: String,
    caret: usize,
    lines: Vec<RecipientLine>,
    scroll_offset: u32,
}

impl Default for RecipientList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipientList {
    /// An empty list, already run through the pipeline once so the gutter
    /// shows line 1.
    pub fn new() -> Self {
        let mut list = Self {
            text: String::new(),
            caret: 0,
            lines: Vec::new(),
            scroll_offset: 0,
        };
        list.apply_edit("", 0, InputOrigin::Reset);
        list
    }

    /// Replaces the buffer with `raw` (caret given as a character offset into
    /// `raw`) and rebuilds every derived value.
    pub fn apply_edit(&mut self, raw: &str, caret: usize, origin: InputOrigin) -> EditOutcome {
        let normalized = normalize(raw, caret, origin);
        if normalized.dropped_lines > 0 {
            coupon_info!(
                "Manual list capped at {} lines, dropped {} ({:?})",
                MAX_MANUAL_RECIPIENTS,
                normalized.dropped_lines,
                origin
            );
        }

        self.lines = normalized
            .text
            .split('\n')
            .enumerate()
            .map(|(idx, digits)| RecipientLine {
                line_index: idx + 1,
                digits: digits.to_string(),
                marker: LineMarker::for_digits(digits),
            })
            .collect();
        self.text = normalized.text;
        self.caret = normalized.caret;

        EditOutcome {
            dropped_lines: normalized.dropped_lines,
            overflow_notice: normalized.overflow_notice,
        }
    }

    /// Handles Enter at `caret`: inserts a newline unless the list is full or
    /// the line being completed should not be finished yet.
    pub fn press_enter(&mut self, caret: usize) -> EnterOutcome {
        if self.line_count() >= MAX_MANUAL_RECIPIENTS {
            return EnterOutcome::LimitReached;
        }

        let split = byte_offset(&self.text, caret);
        let before = &self.text[..split];
        let current_line = before.rsplit('\n').next().unwrap_or("");
        if current_line.trim().is_empty() || is_incomplete_010(current_line) {
            coupon_debug!("Enter rejected on line {:?}", current_line);
            return EnterOutcome::Rejected;
        }

        let mut raw = String::with_capacity(self.text.len() + 1);
        raw.push_str(before);
        raw.push('\n');
        raw.push_str(&self.text[split..]);
        let caret = before.chars().count() + 1;
        self.apply_edit(&raw, caret, InputOrigin::Typing);
        EnterOutcome::Inserted
    }

    /// Clears the buffer by running the pipeline on empty input.
    pub fn reset(&mut self) {
        self.apply_edit("", 0, InputOrigin::Reset);
        self.scroll_offset = 0;
    }

    pub fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn lines(&self) -> &[RecipientLine] {
        &self.lines
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    /// Number of lines including the blank line being composed.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines that hold a number; drives the "N / 100" counter.
    pub fn filled_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.marker != LineMarker::Blank)
            .count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn has_invalid(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.marker == LineMarker::Invalid)
    }

    /// Non-blank lines in order.
    pub fn phones(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.digits.trim())
            .filter(|digits| !digits.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
