//! Line commands typed at the prompt (or read from a script) and the
//! messages they stand for.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use coupon_core::{AppState, FieldId, InputOrigin, Msg, NavigationTarget, RecipientTab};

pub(crate) const HELP: &str = "\
Commands:
  set <field> <value>   client_name, sales_manager, client_requester, requester_phone,
                        requester_email, event_name, mms_title, mms_content, sender_phone
  time <YYYY-MM-DD HH:MM>
  type <text>           type into the recipient list at the caret
  paste <text>          paste at the caret (\\n separates lines)
  paste-file <path>     paste the contents of a text file
  caret <n>             move the caret to character offset n
  enter                 press Enter in the recipient list
  scroll <px>           scroll the recipient list
  clear-list            reset the recipient list
  tab manual|import
  file [path]           choose a spreadsheet (no path clears the choice)
  clear-file            reset the chosen spreadsheet
  products              open the product search
  select <id>           pick a product
  close-products
  submit | cancel | reload | open <url>
  show | help | quit";

/// One parsed input line: either handled by the session itself or a form
/// command that becomes a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Session(SessionCommand),
    Form(Command),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Set { field: FieldId, value: String },
    Time(String),
    Type(String),
    Paste(String),
    PasteFile(PathBuf),
    Caret(usize),
    Enter,
    Scroll(u32),
    ClearList,
    Tab(RecipientTab),
    File(Option<PathBuf>),
    ClearFile,
    Products,
    Select(i64),
    CloseProducts,
    Submit,
    Cancel,
    Reload,
    Open(String),
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_command(line: &str) -> anyhow::Result<Option<Input>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = match trimmed.split_once(' ') {
        Some((verb, rest)) => (verb, rest),
        None => (trimmed, ""),
    };

    let command = match verb {
        "set" => {
            let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
            let field = field_by_key(key).ok_or_else(|| anyhow!("Unknown field '{key}'."))?;
            Command::Set {
                field,
                value: value.to_string(),
            }
        }
        "time" => Command::Time(rest.to_string()),
        "type" => Command::Type(rest.to_string()),
        "paste" => Command::Paste(rest.replace("\\n", "\n")),
        "paste-file" => Command::PasteFile(PathBuf::from(required(rest, "paste-file")?)),
        "caret" => Command::Caret(number(rest, "caret")?),
        "enter" => Command::Enter,
        "scroll" => Command::Scroll(number(rest, "scroll")?),
        "clear-list" => Command::ClearList,
        "tab" => match rest.trim() {
            "manual" => Command::Tab(RecipientTab::Manual),
            "import" => Command::Tab(RecipientTab::Import),
            other => bail!("Unknown tab '{other}'."),
        },
        "file" => {
            let path = rest.trim();
            Command::File((!path.is_empty()).then(|| PathBuf::from(path)))
        }
        "clear-file" => Command::ClearFile,
        "products" => Command::Products,
        "select" => Command::Select(number(rest, "select")?),
        "close-products" => Command::CloseProducts,
        "submit" => Command::Submit,
        "cancel" => Command::Cancel,
        "reload" => Command::Reload,
        "open" => Command::Open(required(rest, "open")?.to_string()),
        "show" => return Ok(Some(Input::Session(SessionCommand::Show))),
        "help" | "?" => return Ok(Some(Input::Session(SessionCommand::Help))),
        "quit" | "exit" => return Ok(Some(Input::Session(SessionCommand::Quit))),
        other => bail!("Unknown command '{other}'. Type 'help' for a list."),
    };
    Ok(Some(Input::Form(command)))
}

/// Reads a yes/no answer to a pending confirmation.
pub(crate) fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Turns a form command into the message it stands for. Editing commands
/// need the current list text and caret to build the edited text.
pub(crate) fn to_msg(command: Command, state: &AppState) -> anyhow::Result<Msg> {
    let manual = state.manual();
    let msg = match command {
        Command::Set { field, value } => Msg::FieldChanged { field, value },
        Command::Time(value) => Msg::DispatchTimeChanged(value),
        Command::Type(text) => edit(manual.text(), manual.caret(), &text, InputOrigin::Typing),
        Command::Paste(text) => edit(manual.text(), manual.caret(), &text, InputOrigin::Paste),
        Command::PasteFile(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            edit(manual.text(), manual.caret(), &text, InputOrigin::Paste)
        }
        Command::Caret(caret) => Msg::LineChanged {
            text: manual.text().to_string(),
            caret,
            origin: InputOrigin::Typing,
        },
        Command::Enter => Msg::EnterPressed {
            caret: manual.caret(),
        },
        Command::Scroll(offset) => Msg::RecipientsScrolled(offset),
        Command::ClearList => Msg::ResetManualRequested,
        Command::Tab(tab) => Msg::TabActivated(tab),
        Command::File(path) => Msg::FileSelected(path),
        Command::ClearFile => Msg::ResetImportRequested,
        Command::Products => Msg::ProductSearchRequested,
        Command::Select(id) => Msg::ProductSelected(id),
        Command::CloseProducts => Msg::ProductPickerClosed,
        Command::Submit => Msg::SubmitRequested,
        Command::Cancel => Msg::CancelRequested,
        Command::Reload => Msg::NavigationRequested(NavigationTarget::Reload),
        Command::Open(url) => Msg::NavigationRequested(NavigationTarget::Url(url)),
    };
    Ok(msg)
}

fn edit(text: &str, caret: usize, inserted: &str, origin: InputOrigin) -> Msg {
    let (text, caret) = insert_at(text, caret, inserted);
    Msg::LineChanged {
        text,
        caret,
        origin,
    }
}

/// Inserts at a char offset, returning the new text and the caret after
/// the insertion.
fn insert_at(text: &str, caret: usize, inserted: &str) -> (String, usize) {
    let byte = text
        .char_indices()
        .nth(caret)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    let mut out = String::with_capacity(text.len() + inserted.len());
    out.push_str(&text[..byte]);
    out.push_str(inserted);
    out.push_str(&text[byte..]);
    let caret = text[..byte].chars().count() + inserted.chars().count();
    (out, caret)
}

fn field_by_key(key: &str) -> Option<FieldId> {
    let field = match key {
        "client_name" => FieldId::ClientName,
        "sales_manager" => FieldId::SalesManager,
        "client_requester" => FieldId::ClientRequester,
        "requester_phone" => FieldId::RequesterPhone,
        "requester_email" => FieldId::RequesterEmail,
        "event_name" => FieldId::EventName,
        "mms_title" => FieldId::MmsTitle,
        "mms_content" => FieldId::MmsContent,
        "sender_phone" => FieldId::SenderPhone,
        _ => return None,
    };
    Some(field)
}

fn required<'a>(rest: &'a str, verb: &str) -> anyhow::Result<&'a str> {
    let value = rest.trim();
    if value.is_empty() {
        bail!("'{verb}' needs an argument.");
    }
    Ok(value)
}

fn number<T: std::str::FromStr>(rest: &str, verb: &str) -> anyhow::Result<T> {
    let value = required(rest, verb)?;
    value
        .parse()
        .map_err(|_| anyhow!("'{verb}' expects a number, got '{value}'."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_field_values_with_spaces() {
        assert_eq!(
            parse_command("set mms_content Enjoy your coffee\n").unwrap(),
            Some(Input::Form(Command::Set {
                field: FieldId::MmsContent,
                value: "Enjoy your coffee".to_string(),
            }))
        );
        assert!(parse_command("set nickname Bob").is_err());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("# fill in the form").unwrap(), None);
    }

    #[test]
    fn paste_expands_line_breaks() {
        assert_eq!(
            parse_command(r"paste 010-1234-5678\n0161234567").unwrap(),
            Some(Input::Form(Command::Paste(
                "010-1234-5678\n0161234567".to_string()
            )))
        );
    }

    #[test]
    fn file_without_path_clears() {
        assert_eq!(
            parse_command("file").unwrap(),
            Some(Input::Form(Command::File(None)))
        );
        assert_eq!(
            parse_command("file list.xlsx").unwrap(),
            Some(Input::Form(Command::File(Some(PathBuf::from("list.xlsx")))))
        );
    }

    #[test]
    fn numbers_are_checked() {
        assert_eq!(
            parse_command("select 7").unwrap(),
            Some(Input::Form(Command::Select(7)))
        );
        assert!(parse_command("select seven").is_err());
        assert!(parse_command("caret").is_err());
    }

    #[test]
    fn session_commands_stay_out_of_the_form() {
        assert_eq!(
            parse_command("show").unwrap(),
            Some(Input::Session(SessionCommand::Show))
        );
        assert_eq!(
            parse_command("?").unwrap(),
            Some(Input::Session(SessionCommand::Help))
        );
        assert_eq!(
            parse_command("exit\r\n").unwrap(),
            Some(Input::Session(SessionCommand::Quit))
        );
    }

    #[test]
    fn answers() {
        assert_eq!(parse_answer("Y"), Some(true));
        assert_eq!(parse_answer(" no "), Some(false));
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn insertion_follows_caret() {
        assert_eq!(insert_at("0101234", 3, "99"), ("010991234".to_string(), 5));
        assert_eq!(insert_at("010", 40, "1"), ("0101".to_string(), 4));
    }

    #[test]
    fn typing_builds_edit_from_current_text() {
        let state = AppState::default();
        let msg = to_msg(Command::Type("010".to_string()), &state).unwrap();
        assert_eq!(
            msg,
            Msg::LineChanged {
                text: "010".to_string(),
                caret: 3,
                origin: InputOrigin::Typing,
            }
        );
    }
}
