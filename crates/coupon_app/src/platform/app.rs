use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::time::Duration;

use anyhow::Context;
use coupon_core::{update, AppState, Msg, SessionSettings};
use coupon_engine::EngineHandle;
use coupon_logging::{coupon_debug, coupon_info, set_msg_seq};

use super::commands::{self, Input, SessionCommand, HELP};
use super::config::load_config;
use super::effects::{EffectRunner, Followup};
use super::logging;
use super::ui::render::{render, status_line};
use crate::Cli;

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(cli.log, cli.verbose);

    let config = load_config(&cli.config);
    let engine = EngineHandle::new(config.api_settings(cli.api_base_url.as_deref()))
        .context("Could not start the background engine")?;
    let runner = EffectRunner::new(engine, cli.yes);
    let mut session = Session::new(config.session_settings(), runner, config.engine_wait());

    let interactive = cli.script.is_none();
    let mut input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Could not open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", render(&session.state.view()))?;
    if interactive {
        writeln!(out, "Type 'help' for commands.")?;
    }

    loop {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if let Flow::Exit = session.handle_line(&line, &mut out)? {
            break;
        }
    }
    coupon_info!("Session ended after {} messages", session.seq);
    Ok(())
}

enum Flow {
    Continue,
    Exit,
}

struct Session {
    settings: SessionSettings,
    state: AppState,
    runner: EffectRunner,
    engine_wait: Duration,
    seq: u64,
}

impl Session {
    fn new(settings: SessionSettings, runner: EffectRunner, engine_wait: Duration) -> Self {
        Self {
            state: AppState::new(settings.clone()),
            settings,
            runner,
            engine_wait,
            seq: 0,
        }
    }

    fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> anyhow::Result<Flow> {
        if let Some(confirmation) = self.state.pending_confirmation().cloned() {
            return match commands::parse_answer(line) {
                Some(accepted) => self.dispatch(
                    Msg::ConfirmationResolved {
                        confirmation,
                        accepted,
                    },
                    out,
                ),
                None => {
                    writeln!(out, "Answer y or n.")?;
                    Ok(Flow::Continue)
                }
            };
        }

        let input = match commands::parse_command(line) {
            Ok(Some(input)) => input,
            Ok(None) => return Ok(Flow::Continue),
            Err(err) => {
                writeln!(out, "{err}")?;
                return Ok(Flow::Continue);
            }
        };
        match input {
            Input::Session(SessionCommand::Quit) => Ok(Flow::Exit),
            Input::Session(SessionCommand::Show) => {
                write!(out, "{}", render(&self.state.view()))?;
                Ok(Flow::Continue)
            }
            Input::Session(SessionCommand::Help) => {
                writeln!(out, "{HELP}")?;
                Ok(Flow::Continue)
            }
            Input::Form(command) => match commands::to_msg(command, &self.state) {
                Ok(msg) => self.dispatch(msg, out),
                Err(err) => {
                    writeln!(out, "{err:#}")?;
                    Ok(Flow::Continue)
                }
            },
        }
    }

    /// Runs a message and everything it triggers, including engine work,
    /// until the form is idle again. Engine results that arrived after an
    /// earlier wait gave up are applied first.
    fn dispatch(&mut self, msg: Msg, out: &mut dyn Write) -> anyhow::Result<Flow> {
        let mut queue: VecDeque<Msg> = self.runner.drain_ready().into();
        queue.push_back(msg);
        loop {
            while let Some(msg) = queue.pop_front() {
                self.seq += 1;
                set_msg_seq(self.seq);
                coupon_debug!("Applying {:?}", msg);

                let state = std::mem::take(&mut self.state);
                let (mut state, effects) = update(state, msg);
                if state.consume_dirty() {
                    writeln!(out, "{}", status_line(&state.view()))?;
                }
                self.state = state;

                for followup in self.runner.run(effects, out)? {
                    match followup {
                        Followup::Msg(next) => queue.push_back(next),
                        Followup::Reload => {
                            coupon_info!("Reloading the form");
                            self.state = AppState::new(self.settings.clone());
                            write!(out, "{}", render(&self.state.view()))?;
                        }
                        Followup::Leave(url) => {
                            coupon_info!("Leaving for {}", url);
                            writeln!(out, "Leaving for {url}.")?;
                            return Ok(Flow::Exit);
                        }
                    }
                }
            }
            if !self.runner.has_in_flight() {
                return Ok(Flow::Continue);
            }
            match self.runner.wait_for_engine(self.engine_wait) {
                Some(msg) => queue.push_back(msg),
                None => {
                    writeln!(out, "! No response from the background engine.")?;
                    return Ok(Flow::Continue);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupon_core::{ImportState, PickerState, RecipientTab};
    use coupon_engine::ApiSettings;

    use crate::platform::effects::tests::slow_runner;

    const WAIT: Duration = Duration::from_secs(5);

    fn session(auto_confirm: bool) -> Session {
        let engine = EngineHandle::new(ApiSettings::default()).unwrap();
        Session::new(
            SessionSettings::default(),
            EffectRunner::new(engine, auto_confirm),
            WAIT,
        )
    }

    fn feed(session: &mut Session, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for line in lines {
            session.handle_line(line, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn typed_commands_edit_the_list() {
        let mut session = session(false);
        let output = feed(&mut session, &["type 010-1234-5678", "enter", "type 016"]);
        assert_eq!(session.state.manual().text(), "01012345678\n016");
        assert!(output.contains("[manual 2 / 100 | product -]"));
    }

    #[test]
    fn confirmation_waits_for_answer() {
        let mut session = session(false);
        let output = feed(
            &mut session,
            &["paste 01012345678", "clear-list", "maybe", "n"],
        );
        assert!(output.contains("? Reset all entered phone numbers? [y/n]"));
        assert!(output.contains("Answer y or n."));
        assert_eq!(session.state.manual().text(), "01012345678");

        feed(&mut session, &["clear-list", "y"]);
        assert!(session.state.manual().is_blank());
    }

    #[test]
    fn spreadsheet_is_read_through_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.csv");
        std::fs::write(&path, "010-1234-5678\n0161234567\n").unwrap();

        let file_cmd = format!("file {}", path.display());
        let mut session = session(true);
        let output = feed(&mut session, &["tab import", file_cmd.as_str()]);
        assert_eq!(session.state.active_tab(), RecipientTab::Import);
        assert!(matches!(session.state.import(), ImportState::Loaded(batch) if batch.len() == 2));
        assert!(output.contains("[import total 2 | product -]"));
    }

    #[test]
    fn reload_with_auto_confirm_resets_everything() {
        let mut session = session(true);
        feed(&mut session, &["set client_name Acme", "paste 01012345678"]);
        let output = feed(&mut session, &["reload"]);
        assert!(output.contains("Unsaved input will be lost"));
        assert!(!session.state.has_unsaved_input());
    }

    #[test]
    fn late_products_are_applied_on_the_next_command() {
        let mut session = Session::new(
            SessionSettings::default(),
            slow_runner(Duration::from_millis(300)),
            Duration::from_millis(10),
        );
        let output = feed(&mut session, &["products"]);
        assert!(output.contains("! No response from the background engine."));
        assert_eq!(session.state.view().picker, PickerState::Loading);

        std::thread::sleep(Duration::from_millis(800));
        feed(&mut session, &["scroll 0"]);
        assert_eq!(session.state.view().picker, PickerState::Open);
        assert_eq!(session.state.view().picker_products.len(), 1);
        assert!(!session.runner.has_in_flight());
    }

    #[test]
    fn leaving_ends_the_session() {
        let mut session = session(false);
        let mut out = Vec::new();
        let flow = session.handle_line("open https://example.com", &mut out).unwrap();
        assert!(matches!(flow, Flow::Exit));
    }
}
