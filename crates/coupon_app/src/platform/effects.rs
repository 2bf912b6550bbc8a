use std::io::{self, Write};
use std::time::Duration;

use coupon_core::{Effect, Flash, FocusTarget, Msg, NavigationTarget};
use coupon_engine::{EngineEvent, EngineHandle};
use coupon_logging::{coupon_info, coupon_warn};

/// What the session loop has to do after effects ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Followup {
    Msg(Msg),
    Reload,
    Leave(String),
}

pub(crate) struct EffectRunner {
    engine: EngineHandle,
    in_flight: usize,
    auto_confirm: bool,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, auto_confirm: bool) -> Self {
        Self {
            engine,
            in_flight: 0,
            auto_confirm,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>, out: &mut dyn Write) -> io::Result<Vec<Followup>> {
        let mut followups = Vec::new();
        for effect in effects {
            match effect {
                Effect::Alert(message) => writeln!(out, "! {message}")?,
                Effect::Flash(Flash::Pasted) => writeln!(out, "(pasted)")?,
                Effect::Flash(Flash::Rejected) => {
                    writeln!(out, "(the current line is not a complete phone number)")?
                }
                Effect::Focus(target) => writeln!(out, "-> {}", focus_label(target))?,
                Effect::Confirm {
                    confirmation,
                    prompt,
                } => {
                    if self.auto_confirm {
                        writeln!(out, "? {prompt} [y/n] y")?;
                        followups.push(Followup::Msg(Msg::ConfirmationResolved {
                            confirmation,
                            accepted: true,
                        }));
                    } else {
                        writeln!(out, "? {prompt} [y/n]")?;
                    }
                }
                Effect::FetchProducts => {
                    coupon_info!("Fetching product list");
                    self.in_flight += 1;
                    self.engine.fetch_products();
                }
                Effect::LoadSpreadsheet { load_id, path } => {
                    self.in_flight += 1;
                    self.engine.load_spreadsheet(load_id, path);
                }
                Effect::SubmitDispatch(request) => {
                    self.in_flight += 1;
                    self.engine.submit_dispatch(*request);
                }
                Effect::Navigate(NavigationTarget::Reload) => followups.push(Followup::Reload),
                Effect::Navigate(NavigationTarget::Url(url)) => followups.push(Followup::Leave(url)),
            }
        }
        Ok(followups)
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight > 0
    }

    /// Blocks for the next engine result. `None` means nothing arrived in
    /// time; the request stays in flight and its result is picked up later.
    pub fn wait_for_engine(&mut self, timeout: Duration) -> Option<Msg> {
        match self.engine.recv_timeout(timeout) {
            Some(event) => Some(self.received(event)),
            None => {
                coupon_warn!(
                    "No engine result after {:?}, {} still in flight",
                    timeout,
                    self.in_flight
                );
                None
            }
        }
    }

    /// Results that arrived since the last wait, without blocking.
    pub fn drain_ready(&mut self) -> Vec<Msg> {
        let mut ready = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            ready.push(self.received(event));
        }
        ready
    }

    fn received(&mut self, event: EngineEvent) -> Msg {
        self.in_flight = self.in_flight.saturating_sub(1);
        engine_event_to_msg(event)
    }
}

pub(crate) fn engine_event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ProductsLoaded(result) => {
            Msg::ProductsLoaded(result.map_err(|err| err.user_message()))
        }
        EngineEvent::SpreadsheetLoaded { load_id, result } => Msg::SpreadsheetDecoded {
            load_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::DispatchCompleted(result) => {
            Msg::DispatchCompleted(result.map_err(|err| err.user_message()))
        }
    }
}

fn focus_label(target: FocusTarget) -> &'static str {
    match target {
        FocusTarget::Field(field) => field.label(),
        FocusTarget::DispatchTime => "Dispatch time",
        FocusTarget::ManualList => "Recipient list",
        FocusTarget::FileInput => "File",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    use coupon_core::{Confirmation, DispatchReceipt, DispatchRequest, FieldId, Product};
    use coupon_engine::{ApiError, ApiSettings, DispatchApi, SheetError};
    use pretty_assertions::assert_eq;

    fn runner(auto_confirm: bool) -> EffectRunner {
        let engine = EngineHandle::new(ApiSettings::default()).unwrap();
        EffectRunner::new(engine, auto_confirm)
    }

    /// Answers every call after `delay`.
    pub(crate) struct SlowApi {
        pub delay: Duration,
    }

    #[async_trait::async_trait]
    impl DispatchApi for SlowApi {
        async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
            tokio::time::sleep(self.delay).await;
            Ok(vec![Product {
                id: 7,
                name: "Americano (R)".to_string(),
                expiry: None,
                price: None,
                location: None,
            }])
        }

        async fn create_dispatch(
            &self,
            request: &DispatchRequest,
        ) -> Result<DispatchReceipt, ApiError> {
            tokio::time::sleep(self.delay).await;
            Ok(DispatchReceipt {
                id: 1,
                quantity: request.recipients.len() as i64,
                event_name: Some(request.event_name.clone()),
            })
        }
    }

    pub(crate) fn slow_runner(delay: Duration) -> EffectRunner {
        let engine = EngineHandle::with_api(Arc::new(SlowApi { delay })).unwrap();
        EffectRunner::new(engine, false)
    }

    #[test]
    fn late_result_is_not_lost_after_a_timeout() {
        let mut runner = slow_runner(Duration::from_millis(300));
        let mut out = Vec::new();
        runner.run(vec![Effect::FetchProducts], &mut out).unwrap();

        assert_eq!(runner.wait_for_engine(Duration::from_millis(10)), None);
        assert!(runner.has_in_flight());

        runner.run(vec![Effect::FetchProducts], &mut out).unwrap();
        let first = runner.wait_for_engine(Duration::from_secs(5));
        assert!(matches!(first, Some(Msg::ProductsLoaded(Ok(_)))));
        assert!(runner.has_in_flight());
        let second = runner.wait_for_engine(Duration::from_secs(5));
        assert!(matches!(second, Some(Msg::ProductsLoaded(Ok(_)))));
        assert!(!runner.has_in_flight());
    }

    #[test]
    fn drain_picks_up_results_that_already_arrived() {
        let mut runner = slow_runner(Duration::from_millis(20));
        let mut out = Vec::new();
        assert!(runner.drain_ready().is_empty());

        runner.run(vec![Effect::FetchProducts], &mut out).unwrap();
        assert_eq!(runner.wait_for_engine(Duration::ZERO), None);
        std::thread::sleep(Duration::from_millis(500));

        let ready = runner.drain_ready();
        assert_eq!(ready.len(), 1);
        assert!(matches!(ready[0], Msg::ProductsLoaded(Ok(_))));
        assert!(!runner.has_in_flight());
    }

    #[test]
    fn alerts_and_focus_are_printed() {
        let mut out = Vec::new();
        let followups = runner(false)
            .run(
                vec![
                    Effect::Alert("Required field 'Client' is empty.".to_string()),
                    Effect::Focus(FocusTarget::Field(FieldId::ClientName)),
                ],
                &mut out,
            )
            .unwrap();
        assert!(followups.is_empty());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "! Required field 'Client' is empty.\n-> Client\n"
        );
    }

    #[test]
    fn auto_confirm_answers_yes() {
        let mut out = Vec::new();
        let followups = runner(true)
            .run(
                vec![Effect::Confirm {
                    confirmation: Confirmation::ResetManualList,
                    prompt: "Reset all entered phone numbers?".to_string(),
                }],
                &mut out,
            )
            .unwrap();
        assert_eq!(
            followups,
            vec![Followup::Msg(Msg::ConfirmationResolved {
                confirmation: Confirmation::ResetManualList,
                accepted: true,
            })]
        );
    }

    #[test]
    fn navigation_becomes_followups() {
        let mut out = Vec::new();
        let followups = runner(false)
            .run(
                vec![
                    Effect::Navigate(NavigationTarget::Reload),
                    Effect::Navigate(NavigationTarget::Url("https://example.com".to_string())),
                ],
                &mut out,
            )
            .unwrap();
        assert_eq!(
            followups,
            vec![
                Followup::Reload,
                Followup::Leave("https://example.com".to_string())
            ]
        );
    }

    #[test]
    fn engine_failures_become_user_text() {
        let mut err = ApiError {
            kind: coupon_engine::FailureKind::HttpStatus(400),
            message: "400 Bad Request".to_string(),
            detail: None,
        };
        assert_eq!(
            engine_event_to_msg(EngineEvent::DispatchCompleted(Err(err.clone()))),
            Msg::DispatchCompleted(Err("An unknown error occurred.".to_string()))
        );
        err.detail = Some("Sender phone is not registered".to_string());
        assert_eq!(
            engine_event_to_msg(EngineEvent::DispatchCompleted(Err(err))),
            Msg::DispatchCompleted(Err("Sender phone is not registered".to_string()))
        );
        assert_eq!(
            engine_event_to_msg(EngineEvent::SpreadsheetLoaded {
                load_id: 2,
                result: Err(SheetError::NoSheet),
            }),
            Msg::SpreadsheetDecoded {
                load_id: 2,
                result: Err("the workbook has no sheets".to_string()),
            }
        );
    }
}
