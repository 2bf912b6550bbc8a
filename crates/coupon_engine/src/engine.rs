use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use coupon_core::{DispatchRequest, LoadId};
use coupon_logging::{coupon_debug, coupon_info};

use crate::api::{ApiSettings, DispatchApi, ReqwestApi};
use crate::spreadsheet::{load_first_column, SheetError};
use crate::{EngineError, EngineEvent};

enum EngineCommand {
    FetchProducts,
    LoadSpreadsheet { load_id: LoadId, path: PathBuf },
    SubmitDispatch(Box<DispatchRequest>),
}

/// Runs IO on a background tokio runtime and reports back as events.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<Self, EngineError> {
        let api = ReqwestApi::new(settings)?;
        Self::with_api(Arc::new(api))
    }

    pub fn with_api(api: Arc<dyn DispatchApi>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx).await;
                });
            }
            coupon_debug!("Engine command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_products(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchProducts);
    }

    pub fn load_spreadsheet(&self, load_id: LoadId, path: impl Into<PathBuf>) {
        let _ = self.cmd_tx.send(EngineCommand::LoadSpreadsheet {
            load_id,
            path: path.into(),
        });
    }

    pub fn submit_dispatch(&self, request: DispatchRequest) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::SubmitDispatch(Box::new(request)));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    api: &dyn DispatchApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::FetchProducts => EngineEvent::ProductsLoaded(api.fetch_products().await),
        EngineCommand::LoadSpreadsheet { load_id, path } => {
            coupon_info!("Reading spreadsheet {} (load {})", path.display(), load_id);
            // Workbook parsing is CPU bound.
            let result = tokio::task::spawn_blocking(move || load_first_column(&path))
                .await
                .unwrap_or_else(|err| Err(SheetError::Io(err.to_string())));
            EngineEvent::SpreadsheetLoaded { load_id, result }
        }
        EngineCommand::SubmitDispatch(request) => {
            EngineEvent::DispatchCompleted(api.create_dispatch(&request).await)
        }
    };
    let _ = event_tx.send(event);
}
