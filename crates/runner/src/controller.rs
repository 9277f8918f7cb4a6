//! Run controller: drives one run through
//! `Idle → Negotiating → FetchingStartup → Forwarding → Presenting → Done`.
//!
//! Each stage must succeed before the next starts. The first error moves the
//! run to `Failed` and is returned once, tagged with the stage it came from.
//! Nothing is retried and a controller runs at most once.

use hohstartup_client::{
    HttpTransport, RelayForwarder, RequestIdGenerator, SessionNegotiator, StartupFetcher,
};
use hohstartup_core::{Endpoints, Error, RunState};
use hohstartup_storage::{HistoryLog, RunRecord};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::credentials::CredentialSource;
use crate::presenter::ResultPresenter;

fn stage_label(stage: &RunState) -> &'static str {
    match stage {
        RunState::Idle => "credential lookup",
        RunState::Negotiating => "session negotiation",
        RunState::FetchingStartup => "startup fetch",
        RunState::Forwarding => "relay forward",
        RunState::Presenting => "result presentation",
        RunState::Done | RunState::Failed => "run",
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{} failed: {}", stage_label(.stage), .source)]
pub struct RunError {
    /// State the run was in when the error occurred.
    pub stage: RunState,
    #[source]
    pub source: Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub state: RunState,
    pub web_resource_url: Option<String>,
}

pub struct RunController {
    credentials: Box<dyn CredentialSource>,
    negotiator: SessionNegotiator,
    fetcher: StartupFetcher,
    forwarder: RelayForwarder,
    presenter: Box<dyn ResultPresenter>,
    history: Option<HistoryLog>,
    state: RunState,
    transitions: Vec<RunState>,
}

impl RunController {
    pub fn new(
        credentials: Box<dyn CredentialSource>,
        transport: Arc<dyn HttpTransport>,
        endpoints: Endpoints,
        request_ids: Arc<dyn RequestIdGenerator>,
        presenter: Box<dyn ResultPresenter>,
    ) -> Self {
        let fetcher = StartupFetcher::new(transport.clone(), &endpoints.startup, request_ids);
        let forwarder = RelayForwarder::new(transport.clone(), &endpoints.relay);
        let negotiator = SessionNegotiator::new(transport, endpoints);
        Self {
            credentials,
            negotiator,
            fetcher,
            forwarder,
            presenter,
            history: None,
            state: RunState::Idle,
            transitions: vec![RunState::Idle],
        }
    }

    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Every state the run has been in, starting with `Idle`.
    pub fn transitions(&self) -> &[RunState] {
        &self.transitions
    }

    pub async fn run(&mut self) -> Result<RunReport, RunError> {
        if self.state != RunState::Idle {
            return Err(RunError {
                stage: self.state,
                source: Error::Config("run controller has already been used".to_string()),
            });
        }

        let started = Instant::now();
        let result = self.drive().await;
        self.record(&result, started.elapsed().as_millis() as u64);
        result
    }

    async fn drive(&mut self) -> Result<RunReport, RunError> {
        let credentials = match self.credentials.get_credentials() {
            Ok(Some(creds)) if creds.is_complete() => creds,
            Ok(_) => {
                return Err(self.fail(Error::CredentialsMissing(
                    "no username/password available".to_string(),
                )))
            }
            Err(e) => return Err(self.fail(e)),
        };

        self.advance(RunState::Negotiating);
        let context = match self.negotiator.negotiate(&credentials).await {
            Ok(ctx) => ctx,
            Err(e) => return Err(self.fail(e)),
        };

        self.advance(RunState::FetchingStartup);
        let payload = match self.fetcher.fetch(&context).await {
            Ok(p) => p,
            Err(e) => return Err(self.fail(e)),
        };

        self.advance(RunState::Forwarding);
        let relay = match self.forwarder.forward(&payload).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };

        self.advance(RunState::Presenting);
        let follow_up = relay.follow_up_url().map(str::to_string);
        match follow_up.as_deref() {
            Some(url) => {
                if let Err(e) = self.presenter.open_resource(url) {
                    return Err(self.fail(e));
                }
            }
            None => info!("Relay returned no follow-up resource"),
        }

        self.advance(RunState::Done);
        Ok(RunReport {
            state: RunState::Done,
            web_resource_url: follow_up,
        })
    }

    fn advance(&mut self, next: RunState) {
        info!(from = %self.state, to = %next, "Run state changed");
        self.state = next;
        self.transitions.push(next);
    }

    fn fail(&mut self, source: Error) -> RunError {
        let stage = self.state;
        error!(stage = %stage, kind = %source.kind(), error = %source, "Run failed");
        self.state = RunState::Failed;
        self.transitions.push(RunState::Failed);
        RunError { stage, source }
    }

    fn record(&self, result: &Result<RunReport, RunError>, duration_ms: u64) {
        let Some(history) = &self.history else {
            return;
        };
        let record = match result {
            Ok(report) => RunRecord::done(duration_ms, report.web_resource_url.is_some()),
            Err(e) => RunRecord::failed(duration_ms, e.stage, e.source.kind(), &e.source.to_string()),
        };
        if let Err(e) = history.append(&record) {
            warn!(error = %e, "Failed to write run history");
        }
    }
}
