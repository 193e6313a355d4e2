use crate::RunContext;
use adcampaign_core::{EventStream, Result, Stage, StageEvent};
use adcampaign_session::{CampaignRun, CreateRequest, SessionService};
use adcampaign_telemetry::{Instrument, pipeline_run_span};
use async_stream::stream;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;

/// Author recorded on the event that carries the initiating text.
pub const USER_AUTHOR: &str = "user";

pub struct RunnerConfig {
    pub app_name: String,
    pub pipeline: Arc<dyn Stage>,
    pub session_service: Arc<dyn SessionService>,
}

/// A started run: its identity and the lazy stream of stage events.
pub struct RunHandle {
    pub run: CampaignRun,
    pub events: EventStream,
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Done,
    Failed { stage: Option<String>, error: String },
}

impl RunStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Everything a finished run produced, including the partial event log of a
/// failed one.
#[derive(Debug, Clone)]
pub struct CampaignOutcome {
    pub run: CampaignRun,
    pub events: Vec<StageEvent>,
    pub status: RunStatus,
}

impl CampaignOutcome {
    /// Event texts in emission order, one per line.
    pub fn output(&self) -> String {
        self.events.iter().map(StageEvent::text).collect::<Vec<_>>().join("\n")
    }
}

/// Drives the pipeline once per request, each time in a fresh session.
pub struct Runner {
    app_name: String,
    pipeline: Arc<dyn Stage>,
    session_service: Arc<dyn SessionService>,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            app_name: config.app_name,
            pipeline: config.pipeline,
            session_service: config.session_service,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn session_service(&self) -> &Arc<dyn SessionService> {
        &self.session_service
    }

    /// Creates the run's session and returns the event stream.
    ///
    /// Nothing executes until the stream is polled. Every event is appended to
    /// the session log before it is yielded; the first error ends the stream.
    pub async fn run(
        &self,
        user_id: impl Into<String>,
        session_id: Option<String>,
        description: impl Into<String>,
    ) -> Result<RunHandle> {
        let description = description.into();
        let session = self
            .session_service
            .create(CreateRequest {
                app_name: self.app_name.clone(),
                user_id: user_id.into(),
                session_id,
                state: HashMap::new(),
            })
            .await?;
        let run = session.run().clone();

        let invocation_id = format!("inv-{}", uuid::Uuid::new_v4());
        let span = pipeline_run_span(self.pipeline.name(), &invocation_id, &run.session_id);
        let ctx = Arc::new(RunContext::new(invocation_id.clone(), description.clone(), session));
        let pipeline = self.pipeline.clone();
        let session_service = self.session_service.clone();
        let log_run = run.clone();

        let s = stream! {
            let user_event = StageEvent::new(&invocation_id, USER_AUTHOR, description);
            if let Err(e) = session_service.append_event(&log_run, user_event).await {
                yield Err(e);
                return;
            }
            tracing::info!(parent: &span, "campaign run started");

            let mut events = match pipeline.execute(ctx).instrument(span.clone()).await {
                Ok(events) => events,
                Err(e) => {
                    tracing::error!(parent: &span, error = %e, "campaign run failed");
                    yield Err(e);
                    return;
                }
            };

            while let Some(result) = events.next().instrument(span.clone()).await {
                match result {
                    Ok(event) => {
                        if let Err(e) = session_service.append_event(&log_run, event.clone()).await {
                            yield Err(e);
                            return;
                        }
                        yield Ok(event);
                    }
                    Err(e) => {
                        tracing::error!(parent: &span, stage = e.stage(), error = %e, "campaign run failed");
                        yield Err(e);
                        return;
                    }
                }
            }
            tracing::info!(parent: &span, "campaign run finished");
        };

        Ok(RunHandle { run, events: Box::pin(s) })
    }

    /// Runs the pipeline to its end and collects the outcome.
    ///
    /// Only session creation failures surface as `Err`; a failing stage is
    /// reported through [`RunStatus::Failed`] alongside the events emitted
    /// before it.
    pub async fn run_to_completion(
        &self,
        user_id: impl Into<String>,
        session_id: Option<String>,
        description: impl Into<String>,
    ) -> Result<CampaignOutcome> {
        let RunHandle { run, mut events } = self.run(user_id, session_id, description).await?;

        let mut collected = Vec::new();
        let mut status = RunStatus::Done;
        while let Some(result) = events.next().await {
            match result {
                Ok(event) => collected.push(event),
                Err(e) => {
                    status = RunStatus::Failed {
                        stage: e.stage().map(str::to_string),
                        error: e.to_string(),
                    };
                    break;
                }
            }
        }

        Ok(CampaignOutcome { run, events: collected, status })
    }
}
