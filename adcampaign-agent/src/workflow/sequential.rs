use adcampaign_core::{EventStream, Result, Stage, StageContext};
use adcampaign_telemetry::{Instrument, stage_run_span};
use async_stream::stream;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs its stages once, in order.
///
/// Events from each stage are forwarded as they arrive. The first error,
/// whether returned from `execute` or yielded mid-stream, is forwarded
/// attributed to the failing stage and nothing after it runs.
pub struct SequentialPipeline {
    name: String,
    description: String,
    stages: Vec<Arc<dyn Stage>>,
}

impl SequentialPipeline {
    pub fn new(name: impl Into<String>, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { name: name.into(), description: String::new(), stages }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

#[async_trait]
impl Stage for SequentialPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn sub_stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    async fn execute(&self, ctx: Arc<dyn StageContext>) -> Result<EventStream> {
        let stages = self.stages.clone();
        let pipeline = self.name.clone();

        let s = stream! {
            use futures::StreamExt;

            for stage in &stages {
                tracing::info!(pipeline = %pipeline, stage = stage.name(), "stage started");
                let span = stage_run_span(stage.name(), ctx.invocation_id());

                let mut events = match stage.execute(ctx.clone()).instrument(span.clone()).await {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::error!(stage = stage.name(), error = %e, "stage failed");
                        yield Err(e.in_stage(stage.name()));
                        return;
                    }
                };

                while let Some(result) = events.next().instrument(span.clone()).await {
                    match result {
                        Ok(event) => yield Ok(event),
                        Err(e) => {
                            tracing::error!(stage = stage.name(), error = %e, "stage failed");
                            yield Err(e.in_stage(stage.name()));
                            return;
                        }
                    }
                }

                tracing::info!(pipeline = %pipeline, stage = stage.name(), "stage finished");
            }
        };

        Ok(Box::pin(s))
    }
}
