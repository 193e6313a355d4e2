//! Span helpers for pipeline, stage and adapter operations

use tracing::Span;

/// Span covering one full campaign run.
///
/// # Example
/// ```
/// use adcampaign_telemetry::pipeline_run_span;
/// let span = pipeline_run_span("AdCampaignPipeline", "inv-123", "session-1");
/// let _enter = span.enter();
/// ```
pub fn pipeline_run_span(pipeline: &str, invocation_id: &str, session_id: &str) -> Span {
    tracing::info_span!(
        "pipeline.run",
        pipeline.name = pipeline,
        invocation.id = invocation_id,
        session.id = session_id,
        otel.kind = "internal"
    )
}

/// Span covering one stage execution.
pub fn stage_run_span(stage_name: &str, invocation_id: &str) -> Span {
    tracing::info_span!(
        "stage.run",
        stage.name = stage_name,
        invocation.id = invocation_id,
        otel.kind = "internal"
    )
}

/// Span for a call into an external service adapter.
///
/// # Example
/// ```
/// use adcampaign_telemetry::adapter_call_span;
/// let span = adapter_call_span("gemini", "generate");
/// let _enter = span.enter();
/// ```
pub fn adapter_call_span(adapter: &str, operation: &str) -> Span {
    tracing::info_span!(
        "adapter.call",
        adapter.name = adapter,
        adapter.operation = operation,
        otel.kind = "client"
    )
}

/// Span for the asset work done for one influencer.
pub fn influencer_span(handle: &str) -> Span {
    tracing::debug_span!("influencer.assets", influencer.handle = handle)
}
