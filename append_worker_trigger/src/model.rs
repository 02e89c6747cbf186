use serde::Serialize;
use ywt_pipeline_errors::PipelineError;

/// The `{statusCode, body}` payload reported back to the invoking runtime.
/// The consumer never raises; failures are encoded here instead so the event
/// source sees a completed invocation either way.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub status_code: u16,
    pub body: String,
}

impl TriggerResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        TriggerResponse {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn from_error(err: &PipelineError) -> Self {
        TriggerResponse {
            status_code: err.status_code(),
            body: err.to_string(),
        }
    }
}
