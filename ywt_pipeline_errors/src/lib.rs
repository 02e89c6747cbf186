/// The errors a pipeline function can report at its boundary.
///
/// Functions never re-raise: every failure is converted into one of these and
/// serialized into the response payload, with [PipelineError::status_code]
/// providing the numeric status and the `Display` text becoming the body.
#[derive(thiserror::Error, Debug, serde::Serialize)]
#[serde(tag = "type")]
pub enum PipelineError {
    #[error("{details}")]
    InvalidInput { details: String },
    #[error("{details}")]
    UpstreamFailure { details: String },
    #[error("{details}")]
    LaunchFailure { details: String },
    #[error("Unsupported route: \"{route}\"")]
    UnsupportedOperation { route: String },
}

impl PipelineError {
    /// The request payload was missing, unparseable, or failed validation.
    pub fn invalid_input(details: impl Into<String>) -> Self {
        PipelineError::InvalidInput {
            details: details.into(),
        }
    }

    /// The metadata store rejected or failed the write.
    pub fn upstream_failure(source: &anyhow::Error) -> Self {
        PipelineError::UpstreamFailure {
            details: source.to_string(),
        }
    }

    /// The compute provider rejected the launch request.
    pub fn launch_failure(source: &anyhow::Error) -> Self {
        PipelineError::LaunchFailure {
            details: source.to_string(),
        }
    }

    /// The request did not match any route this pipeline serves.
    pub fn unsupported_route(route: impl Into<String>) -> Self {
        PipelineError::UnsupportedOperation {
            route: route.into(),
        }
    }

    /// The status reported alongside the body. Invalid input, upstream
    /// failures and unsupported routes all surface as 400 to callers; only a
    /// rejected launch is a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::InvalidInput { .. } => 400,
            PipelineError::UpstreamFailure { .. } => 400,
            PipelineError::LaunchFailure { .. } => 500,
            PipelineError::UnsupportedOperation { .. } => 400,
        }
    }
}
