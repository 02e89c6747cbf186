use std::sync::Arc;

use lambda_http::{
    Body, Error, Request, Response,
    http::{Method, StatusCode},
    tracing,
};
use models_file_record::FileRecord;
use serde::Serialize;
use ywt_pipeline_errors::PipelineError;

use crate::service;
use crate::service::dynamodb::PutRecordAck;

/// Body returned when the payload is missing or cannot be parsed.
pub static INVALID_INPUT_BODY: &str = "Invalid input. Please provide file object.";

/// The only route this function serves.
pub static FILE_INPUT_ROUTE: &str = "/fileInputData";

/// Handles one API request.
/// Failures never propagate to the runtime; they are converted into a
/// response with the matching status and a JSON-encoded message body.
#[tracing::instrument(skip(file_table, event))]
pub async fn handler(
    file_table: Arc<service::dynamodb::FileTable>,
    event: Request,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();

    if method != Method::POST || path != FILE_INPUT_ROUTE {
        tracing::error!(method=%method, path=%path, "rejecting unsupported route");
        return error_response(&PipelineError::unsupported_route(format!(
            "{} {}",
            method, path
        )));
    }

    match put_file_record(file_table, event.body()).await {
        Ok(ack) => json_response(StatusCode::OK, &ack),
        Err(err) => {
            tracing::error!(error=%err, "file input request failed");
            error_response(&err)
        }
    }
}

async fn put_file_record(
    file_table: Arc<service::dynamodb::FileTable>,
    body: &[u8],
) -> Result<PutRecordAck, PipelineError> {
    let record: FileRecord = serde_json::from_slice(body).map_err(|e| {
        tracing::error!(error=%e, "unable to parse request body");
        PipelineError::invalid_input(INVALID_INPUT_BODY)
    })?;

    record
        .validate()
        .map_err(|e| PipelineError::invalid_input(e.to_string()))?;

    file_table.put_record(&record).await.map_err(|e| {
        tracing::error!(error=?e, id=%record.id, "unable to store file record");
        PipelineError::upstream_failure(&e)
    })
}

/// Every body is JSON-encoded, error messages included.
fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, Error> {
    let body = serde_json::to_string(body)?;
    let response = Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))?;
    Ok(response)
}

fn error_response(err: &PipelineError) -> Result<Response<Body>, Error> {
    let status = StatusCode::from_u16(err.status_code())?;
    json_response(status, &err.to_string())
}
