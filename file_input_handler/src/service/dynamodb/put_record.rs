use anyhow::{Context, Result};
use aws_sdk_dynamodb::operation::RequestId;
use lambda_http::tracing;
use models_file_record::FileRecord;
use serde_dynamo::to_item;

use super::PutRecordAck;

/// Unconditional put keyed by the record id, so a re-submitted id overwrites
/// the previous record.
#[tracing::instrument(skip(client, record))]
pub(in crate::service::dynamodb) async fn put_record(
    client: &aws_sdk_dynamodb::Client,
    table: &str,
    record: &FileRecord,
) -> Result<PutRecordAck> {
    let item = to_item(record).context("failed to convert file record")?;

    let output = client
        .put_item()
        .table_name(table)
        .set_item(Some(item))
        .send()
        .await
        .context("could not put item, dynamodb")?;

    Ok(PutRecordAck {
        request_id: output.request_id().map(String::from),
    })
}
