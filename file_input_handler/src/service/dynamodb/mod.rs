mod put_record;

use anyhow::Result;
use aws_sdk_dynamodb as dynamodb;
use lambda_http::tracing;
#[allow(unused_imports)]
use mockall::automock;
use models_file_record::FileRecord;
use serde::Serialize;

#[cfg(test)]
pub use MockFileTableClient as FileTable;
#[cfg(not(test))]
pub use FileTableClient as FileTable;

/// Acknowledgment returned to the caller once the write has gone through.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRecordAck {
    pub request_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FileTableClient {
    /// Inner DynamoDB client
    inner: dynamodb::Client,
    table: String,
}

#[cfg_attr(test, automock)]
impl FileTableClient {
    pub fn new(inner: dynamodb::Client, table: String) -> Self {
        Self { inner, table }
    }

    #[tracing::instrument(skip(self, record))]
    pub async fn put_record(&self, record: &FileRecord) -> Result<PutRecordAck> {
        put_record::put_record(&self.inner, &self.table, record).await
    }
}
