pub mod submit_record;
pub mod upload_file;

use anyhow::Result;
use aws_sdk_s3 as s3;
use uuid::{NoContext, Timestamp, Uuid};

/// Route served by the file input function.
pub static FILE_INPUT_ROUTE: &str = "/fileInputData";

/// Generates a time-ordered id for a new file record.
pub fn new_record_id() -> Uuid {
    Uuid::new_v7(Timestamp::now(NoContext))
}

/// Client for the whole submission flow: upload the file to the bucket, then
/// record the submission against the file input function.
#[derive(Clone)]
pub struct FileSubmitClient {
    bucket: String,
    api_url: String,
    s3: s3::Client,
    client: reqwest::Client,
}

impl FileSubmitClient {
    pub fn new(s3: s3::Client, bucket: String, api_url: String) -> Result<Self> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            bucket,
            api_url,
            s3,
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_are_unique_v7_uuids() {
        let first = new_record_id();
        let second = new_record_id();

        assert_ne!(first, second);
        assert_eq!(first.get_version_num(), 7);
    }
}
