use anyhow::{Result, anyhow};
use aws_sdk_s3::primitives::ByteStream;

use super::FileSubmitClient;

/// Only plain text uploads are accepted.
pub static ACCEPTED_CONTENT_TYPE: &str = "text/plain";
/// Upload size cap in bytes (1MB).
pub const MAX_FILE_SIZE_BYTES: usize = 1_048_576;

/// Checks a candidate upload before any network call is made.
pub fn validate_upload(content_type: &str, size_bytes: usize) -> Result<()> {
    if content_type != ACCEPTED_CONTENT_TYPE {
        return Err(anyhow!("File type not supported. Please upload a text file."));
    }

    if size_bytes > MAX_FILE_SIZE_BYTES {
        return Err(anyhow!("File size exceeds the limit of 1MB."));
    }

    Ok(())
}

/// The object path recorded as `input_file_path` once the upload succeeds.
pub fn object_path(bucket: &str, file_name: &str) -> String {
    format!("{}/{}", bucket, file_name)
}

impl FileSubmitClient {
    #[tracing::instrument(skip(self, content), err)]
    /// Upload a text file to the bucket, returning its object path.
    pub async fn upload_file(
        &self,
        file_name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<String> {
        validate_upload(content_type, content.len())?;

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(file_name)
            .content_type(content_type)
            .body(ByteStream::from(content))
            .send()
            .await?;

        Ok(object_path(&self.bucket, file_name))
    }
}
