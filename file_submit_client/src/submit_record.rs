use anyhow::Result;
use models_file_record::FileRecord;

use super::{FILE_INPUT_ROUTE, FileSubmitClient};

impl FileSubmitClient {
    #[tracing::instrument(skip(self, record), err)]
    /// Record a submission against an already uploaded file.
    pub async fn submit_record(&self, record: &FileRecord) -> Result<String> {
        record.validate()?;

        let full_url = format!("{}{}", self.api_url, FILE_INPUT_ROUTE);

        let response = self.client.post(&full_url).json(record).send().await?;

        let status_code = response.status();

        if !status_code.is_success() {
            let body: String = response.text().await?;
            tracing::error!(
                body=%body,
                status=%status_code,
                "unexpected response from file input function"
            );
            return Err(anyhow::anyhow!("HTTP {}: {}", status_code, body));
        }

        let ack = response.text().await?;
        Ok(ack)
    }

    #[tracing::instrument(skip(self, input_text, content), err)]
    /// Upload then record in one call, the way the submission form drives it.
    pub async fn submit_file(
        &self,
        id: &str,
        input_text: &str,
        file_name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<String> {
        let input_file_path = self.upload_file(file_name, content_type, content).await?;

        self.submit_record(&FileRecord {
            id: id.to_string(),
            input_text: input_text.to_string(),
            input_file_path,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Points at nothing; validation must fail before anything is sent.
    fn client() -> FileSubmitClient {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .build();

        FileSubmitClient::new(
            aws_sdk_s3::Client::from_conf(config),
            "ywt-file-bucket".to_string(),
            "http://localhost:9".to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn rejects_empty_fields_before_any_request() {
        let record = FileRecord {
            id: String::new(),
            input_text: "hello".to_string(),
            input_file_path: "ywt-file-bucket/notes.txt".to_string(),
        };

        let err = client().submit_record(&record).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid input. Field id must be a non-empty string."
        );
    }

    #[tokio::test]
    async fn submit_file_rejects_unsupported_uploads_before_any_request() {
        let err = client()
            .submit_file("abc123", "hello", "notes.pdf", "application/pdf", vec![1])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "File type not supported. Please upload a text file."
        );
    }
}
