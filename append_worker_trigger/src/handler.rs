use std::sync::Arc;

use aws_lambda_events::event::dynamodb::Event;
use lambda_runtime::{Error, LambdaEvent, tracing};
use models_file_record::FileRecordKey;
use ywt_pipeline_errors::PipelineError;

use crate::{config::Config, model::TriggerResponse, service, user_data};

/// Body reported when the launch request went through.
pub static CREATED_BODY: &str = "created ec2";
/// Body reported when the new image carries no usable id.
pub static NO_ITEM_ID_BODY: &str = "No item id";

/// Handles one change-stream event.
/// The event source mapping is configured to deliver exactly one INSERT
/// record per invocation; anything else is a misdelivery and fails closed
/// without launching. Launch outcomes are encoded in the response payload,
/// never raised, so the stream sees a completed invocation either way.
#[tracing::instrument(skip(ec2_client, config, event))]
pub async fn handler(
    ec2_client: Arc<service::ec2::Ec2>,
    config: Arc<Config>,
    event: LambdaEvent<Event>,
) -> Result<TriggerResponse, Error> {
    if event.payload.records.len() != 1 {
        tracing::error!(
            "Expected 1 record, got {}. The event source mapping has been misconfigured.",
            event.payload.records.len()
        );
        return Ok(TriggerResponse::from_error(&PipelineError::invalid_input(
            "Expected exactly one stream record",
        )));
    }

    let record = event.payload.records.first().unwrap();

    tracing::trace!(record=?record, "processing record");

    if record.event_name != "INSERT" {
        tracing::error!(event_name=%record.event_name, "expected INSERT records only");
        return Ok(TriggerResponse::from_error(&PipelineError::invalid_input(
            format!("Unexpected stream event: {}", record.event_name),
        )));
    }

    let key = match FileRecordKey::from_image(record.change.new_image.clone()) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!(error=%e, "new image carries no usable id");
            return Ok(TriggerResponse::from_error(&PipelineError::invalid_input(
                NO_ITEM_ID_BODY,
            )));
        }
    };

    let script = user_data::build_boot_script(&config.script_path, &config.table_name, &key.id);
    let encoded = user_data::encode_user_data(&script);

    match ec2_client
        .run_append_worker(&config.launch_template_id, &encoded)
        .await
    {
        Ok(instance_id) => {
            tracing::info!(id=%key.id, instance_id=?instance_id, "launched append worker");
            Ok(TriggerResponse::ok(CREATED_BODY))
        }
        Err(e) => {
            tracing::error!(error=?e, id=%key.id, "unable to launch append worker");
            Ok(TriggerResponse::from_error(&PipelineError::launch_failure(
                &e,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::service::ec2::Ec2;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use lambda_runtime::Context;
    use serde_json::json;

    fn test_config() -> Arc<Config> {
        Arc::new(Config::new(
            "fileTable",
            "s3://ywt-file-bucket/script.sh",
            "lt-0abcd1234efgh5678",
            Environment::Local,
        ))
    }

    fn record_json(event_name: &str, new_image: serde_json::Value) -> serde_json::Value {
        json!({
            "awsRegion": "us-east-1",
            "dynamodb": {
                "ApproximateCreationDateTime": 1700000000.0,
                "Keys": { "id": { "S": "abc123" } },
                "NewImage": new_image,
                "SequenceNumber": "111",
                "SizeBytes": 26,
                "StreamViewType": "NEW_AND_OLD_IMAGES"
            },
            "eventID": "1",
            "eventName": event_name,
            "eventSource": "aws:dynamodb",
            "eventSourceARN":
                "arn:aws:dynamodb:us-east-1:123456789012:table/fileTable/stream/2024-01-01T00:00:00.000",
            "eventVersion": "1.1"
        })
    }

    fn stream_event(records: Vec<serde_json::Value>) -> LambdaEvent<Event> {
        let payload: Event = serde_json::from_value(json!({ "Records": records })).unwrap();
        LambdaEvent::new(payload, Context::default())
    }

    fn insert_event(new_image: serde_json::Value) -> LambdaEvent<Event> {
        stream_event(vec![record_json("INSERT", new_image)])
    }

    fn full_image() -> serde_json::Value {
        json!({
            "id": { "S": "abc123" },
            "input_text": { "S": "hello" },
            "input_file_path": { "S": "ywt-file-bucket/notes.txt" }
        })
    }

    #[tokio::test]
    async fn launches_worker_for_insert() {
        let mut ec2_client = Ec2::default();
        ec2_client
            .expect_run_append_worker()
            .times(1)
            .withf(|launch_template_id, user_data| {
                let script =
                    String::from_utf8(STANDARD.decode(user_data).unwrap()).unwrap();
                launch_template_id == "lt-0abcd1234efgh5678"
                    && script.contains("aws s3 cp s3://ywt-file-bucket/script.sh script.sh")
                    && script.contains("./script.sh fileTable abc123")
            })
            .returning(|_, _| Ok(Some("i-0123456789abcdef0".to_string())));

        let response = handler(Arc::new(ec2_client), test_config(), insert_event(full_image()))
            .await
            .unwrap();

        assert_eq!(response, TriggerResponse::ok("created ec2"));
    }

    #[tokio::test]
    async fn missing_id_short_circuits_without_launching() {
        let mut ec2_client = Ec2::default();
        ec2_client.expect_run_append_worker().never();

        let event = insert_event(json!({
            "input_text": { "S": "hello" },
            "input_file_path": { "S": "ywt-file-bucket/notes.txt" }
        }));

        let response = handler(Arc::new(ec2_client), test_config(), event)
            .await
            .unwrap();

        assert_eq!(
            response,
            TriggerResponse {
                status_code: 400,
                body: "No item id".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn empty_id_short_circuits_without_launching() {
        let mut ec2_client = Ec2::default();
        ec2_client.expect_run_append_worker().never();

        let event = insert_event(json!({
            "id": { "S": "" },
            "input_text": { "S": "hello" },
            "input_file_path": { "S": "ywt-file-bucket/notes.txt" }
        }));

        let response = handler(Arc::new(ec2_client), test_config(), event)
            .await
            .unwrap();

        assert_eq!(
            response,
            TriggerResponse {
                status_code: 400,
                body: "No item id".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_insert_records_are_rejected() {
        let mut ec2_client = Ec2::default();
        ec2_client.expect_run_append_worker().never();

        let event = stream_event(vec![record_json("MODIFY", full_image())]);

        let response = handler(Arc::new(ec2_client), test_config(), event)
            .await
            .unwrap();

        assert_eq!(
            response,
            TriggerResponse {
                status_code: 400,
                body: "Unexpected stream event: MODIFY".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn malformed_batches_are_rejected() {
        let mut ec2_client = Ec2::default();
        ec2_client.expect_run_append_worker().never();

        let empty = stream_event(vec![]);
        let response = handler(Arc::new(ec2_client), test_config(), empty)
            .await
            .unwrap();
        assert_eq!(response.status_code, 400);

        let mut ec2_client = Ec2::default();
        ec2_client.expect_run_append_worker().never();

        let two_records = stream_event(vec![
            record_json("INSERT", full_image()),
            record_json("INSERT", full_image()),
        ]);
        let response = handler(Arc::new(ec2_client), test_config(), two_records)
            .await
            .unwrap();
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn launch_rejection_surfaces_as_server_error() {
        let mut ec2_client = Ec2::default();
        ec2_client
            .expect_run_append_worker()
            .times(1)
            .returning(|_, _| {
                Err(anyhow::anyhow!(
                    "You have requested more vCPU capacity than your current vCPU limit"
                ))
            });

        let response = handler(Arc::new(ec2_client), test_config(), insert_event(full_image()))
            .await
            .unwrap();

        assert_eq!(
            response,
            TriggerResponse {
                status_code: 500,
                body: "You have requested more vCPU capacity than your current vCPU limit"
                    .to_string(),
            }
        );
    }

    #[tokio::test]
    async fn replayed_events_launch_again() {
        let mut ec2_client = Ec2::default();
        ec2_client
            .expect_run_append_worker()
            .times(2)
            .returning(|_, _| Ok(Some("i-0123456789abcdef0".to_string())));
        let ec2_client = Arc::new(ec2_client);

        let first = handler(ec2_client.clone(), test_config(), insert_event(full_image()))
            .await
            .unwrap();
        let second = handler(ec2_client, test_config(), insert_event(full_image()))
            .await
            .unwrap();

        assert_eq!(first, TriggerResponse::ok("created ec2"));
        assert_eq!(second, TriggerResponse::ok("created ec2"));
    }
}
