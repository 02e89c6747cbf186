//! This crate is not used in production code, this is a local development utility that is able
//! to poll a locally running instance of dynamodb and then forward insert events to an
//! append_worker_trigger that is also running locally under `cargo lambda watch`.
//!
//! Each INSERT is forwarded as its own single-record event, matching the batch size the
//! deployed event source mapping uses.
use anyhow::{Context, Result};
use aws_sdk_dynamodbstreams::types::{AttributeValue, OperationType, Record, ShardIteratorType};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

struct Config {
    lambda_endpoint: String,
    table_name: String,
    poll_interval: Duration,
}

impl Config {
    fn from_env() -> Result<Self> {
        let lambda_endpoint =
            std::env::var("LAMBDA_ENDPOINT").context("LAMBDA_ENDPOINT must be provided")?;
        let table_name = std::env::var("TABLE_NAME").context("TABLE_NAME must be provided")?;
        let poll_interval_seconds: u64 = std::env::var("POLL_INTERVAL_SECONDS")
            .context("POLL_INTERVAL_SECONDS must be provided")?
            .parse()
            .context("POLL_INTERVAL_SECONDS was not an integer")?;

        Ok(Config {
            lambda_endpoint,
            table_name,
            poll_interval: Duration::from_secs(poll_interval_seconds),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    println!("Starting local DynamoDB stream forwarder...");
    println!("Make sure:");
    println!("1. DynamoDB is running on port 8000");
    println!("2. 'cargo lambda watch' is running on port 9000");
    println!(
        "3. The '{}' table exists with streams enabled",
        config.table_name
    );
    println!();

    // Configure AWS SDK for local DynamoDB
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new("us-east-1"))
        .load()
        .await;

    let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);
    let streams_client = aws_sdk_dynamodbstreams::Client::new(&aws_config);

    // Get stream ARN
    let stream_arn = get_stream_arn(&dynamodb_client, &config.table_name).await?;
    println!("Monitoring stream: {}", stream_arn);

    // Get shards
    let stream_desc = streams_client
        .describe_stream()
        .stream_arn(&stream_arn)
        .send()
        .await?;

    let shards = stream_desc
        .stream_description()
        .map(|d| d.shards())
        .context("No shards found")?;

    if shards.is_empty() {
        anyhow::bail!("No shards found in stream");
    }

    // Initialize shard iterators
    let mut shard_iterators: HashMap<String, Option<String>> = HashMap::new();

    for shard in shards {
        let shard_id = shard.shard_id().context("No shard ID")?.to_string();

        let iterator_response = streams_client
            .get_shard_iterator()
            .stream_arn(&stream_arn)
            .shard_id(&shard_id)
            .shard_iterator_type(ShardIteratorType::Latest)
            .send()
            .await?;

        let iterator = iterator_response.shard_iterator().map(String::from);
        shard_iterators.insert(shard_id.clone(), iterator);
        println!("Monitoring shard: {}", shard_id);
    }

    println!("Waiting for DynamoDB stream events...");

    let http_client = reqwest::Client::new();

    // Main polling loop
    loop {
        for (shard_id, iterator_opt) in shard_iterators.iter_mut() {
            if let Some(iterator) = iterator_opt {
                match streams_client
                    .get_records()
                    .shard_iterator(iterator.clone())
                    .send()
                    .await
                {
                    Ok(response) => {
                        let records = response.records();
                        if !records.is_empty() {
                            println!(
                                "\n[{}] Found {} new records in shard {}",
                                Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                                records.len(),
                                shard_id
                            );

                            if let Err(e) = forward_insert_records(
                                records,
                                &http_client,
                                &config.lambda_endpoint,
                            )
                            .await
                            {
                                eprintln!("Error forwarding records: {}", e);
                            }
                        }

                        // Update iterator for next poll
                        *iterator_opt = response.next_shard_iterator().map(String::from);
                    }
                    Err(e) => {
                        eprintln!("Error polling shard {}: {}", shard_id, e);
                        // Try to get a new iterator
                        match streams_client
                            .get_shard_iterator()
                            .stream_arn(&stream_arn)
                            .shard_id(shard_id)
                            .shard_iterator_type(ShardIteratorType::Latest)
                            .send()
                            .await
                        {
                            Ok(resp) => {
                                *iterator_opt = resp.shard_iterator().map(String::from);
                            }
                            Err(_) => {
                                *iterator_opt = None;
                            }
                        }
                    }
                }
            }
        }

        sleep(config.poll_interval).await;
    }
}

async fn get_stream_arn(client: &aws_sdk_dynamodb::Client, table_name: &str) -> Result<String> {
    let response = client
        .describe_table()
        .table_name(table_name)
        .send()
        .await?;

    response
        .table()
        .and_then(|t| t.latest_stream_arn())
        .map(String::from)
        .with_context(|| format!("Table {} does not have streams enabled", table_name))
}

async fn forward_insert_records(
    records: &[Record],
    http_client: &reqwest::Client,
    lambda_endpoint: &str,
) -> Result<()> {
    for record in records {
        if !matches!(record.event_name(), Some(OperationType::Insert)) {
            println!(
                "Skipping {} record",
                record.event_name().map(|e| e.as_str()).unwrap_or("unnamed")
            );
            continue;
        }

        let lambda_event = json!({ "Records": [build_lambda_record(record)] });

        println!("Invoking Lambda with 1 record");

        match http_client
            .post(lambda_endpoint)
            .json(&lambda_event)
            .send()
            .await
        {
            Ok(response) => {
                if response.status().is_success() {
                    let text = response.text().await?;
                    println!("Lambda invocation successful: {}", text);
                } else {
                    eprintln!(
                        "Lambda invocation failed: {} - {}",
                        response.status(),
                        response.text().await?
                    );
                }
            }
            Err(e) => {
                if e.is_connect() {
                    eprintln!(
                        "Could not connect to Lambda. Make sure 'cargo lambda watch' is running on port 9000"
                    );
                } else {
                    eprintln!("Error invoking Lambda: {}", e);
                }
            }
        }
    }

    Ok(())
}

/// Converts a polled stream record into the event JSON shape the deployed
/// trigger receives from its event source mapping.
fn build_lambda_record(record: &Record) -> serde_json::Value {
    let change = record.dynamodb();
    let approximate_creation_date_time = change
        .and_then(|d| d.approximate_creation_date_time())
        .map(|t| t.as_secs_f64())
        .unwrap_or_else(|| Utc::now().timestamp() as f64);

    json!({
        "eventID": record.event_id().unwrap_or(""),
        "eventName": record.event_name().map(|e| e.as_str()).unwrap_or(""),
        "eventVersion": "1.1",
        "eventSource": "aws:dynamodb",
        "awsRegion": "us-east-1",
        "dynamodb": {
            "ApproximateCreationDateTime": approximate_creation_date_time,
            "Keys": convert_stream_attributes(change.and_then(|d| d.keys())),
            "NewImage": convert_stream_attributes(change.and_then(|d| d.new_image())),
            "OldImage": convert_stream_attributes(change.and_then(|d| d.old_image())),
            "SequenceNumber": change.and_then(|d| d.sequence_number()).unwrap_or(""),
            "SizeBytes": change.and_then(|d| d.size_bytes()).unwrap_or(0),
            "StreamViewType": change
                .and_then(|d| d.stream_view_type())
                .map(|t| t.as_str()),
        },
        "eventSourceARN": record.event_source().unwrap_or(""),
    })
}

fn convert_stream_attributes(
    attrs: Option<&HashMap<String, AttributeValue>>,
) -> serde_json::Value {
    match attrs {
        Some(map) => {
            let mut json_map = serde_json::Map::new();
            for (key, value) in map {
                json_map.insert(key.clone(), attribute_value_to_json(value));
            }
            serde_json::Value::Object(json_map)
        }
        None => serde_json::Value::Null,
    }
}

fn attribute_value_to_json(attr: &AttributeValue) -> serde_json::Value {
    match attr {
        AttributeValue::S(s) => json!({ "S": s }),
        AttributeValue::N(n) => json!({ "N": n }),
        AttributeValue::B(b) => json!({ "B": STANDARD.encode(b.as_ref()) }),
        AttributeValue::Ss(ss) => json!({ "SS": ss }),
        AttributeValue::Ns(ns) => json!({ "NS": ns }),
        AttributeValue::Bs(bs) => {
            json!({ "BS": bs.iter().map(|b| STANDARD.encode(b.as_ref())).collect::<Vec<_>>() })
        }
        AttributeValue::M(m) => {
            let mut map = serde_json::Map::new();
            for (k, v) in m {
                map.insert(k.clone(), attribute_value_to_json(v));
            }
            json!({ "M": serde_json::Value::Object(map) })
        }
        AttributeValue::L(l) => {
            let list: Vec<_> = l.iter().map(attribute_value_to_json).collect();
            json!({ "L": list })
        }
        AttributeValue::Null(_) => json!({ "NULL": true }),
        AttributeValue::Bool(b) => json!({ "BOOL": b }),
        _ => serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodbstreams::primitives::{Blob, DateTime};
    use aws_sdk_dynamodbstreams::types::{StreamRecord, StreamViewType};

    #[test]
    fn string_attributes_become_stream_json() {
        let value = attribute_value_to_json(&AttributeValue::S("abc123".to_string()));
        assert_eq!(value, json!({ "S": "abc123" }));
    }

    #[test]
    fn binary_attributes_are_base64_encoded() {
        let value = attribute_value_to_json(&AttributeValue::B(Blob::new(vec![1u8, 2, 3])));
        assert_eq!(value, json!({ "B": "AQID" }));
    }

    #[test]
    fn nested_maps_convert_recursively() {
        let mut inner = HashMap::new();
        inner.insert("id".to_string(), AttributeValue::S("abc123".to_string()));

        let value = attribute_value_to_json(&AttributeValue::M(inner));
        assert_eq!(value, json!({ "M": { "id": { "S": "abc123" } } }));
    }

    #[test]
    fn forwarded_records_deserialize_as_trigger_events() {
        let record = Record::builder()
            .event_id("1")
            .event_name(OperationType::Insert)
            .event_version("1.1")
            .event_source("aws:dynamodb")
            .aws_region("us-east-1")
            .dynamodb(
                StreamRecord::builder()
                    .approximate_creation_date_time(DateTime::from_secs(1_700_000_000))
                    .keys("id", AttributeValue::S("abc123".to_string()))
                    .new_image("id", AttributeValue::S("abc123".to_string()))
                    .new_image("input_text", AttributeValue::S("hello".to_string()))
                    .sequence_number("111")
                    .size_bytes(26)
                    .stream_view_type(StreamViewType::NewAndOldImages)
                    .build(),
            )
            .build();

        let lambda_event = json!({ "Records": [build_lambda_record(&record)] });

        let parsed: aws_lambda_events::event::dynamodb::Event =
            serde_json::from_value(lambda_event).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].event_name, "INSERT");

        let image: serde_json::Value =
            serde_json::to_value(parsed.records[0].change.new_image.clone()).unwrap();
        assert_eq!(image["id"], json!({ "S": "abc123" }));
    }
}
