use std::sync::Arc;

use anyhow::Context;
use aws_config::{Region, meta::region::RegionProviderChain};
use file_input_handler::{config::Config, handler::handler, service};
use lambda_http::{Error, Request, run, service_fn, tracing};
use ywt_entrypoint::PipelineEntrypoint;

#[tokio::main]
async fn main() -> Result<(), Error> {
    PipelineEntrypoint::default().init();
    tracing::info!("initiating lambda");

    let config = Config::from_env().context("all necessary env vars should be available")?;

    tracing::trace!("initialized config");

    let region_provider = RegionProviderChain::default_provider().or_else(Region::new("us-east-1"));
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;
    let file_table = service::dynamodb::FileTable::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config.table_name.clone(),
    );

    tracing::trace!("initialized dynamodb client");

    // Shared references
    let shared_file_table = Arc::new(file_table);

    let func = service_fn(move |event: Request| {
        let file_table = shared_file_table.clone();

        async move { handler(file_table, event).await }
    });

    run(func).await
}
