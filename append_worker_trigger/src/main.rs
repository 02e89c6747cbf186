#![recursion_limit = "256"]

use std::sync::Arc;

use anyhow::Context;
use append_worker_trigger::{config::Config, handler::handler, service};
use aws_config::{Region, meta::region::RegionProviderChain};
use aws_lambda_events::event::dynamodb::Event;
use lambda_runtime::{Error, LambdaEvent, run, service_fn, tracing};
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
    let ec2_client = service::ec2::Ec2::new(aws_sdk_ec2::Client::new(&aws_config));

    tracing::trace!("initialized ec2 client");

    // Shared references
    let shared_ec2_client = Arc::new(ec2_client);
    let shared_config = Arc::new(config);

    let func = service_fn(move |event: LambdaEvent<Event>| {
        let ec2_client = shared_ec2_client.clone();
        let config = shared_config.clone();

        async move { handler(ec2_client, config, event).await }
    });

    run(func).await
}
