use anyhow::Result;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::LaunchTemplateSpecification;
use lambda_runtime::tracing;

/// Launches a single instance, always resolving the template's `$Latest`
/// version. `user_data` must already be base64 encoded.
#[tracing::instrument(skip(ec2_client, user_data))]
pub(in crate::service::ec2) async fn run_instances(
    ec2_client: &aws_sdk_ec2::Client,
    launch_template_id: &str,
    user_data: &str,
) -> Result<Option<String>> {
    let launch_template: LaunchTemplateSpecification = LaunchTemplateSpecification::builder()
        .launch_template_id(launch_template_id)
        .version("$Latest")
        .build();

    let output = match ec2_client
        .run_instances()
        .launch_template(launch_template)
        .user_data(user_data)
        .min_count(1)
        .max_count(1)
        .send()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error=?e, "unable to run instances");
            // SdkError's Display hides the provider message
            let message = e.message().map(String::from).unwrap_or_else(|| e.to_string());
            return Err(anyhow::anyhow!(message));
        }
    };

    let instance_id = output
        .instances()
        .first()
        .and_then(|instance| instance.instance_id())
        .map(String::from);

    Ok(instance_id)
}
