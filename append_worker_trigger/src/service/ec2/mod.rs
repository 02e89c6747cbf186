mod run_instances;

use anyhow::Result;
use aws_sdk_ec2 as ec2;
use lambda_runtime::tracing;
#[allow(unused_imports)]
use mockall::automock;

#[cfg(test)]
pub use MockEc2Client as Ec2;
#[cfg(not(test))]
pub use Ec2Client as Ec2;

#[derive(Clone, Debug)]
pub struct Ec2Client {
    /// Inner EC2 client
    inner: ec2::Client,
}

#[cfg_attr(test, automock)]
impl Ec2Client {
    pub fn new(inner: ec2::Client) -> Self {
        Self { inner }
    }

    /// Launches one append worker from the launch template. Returns the
    /// instance id when the provider reports one.
    #[tracing::instrument(skip(self, user_data))]
    pub async fn run_append_worker(
        &self,
        launch_template_id: &str,
        user_data: &str,
    ) -> Result<Option<String>> {
        run_instances::run_instances(&self.inner, launch_template_id, user_data).await
    }
}
