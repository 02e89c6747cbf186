use anyhow::Context;
pub use ywt_env::Environment;

/// The configuration parameters for the application.
///
/// These are pulled from environment variables when the function boots.
///
/// See `.env.sample` in the repository root for details.
#[derive(Debug)]
pub struct Config {
    /// The metadata table passed to the worker script
    pub table_name: String,

    /// Object storage path of the worker script the instance downloads on boot
    pub script_path: String,

    /// The launch template the append worker is started from
    pub launch_template_id: String,

    /// The environment we are in
    pub environment: Environment,
}

impl Config {
    pub fn new(
        table_name: &str,
        script_path: &str,
        launch_template_id: &str,
        environment: Environment,
    ) -> Self {
        Config {
            table_name: table_name.to_string(),
            script_path: script_path.to_string(),
            launch_template_id: launch_template_id.to_string(),
            environment,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let table_name = std::env::var("TABLE_NAME").context("TABLE_NAME must be provided")?;
        let script_path = std::env::var("SCRIPT_PATH").context("SCRIPT_PATH must be provided")?;
        let launch_template_id =
            std::env::var("LAUNCH_TEMPLATE_ID").context("LAUNCH_TEMPLATE_ID must be provided")?;
        let environment = Environment::new_or_prod();

        Ok(Config::new(
            table_name.as_str(),
            script_path.as_str(),
            launch_template_id.as_str(),
            environment,
        ))
    }
}
