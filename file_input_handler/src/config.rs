use anyhow::Context;
pub use ywt_env::Environment;

/// The configuration parameters for the application.
///
/// These are pulled from environment variables when the function boots.
///
/// See `.env.sample` in the repository root for details.
#[derive(Debug)]
pub struct Config {
    /// The metadata table written on each submission
    pub table_name: String,

    /// The environment we are in
    pub environment: Environment,
}

impl Config {
    pub fn new(table_name: &str, environment: Environment) -> Self {
        Config {
            table_name: table_name.to_string(),
            environment,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let table_name = std::env::var("TABLE_NAME").context("TABLE_NAME must be provided")?;
        let environment = Environment::new_or_prod();

        Ok(Config::new(table_name.as_str(), environment))
    }
}
