use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::google::GoogleConfig;
use super::logging::LoggingConfig;
use super::sms::SmsConfig;
use super::store::StoreConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0, containing store, google, sms, etc.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    pub store: StoreConfig,
    pub google: GoogleConfig,
    pub sms: SmsConfig,
    pub bind_address: String,
    /// Where the login callback redirects after issuing cookies.
    #[serde(default = "default_profile_redirect")]
    pub profile_redirect: String,
    pub logging: LoggingConfig,
}

fn default_profile_redirect() -> String {
    "/profile".to_string()
}

/// Load config from a YAML file named "config.yaml" in the current
/// directory, with environment overrides under the STOREFRONT_ prefix
/// (e.g. STOREFRONT_GOOGLE__CLIENT_SECRET).
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::prefixed("STOREFRONT_").split("__"));
    let config = match figment.extract::<Config>() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };
    match config {
        Config::ConfigV1(c) => c,
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
