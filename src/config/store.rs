use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::mongodb_store::MongoDBConfig;

/// Selects the persistence backend. We differentiate backends via a
/// "type" tag in the YAML:
///
/// ```yaml
/// store:
///   type: mongo
///   uri: mongodb://localhost:27017
///   database: storefront
/// ```
///
/// The "memory" backend keeps everything in process memory and is meant
/// for development and tests.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreConfig {
    #[serde(rename = "mongo")]
    MongoDB(MongoDBConfig),
    #[serde(rename = "memory")]
    Memory,
}
