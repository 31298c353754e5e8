// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod config;
pub mod google;
pub mod logging;
pub mod sms;
pub mod store;

pub use config::*;
pub use google::*;
pub use logging::*;
pub use sms::*;
pub use store::*;
