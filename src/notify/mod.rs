pub mod sms;

pub use sms::SmsNotifier;
