pub mod google;

pub use google::{GoogleOAuthClient, TokenResponse, UserProfile};
