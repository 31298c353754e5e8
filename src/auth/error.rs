use std::fmt;

use thiserror::Error;

/// Which outbound call against the identity provider failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    CodeExchange,
    ProfileFetch,
    TokenRefresh,
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderOperation::CodeExchange => "code exchange",
            ProviderOperation::ProfileFetch => "profile fetch",
            ProviderOperation::TokenRefresh => "token refresh",
        };
        f.write_str(name)
    }
}

/// Errors raised by the authentication and token-lifecycle flow.
///
/// Every variant is terminal for the request it occurs in; nothing is
/// retried and store writes only happen after all provider calls have
/// succeeded.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials were supplied. Callers that tolerate anonymous
    /// requests treat this as "no user" rather than a failure.
    #[error("no credentials supplied")]
    MissingCredential,

    /// A credential was supplied but does not match any stored token.
    #[error("invalid access token")]
    InvalidCredential,

    /// The OAuth callback was invoked without an authorization code.
    #[error("no code received")]
    MissingCode,

    /// The refresh endpoint was invoked without a refresh token cookie.
    #[error("no refresh token")]
    MissingRefreshToken,

    /// The provider accepted the refresh but no stored customer matches
    /// the presented refresh token.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// The provider rejected an exchange. Carries the provider's HTTP
    /// status and response body so handlers can propagate the details.
    #[error("{operation} failed with status {status}: {body}")]
    Provider {
        operation: ProviderOperation,
        status: u16,
        body: String,
    },

    /// The provider could not be reached or its response could not be
    /// read.
    #[error("{operation} request failed: {message}")]
    Transport {
        operation: ProviderOperation,
        message: String,
    },

    /// A storage-layer failure.
    #[error("store error: {0}")]
    Store(String),
}
