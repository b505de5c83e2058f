//! Seam for the out-of-process signing service. The app core never touches
//! key material; it hands unsigned transaction hex to whatever implementation
//! the platform shell injects and gets signed hex (or a JWT) back.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The user declined the signing request.
    #[error("signing request rejected")]
    Rejected,
    /// No signer is available (identity service unreachable, logged out, ...).
    #[error("signer unavailable")]
    Unavailable,
    /// The signer answered with something unusable.
    #[error("invalid signer response: {0}")]
    InvalidResponse(String),
    #[error("signer error: {0}")]
    Other(String),
}

/// Asynchronous signing collaborator.
///
/// Implementations must be cheap to clone behind an `Arc` and safe to call
/// from any task; the core invokes them from spawned network tasks.
#[async_trait]
pub trait TransactionSigner: Send + Sync + 'static {
    /// Produce signed transaction hex from unsigned transaction hex.
    async fn sign_transaction(&self, unsigned_transaction_hex: &str)
        -> Result<String, SignerError>;

    /// Produce a short-lived JWT asserting the logged-in identity.
    async fn sign_jwt(&self) -> Result<String, SignerError>;
}

/// Alert text for signer failures that are worth explaining to the user;
/// `None` means the generic failure message applies.
pub fn user_visible_signer_error(err: &SignerError) -> Option<&'static str> {
    match err {
        SignerError::Rejected => Some("Signing request rejected"),
        SignerError::Unavailable => Some("Signing service unavailable"),
        SignerError::InvalidResponse(_) => Some("Signing service returned an invalid response"),
        SignerError::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_and_unavailable_map_to_user_text() {
        assert_eq!(
            user_visible_signer_error(&SignerError::Rejected),
            Some("Signing request rejected")
        );
        assert_eq!(
            user_visible_signer_error(&SignerError::Unavailable),
            Some("Signing service unavailable")
        );
        assert_eq!(
            user_visible_signer_error(&SignerError::Other("boom".into())),
            None
        );
    }
}
