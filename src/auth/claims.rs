use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sid: Uuid,   // session row ID
    pub uid: i64,    // user ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // absolute expiry (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}
