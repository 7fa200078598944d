use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Role;

/// JWT payload. Stateless: everything a handler needs to authorize a request
/// travels in the token, and expiry is the only invalidation mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // user ID
    pub email: String,
    pub role: Role,
    pub iat: usize,   // issued at
    pub exp: usize,   // expiration time
}
