//! Auth types shared between the bearer-token middleware and handlers.

use serde::{Deserialize, Serialize};

/// Roles recognized by the role-gated "generate calendar" command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SchoolServices,
    Registrar,
    Admin,
}

/// JWT claims carried by an authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: u64,
    pub iat: u64,
}
