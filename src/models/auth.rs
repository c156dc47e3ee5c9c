//! Auxiliary API payloads around accounts and tokens. Issuing and verifying
//! tokens is left to the auth layer; these only fix the wire shapes.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: bearer(),
        }
    }
}

fn bearer() -> String {
    "bearer".to_string()
}

/// Claims carried inside an access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub sub: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePassword {
    #[validate(length(min = 8, max = 40))]
    pub current_password: String,
    #[validate(length(min = 8, max = 40))]
    pub new_password: String,
}

/// Password reset request, authorised by a reset token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPassword {
    pub token: String,
    #[validate(length(min = 8, max = 40))]
    pub new_password: String,
}
