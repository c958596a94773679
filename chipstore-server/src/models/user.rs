//! User roles and registration validation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{EmailAddress, ValidationError};

/// Minimum password length accepted at registration
const MIN_PASSWORD_LEN: usize = 8;

/// Maximum password length (bounds hashing input)
const MAX_PASSWORD_LEN: usize = 128;

/// Maximum length for display names
const MAX_USER_NAME_LEN: usize = 80;

/// Account role, stored as a lowercase string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(ValidationError::InvalidVariant {
                field: "role",
                value: other.to_owned(),
            }),
        }
    }
}

/// Validated registration input. The raw password is kept only long
/// enough to be hashed by the caller.
#[derive(Clone)]
pub struct Registration {
    pub name: String,
    pub email: EmailAddress,
    pub password: String,
}

// Manual impl so the raw password never reaches logs.
impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Registration {
    pub fn new(name: &str, email: &str, password: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if name.len() > MAX_USER_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_USER_NAME_LEN,
            });
        }

        if password.len() < MIN_PASSWORD_LEN {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: "must be at least 8 characters",
            });
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LEN,
            });
        }

        Ok(Self {
            name: name.to_owned(),
            email: EmailAddress::new(email)?,
            password: password.to_owned(),
        })
    }
}
