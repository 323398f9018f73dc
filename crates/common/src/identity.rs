use std::fmt;

/// Rejected identity values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("local identity must not be empty")]
    Empty,
}

/// The name the local user chats and pings as.
///
/// Supplied once before startup and fixed for the process lifetime. Cloning
/// is cheap enough for every component to hold its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalIdentity(String);

impl LocalIdentity {
    pub fn new(name: impl Into<String>) -> Result<Self, IdentityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentityError::Empty);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocalIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
