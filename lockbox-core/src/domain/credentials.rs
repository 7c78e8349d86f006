//! Login and signup input

use super::result::{Error, Result};
use super::user::User;

/// Minimum password length, counted in UTF-16 code units
pub const MIN_PASSWORD_LEN: usize = 6;

/// Email/password pair presented at login
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Exact, case-sensitive match on both fields
    pub fn matches(&self, user: &User) -> bool {
        user.email == self.email && user.password == self.password
    }
}

/// Fields submitted at signup
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the form in order; the first failing rule wins.
    ///
    /// Email uniqueness needs the stored collection and is checked by the
    /// user store afterwards.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(Error::validation("All fields are required"));
        }
        if !self.email.contains('@') {
            return Err(Error::validation("Invalid email format"));
        }
        if self.password.encode_utf16().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation("Password too short"));
        }
        Ok(())
    }

    /// Build the user record this form describes
    pub fn into_user(self, id: String) -> User {
        User::new(id, self.name, self.email, self.password)
    }
}
