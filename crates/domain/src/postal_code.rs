use consorciatech_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Message returned when a postal code cannot be parsed.
pub const INVALID_POSTAL_CODE_MESSAGE: &str = "CEP inválido.";

/// Brazilian postal code (CEP), stored as exactly eight ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostalCode(String);

impl PostalCode {
    /// Parses a postal code, accepting the `01310-930` display form.
    pub fn parse(value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        let digits = match trimmed.split_once('-') {
            Some((prefix, suffix)) if prefix.len() == 5 && suffix.len() == 3 => {
                format!("{prefix}{suffix}")
            }
            Some(_) => return Err(invalid()),
            None => trimmed.to_owned(),
        };

        if digits.len() != 8 || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        Ok(Self(digits))
    }

    /// Returns the eight digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn invalid() -> AppError {
    AppError::Validation(INVALID_POSTAL_CODE_MESSAGE.to_owned())
}
