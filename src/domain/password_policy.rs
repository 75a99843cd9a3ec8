use secrecy::{ExposeSecret, Secret};
use unicode_segmentation::UnicodeSegmentation;

use super::new_merchant::DomainError;

/// 비밀번호 최소 강도 정책.
/// 길이는 grapheme 단위로 센다.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 7,
            max_length: 128,
        }
    }
}

impl PasswordPolicy {
    pub fn check(&self, password: &Secret<String>) -> Result<(), DomainError> {
        let password = password.expose_secret();
        let length = password.graphemes(true).count();

        if length < self.min_length {
            return Err(DomainError::WeakPassword(format!(
                "Password must be at least {} characters long.",
                self.min_length
            )));
        }
        if length > self.max_length {
            return Err(DomainError::WeakPassword(format!(
                "Password must be at most {} characters long.",
                self.max_length
            )));
        }
        if !password.chars().any(char::is_alphabetic) || !password.chars().any(|c| c.is_ascii_digit())
        {
            return Err(DomainError::WeakPassword(
                "Password must contain at least one letter and one digit.".into(),
            ));
        }

        Ok(())
    }
}
