use validator::ValidateEmail;

use super::new_merchant::DomainError;

/// 소문자로 정규화된 가맹점 이메일 주소.
/// 대소문자만 다른 주소는 같은 주소로 취급한다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MerchantEmail(String);

impl TryFrom<String> for MerchantEmail {
    type Error = DomainError;
    fn try_from(s: String) -> Result<MerchantEmail, Self::Error> {
        let normalized = s.trim().to_lowercase();
        if normalized.validate_email() {
            Ok(Self(normalized))
        } else {
            Err(DomainError::InvalidMerchantEmail(format!(
                "{} is not a valid merchant email.",
                s
            )))
        }
    }
}

impl TryFrom<&str> for MerchantEmail {
    type Error = DomainError;
    fn try_from(s: &str) -> Result<MerchantEmail, Self::Error> {
        Self::try_from(s.to_string())
    }
}

impl AsRef<str> for MerchantEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MerchantEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
