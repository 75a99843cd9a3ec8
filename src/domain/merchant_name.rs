use unicode_segmentation::UnicodeSegmentation;

use super::new_merchant::DomainError;

/// 가맹점 상호명
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantName(String);

impl TryFrom<String> for MerchantName {
    type Error = DomainError;
    /// 입력이 상호명에 대한 검증 조건을 모두 만족하면 `Ok(MerchantName)`을 반환한다.
    fn try_from(s: String) -> Result<Self, Self::Error> {
        let is_empty_or_whitespace = s.trim().is_empty();

        // grapheme은 사용자가 인지할 수 있는 문자 단위이다.
        let is_too_long = s.graphemes(true).count() > 256;

        let forbidden_characters = [
            '/', '(', ')', '"', '<', '>', '\\', '{', '}', '$', ';', '%', '|',
        ];
        let contains_forbidden_characters = s.contains(forbidden_characters);

        if is_empty_or_whitespace || is_too_long || contains_forbidden_characters {
            Err(DomainError::InvalidMerchantName(format!(
                "{} is not a valid merchant name.",
                s
            )))
        } else {
            Ok(Self(s.trim().to_string()))
        }
    }
}

impl AsRef<str> for MerchantName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
