use unicode_segmentation::UnicodeSegmentation;

use super::new_merchant::DomainError;

/// 연락처 전화번호. 숫자, 공백, `+`, `-`, 괄호만 허용한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPhone(String);

impl TryFrom<String> for ContactPhone {
    type Error = DomainError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        let digits = trimmed.chars().filter(char::is_ascii_digit).count();
        let allowed = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));

        if !allowed || !(6..=20).contains(&digits) {
            return Err(DomainError::InvalidContactPhone(format!(
                "{} is not a valid phone number.",
                s
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for ContactPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 주소, 소개글 같은 자유 형식 프로필 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileText(String);

impl ProfileText {
    const MAX_GRAPHEMES: usize = 1024;
}

impl TryFrom<String> for ProfileText {
    type Error = DomainError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        // 값을 지우는 용도로 빈 문자열을 받지 않는다.
        if trimmed.is_empty() {
            return Err(DomainError::InvalidProfileText(
                "Profile text must not be blank.".to_string(),
            ));
        }
        if trimmed.graphemes(true).count() > Self::MAX_GRAPHEMES {
            return Err(DomainError::InvalidProfileText(format!(
                "Profile text must be at most {} characters long.",
                Self::MAX_GRAPHEMES
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for ProfileText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
