//! Input validators for form fields

use std::fmt;

pub const MIN_AGE: u8 = 12;
pub const MAX_AGE: u8 = 100;

const TEXT_PUNCTUATION: [char; 9] = ['.', ',', '!', '?', ';', ':', '(', ')', '-'];

/// Why a field value was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    Empty,
    ForbiddenCharacters,
    NotANumber,
    AgeOutOfRange,
    InvalidNickname,
}

impl ValidationError {
    /// Text shown to the user before the field is asked again
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::Empty => "❌ Поле не может быть пустым.\nПопробуйте ещё раз:",
            ValidationError::ForbiddenCharacters => {
                "❌ Текст содержит запрещённые символы или эмодзи.\n\
                 Разрешены только буквы, цифры, пробелы и знаки препинания.\n\
                 Попробуйте ещё раз:"
            }
            ValidationError::NotANumber => "❌ Возраст должен быть числом.\nПопробуйте ещё раз:",
            ValidationError::AgeOutOfRange => "❌ Возраст должен быть от 12 до 100.\nПопробуйте ещё раз:",
            ValidationError::InvalidNickname => {
                "❌ Ник может содержать только латинские буквы, цифры и _.\nПопробуйте ещё раз:"
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ValidationError::Empty => "empty input",
            ValidationError::ForbiddenCharacters => "forbidden characters",
            ValidationError::NotANumber => "not a number",
            ValidationError::AgeOutOfRange => "age out of range",
            ValidationError::InvalidNickname => "invalid nickname",
        };
        f.write_str(reason)
    }
}

fn is_cyrillic_letter(c: char) -> bool {
    ('\u{0410}'..='\u{044F}').contains(&c) || c == 'Ё' || c == 'ё'
}

fn is_text_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || is_cyrillic_letter(c)
        || c.is_whitespace()
        || c == '_'
        || TEXT_PUNCTUATION.contains(&c)
}

/// Free text: Latin and Cyrillic letters, digits, whitespace, `_` and basic punctuation
pub fn validate_text(input: &str) -> Result<&str, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !input.chars().all(is_text_char) {
        return Err(ValidationError::ForbiddenCharacters);
    }
    Ok(input)
}

/// Game nickname: ASCII letters, digits and `_`
pub fn validate_nickname(input: &str) -> Result<&str, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !input.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidNickname);
    }
    Ok(input)
}

/// Age: decimal digits only, within [`MIN_AGE`, `MAX_AGE`]
pub fn validate_age(input: &str) -> Result<u8, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotANumber);
    }
    // Any digit string too long for u32 is out of range anyway.
    let age = input.parse::<u32>().map_err(|_| ValidationError::AgeOutOfRange)?;
    if age < MIN_AGE as u32 || age > MAX_AGE as u32 {
        return Err(ValidationError::AgeOutOfRange);
    }
    Ok(age as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_text_accepts_mixed_scripts() {
        assert!(validate_text("Привет, меня зовут Ёжик_42 (Hedgehog)!").is_ok());
        assert!(validate_text("Хочу в сквад: играю каждый день; люблю команду.").is_ok());
    }

    #[test]
    fn test_text_rejects_emoji_and_symbols() {
        assert_eq!(validate_text("Привет 😀"), Err(ValidationError::ForbiddenCharacters));
        assert_eq!(validate_text("a+b"), Err(ValidationError::ForbiddenCharacters));
        assert_eq!(validate_text("<script>"), Err(ValidationError::ForbiddenCharacters));
        assert_eq!(validate_text(""), Err(ValidationError::Empty));
    }

    #[test]
    fn test_nickname() {
        assert!(validate_nickname("Star_Player99").is_ok());
        assert_eq!(validate_nickname("Звезда"), Err(ValidationError::InvalidNickname));
        assert_eq!(validate_nickname("star player"), Err(ValidationError::InvalidNickname));
    }

    #[test]
    fn test_age_bounds() {
        assert_eq!(validate_age("12"), Ok(12));
        assert_eq!(validate_age("100"), Ok(100));
        assert_eq!(validate_age("11"), Err(ValidationError::AgeOutOfRange));
        assert_eq!(validate_age("101"), Err(ValidationError::AgeOutOfRange));
        assert_eq!(validate_age("abc"), Err(ValidationError::NotANumber));
        assert_eq!(validate_age("-5"), Err(ValidationError::NotANumber));
        assert_eq!(validate_age("99999999999999999999"), Err(ValidationError::AgeOutOfRange));
    }

    proptest! {
        #[test]
        fn validators_are_deterministic(input in "\\PC{0,40}") {
            prop_assert_eq!(validate_text(&input), validate_text(&input));
            prop_assert_eq!(validate_nickname(&input), validate_nickname(&input));
            prop_assert_eq!(validate_age(&input), validate_age(&input));
        }

        #[test]
        fn ages_in_range_are_accepted(age in 12u8..=100) {
            prop_assert_eq!(validate_age(&age.to_string()), Ok(age));
        }
    }
}
