/// Manual time entry in HH:MM:SS form
use std::time::Duration;

use crate::error::EntryError;

const DIGITS: usize = 6;

/// Keeps the last six digits typed, zero padded and split by colons.
///
/// Typing pushes digits in from the right, so `"00:00:01"` followed by `2`
/// becomes `"00:00:12"`.
pub fn format_time_input(text: &str) -> String {
    let digits: Vec<char> = text.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(DIGITS);
    let kept: String = digits[start..].iter().collect();
    let padded = format!("{:0>6}", kept);

    format!("{}:{}:{}", &padded[0..2], &padded[2..4], &padded[4..6])
}

/// Zero padded `HH:MM:SS` shown when the timer enters edit mode.
pub fn edit_text(remaining: Duration) -> String {
    let total_seconds = remaining.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn parse_manual_input(text: &str) -> Result<Duration, EntryError> {
    let text: String = text.chars().filter(|&c| c != ':').collect();

    let length = text.chars().count();
    if length != DIGITS {
        return Err(EntryError::WrongLength(length));
    }
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(EntryError::NotNumeric);
    }

    let field = |range: std::ops::Range<usize>| -> u64 {
        text[range].parse().unwrap_or_default()
    };
    let (mut hours, mut minutes, mut seconds) = (field(0..2), field(2..4), field(4..6));

    if hours == 0 && minutes == 0 && seconds == 0 {
        return Err(EntryError::Zero);
    }

    // 99:99:99 is the "max" shortcut
    if hours == 99 && minutes == 99 && seconds == 99 {
        (hours, minutes, seconds) = (99, 59, 59);
    }

    Ok(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn progressive_typing_shifts_digits_in() {
        let typed = "1234567";
        let expected = [
            "00:00:01", "00:00:12", "00:01:23", "00:12:34", "01:23:45", "12:34:56", "23:45:67",
        ];
        let mut field = String::new();
        for (ch, want) in typed.chars().zip(expected) {
            field.push(ch);
            field = format_time_input(&field);
            assert_eq!(field, want);
            assert!(field.len() <= 8);
        }
    }

    #[test]
    fn filter_drops_non_digits() {
        assert_eq!(format_time_input("1a:2b:3c"), "00:01:23");
        assert_eq!(format_time_input(""), "00:00:00");
    }

    #[test]
    fn backspace_on_formatted_text_shifts_right() {
        // "00:12:3" after deleting the trailing digit of "00:12:34"
        assert_eq!(format_time_input("00:12:3"), "00:01:23");
    }

    #[test_case("010203", 3723 ; "plain digits")]
    #[test_case("01:02:03", 3723 ; "with colons")]
    #[test_case("999999", 99 * 3600 + 59 * 60 + 59 ; "max sentinel")]
    #[test_case("00:90:00", 5400 ; "minutes over 59 kept")]
    #[test_case("000001", 1 ; "one second")]
    fn parses_valid_entries(text: &str, seconds: u64) {
        assert_eq!(parse_manual_input(text), Ok(Duration::from_secs(seconds)));
    }

    #[test_case("000000", EntryError::Zero ; "zero")]
    #[test_case("00:00:00", EntryError::Zero ; "zero with colons")]
    #[test_case("12345", EntryError::WrongLength(5) ; "too short")]
    #[test_case("1234567", EntryError::WrongLength(7) ; "too long")]
    #[test_case("12a456", EntryError::NotNumeric ; "letter")]
    #[test_case("12 456", EntryError::NotNumeric ; "space")]
    fn rejects_invalid_entries(text: &str, err: EntryError) {
        assert_eq!(parse_manual_input(text), Err(err));
    }

    #[test]
    fn non_ascii_input_is_rejected_without_panicking() {
        assert_eq!(parse_manual_input("12345é"), Err(EntryError::NotNumeric));
        assert_eq!(parse_manual_input("١٢٣٤٥٦"), Err(EntryError::NotNumeric));
    }

    #[test]
    fn edit_text_is_zero_padded() {
        assert_eq!(edit_text(Duration::from_secs(1500)), "00:25:00");
        assert_eq!(edit_text(Duration::from_secs(3723)), "01:02:03");
    }
}
