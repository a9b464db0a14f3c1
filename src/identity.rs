// Legacy swimmer identifiers. Before the opaque 14-character id format was
// introduced, ids were derived from the birthdate and name fragments:
//
//   MMDDYY + first name (3, '*' padded) + middle initial ('*' if none)
//          + last name (4, '*' padded)
//
// The 12-character short form seen in result lines truncates the last-name
// fragment to 2. Because clubs re-enter names inconsistently, two encodings
// of the same swimmer can differ in a position or two; candidates are
// compared by Hamming distance.

use chrono::{Datelike, NaiveDate};

/// Width of the short-form identifier carried on every result line.
pub const SHORT_ID_LEN: usize = 12;

/// Width of the long-form identifier and of the full legacy encoding.
pub const LONG_ID_LEN: usize = 14;

/// Positional mismatch count over the shorter of the two strings.
pub fn hamming_distance(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).filter(|(x, y)| x != y).count()
}

fn name_fragment(name: &str, width: usize) -> String {
    let mut fragment: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .take(width)
        .collect();
    while fragment.len() < width {
        fragment.push('*');
    }
    fragment
}

fn date_prefix(birthday: NaiveDate) -> String {
    format!(
        "{:02}{:02}{:02}",
        birthday.month(),
        birthday.day(),
        birthday.year() % 100
    )
}

/// Full 14-character legacy encoding.
pub fn encode_legacy_id(
    first_name: &str,
    middle_initial: Option<char>,
    last_name: &str,
    birthday: NaiveDate,
) -> String {
    let middle = middle_initial
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('*');
    format!(
        "{}{}{}{}",
        date_prefix(birthday),
        name_fragment(first_name, 3),
        middle,
        name_fragment(last_name, 4)
    )
}

/// 12-character short form, as carried on result lines.
pub fn encode_legacy_id_short(
    first_name: &str,
    middle_initial: Option<char>,
    last_name: &str,
    birthday: NaiveDate,
) -> String {
    let mut id = encode_legacy_id(first_name, middle_initial, last_name, birthday);
    id.truncate(SHORT_ID_LEN);
    id
}

/// Whether `id` looks like a legacy (birthdate-derived) identifier for the
/// given names. Padding stars are a giveaway on their own; otherwise the
/// 6-digit prefix must be a plausible month/day and the name fragments must
/// agree with the record's names.
pub fn is_legacy_id(
    first_name: &str,
    last_name: &str,
    middle_initial: Option<char>,
    id: &str,
) -> bool {
    if id.len() != SHORT_ID_LEN && id.len() != LONG_ID_LEN {
        return false;
    }
    if id.contains('*') {
        return true;
    }

    let (date_part, name_part) = id.split_at(6);
    if !date_part.chars().all(|c| c.is_ascii_digit())
        || !name_part.chars().all(|c| c.is_ascii_alphabetic())
    {
        return false;
    }
    let month: u32 = date_part[0..2].parse().unwrap_or(0);
    let day: u32 = date_part[2..4].parse().unwrap_or(0);
    if !(1..=12).contains(&month) || !(1..=32).contains(&day) {
        return false;
    }

    // Name fragments must agree, treating padding positions as wildcards.
    let last_width = name_part.len() - 4;
    let middle = middle_initial
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('*');
    let expected = format!(
        "{}{}{}",
        name_fragment(first_name, 3),
        middle,
        name_fragment(last_name, last_width)
    );
    expected
        .chars()
        .zip(name_part.chars())
        .all(|(want, got)| want == '*' || want == got)
}

/// Recover the birthday encoded in a legacy id's MMDDYY prefix. Two-digit
/// years later than the current year are read as 19xx.
pub fn decode_legacy_birthday(id: &str, current_year: i32) -> Option<NaiveDate> {
    if id.len() < 6 {
        return None;
    }
    let month: u32 = id[0..2].parse().ok()?;
    let day: u32 = id[2..4].parse().ok()?;
    let two_digit: i32 = id[4..6].parse().ok()?;
    let year = if two_digit > current_year % 100 {
        1900 + two_digit
    } else {
        2000 + two_digit
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

// ============================================================================
// TESTS
// ============================================================================
