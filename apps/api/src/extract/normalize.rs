//! Text normalization for extracted resume text.
//!
//! Repairs extraction artifacts that would otherwise corrupt date and
//! experience reasoning downstream. Rules run in a fixed order: digit
//! rejoining must happen before date-separator canonicalization, which must
//! happen before two-digit-year expansion, or the later patterns never match.
//! Each rule is a pure function over a string so it can be tested (and
//! reordered) on its own.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// A 4-digit year split by a single space, e.g. "20 15" -> "2015".
static SPLIT_TWO_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\s+(\d{2,4})\b").expect("valid two-part digit regex"));

// Three digit groups, e.g. "20 1 5" -> "2015".
static SPLIT_THREE_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{2})\s+(\d{1,2})\s+(\d{1,2})\b").expect("valid three-part digit regex")
});

// A split year behind a month prefix, e.g. "06/201 9" -> "06/2019".
static SPLIT_AFTER_SLASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}/)(\d{1,3})\s+(\d{1,2})\b").expect("valid slash-split digit regex")
});

// Generic year reassembly: a digit run plus 1-2 trailing digits, joined only
// when the concatenation is a plausible 3-4 digit year.
static YEAR_REASSEMBLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2,4})\s+(\d{1,2})\b").expect("valid year reassembly regex"));

static SPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {2,}").expect("valid space run regex"));

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline run regex"));

// Month names broken by whitespace inserted mid-word, e.g. "Jan uary".
static MONTH_FIXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)Jan\s+uary", "January"),
        (r"(?i)Feb\s+ruary", "February"),
        (r"(?i)Mar\s+ch", "March"),
        (r"(?i)Apr\s+il", "April"),
        (r"(?i)Jun\s+e", "June"),
        (r"(?i)Jul\s+y", "July"),
        (r"(?i)Aug\s+ust", "August"),
        (r"(?i)Sep\s+tember", "September"),
        (r"(?i)Oct\s+ober", "October"),
        (r"(?i)Nov\s+ember", "November"),
        (r"(?i)Dec\s+ember", "December"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid month repair regex"),
            replacement,
        )
    })
    .collect()
});

// OCR letter/digit confusions inside digit runs, e.g. "2O15" -> "2015".
static OCR_OH_FOR_ZERO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)O(\d)").expect("valid O-for-0 regex"));
static OCR_ELL_FOR_ONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)l(\d)").expect("valid l-for-1 regex"));

// Any of / - . between day/month/year groups becomes /.
static DATE_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})").expect("valid date separator regex")
});

// Ongoing-employment phrasings, whole word, any case.
static PRESENT_VARIANTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:present|current|now|till date)\b").expect("valid present variant regex")
});

// MM/yy with a two-digit year, e.g. "08/12" or "12/98".
static TWO_DIGIT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{2})\b").expect("valid two-digit year regex"));

/// Normalizes extracted resume text into the canonical form used for
/// prompting. Output contains no runs of 3+ line breaks or 2+ spaces, has
/// date tokens repaired and separator-canonicalized, and collapses all
/// ongoing-employment phrasings to the literal `Present`.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = rejoin_split_digits(text);
    let text = collapse_whitespace(&text);
    let text = repair_broken_months(&text);
    let text = fix_ocr_digit_confusions(&text);
    let text = canonicalize_date_separators(&text);
    let text = canonicalize_present(&text);
    let text = expand_two_digit_years(&text);

    text.trim().to_string()
}

/// Rule 1: rejoin digit groups that extraction split with spurious spaces.
pub fn rejoin_split_digits(text: &str) -> String {
    let text = SPLIT_TWO_PART.replace_all(text, "$1$2");
    let text = SPLIT_THREE_PART.replace_all(&text, "$1$2$3");
    let text = SPLIT_AFTER_SLASH.replace_all(&text, "$1$2$3");
    YEAR_REASSEMBLY
        .replace_all(&text, |caps: &Captures| {
            let combined = format!("{}{}", &caps[1], &caps[2]);
            // Only a 3-4 digit concatenation reads as a year.
            if (3..=4).contains(&combined.len()) {
                combined
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Rule 2: collapse space runs to one and 3+ line breaks to exactly 2,
/// keeping paragraph structure.
pub fn collapse_whitespace(text: &str) -> String {
    let text = SPACE_RUNS.replace_all(text, " ");
    EXCESS_NEWLINES.replace_all(&text, "\n\n").into_owned()
}

/// Rule 3: repair month names broken by inserted whitespace.
pub fn repair_broken_months(text: &str) -> String {
    let mut text = text.to_string();
    for (pattern, replacement) in MONTH_FIXES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

/// Rule 4: coerce O->0 and l->1 when flanked by digits.
pub fn fix_ocr_digit_confusions(text: &str) -> String {
    let text = OCR_OH_FOR_ZERO.replace_all(text, "${1}0${2}");
    OCR_ELL_FOR_ONE.replace_all(&text, "${1}1${2}").into_owned()
}

/// Rule 5: rewrite `/`, `-`, `.` between date groups to `/`.
pub fn canonicalize_date_separators(text: &str) -> String {
    DATE_SEPARATORS.replace_all(text, "$1/$2/$3").into_owned()
}

/// Rule 6: collapse all ongoing-employment phrasings to `Present`.
pub fn canonicalize_present(text: &str) -> String {
    PRESENT_VARIANTS.replace_all(text, "Present").into_owned()
}

/// Rule 7: expand `MM/yy` to four digits; years below 50 land in the 2000s,
/// the rest in the 1900s.
pub fn expand_two_digit_years(text: &str) -> String {
    TWO_DIGIT_YEAR
        .replace_all(text, |caps: &Captures| {
            let year: u32 = caps[2].parse().expect("two-digit year");
            let century = if year < 50 { "20" } else { "19" };
            format!("{}/{}{}", &caps[1], century, &caps[2])
        })
        .into_owned()
}
