//! Three-letter college and game codes used inside registration ids.
//!
//! A name is normalized (trimmed, lowercased, inner whitespace collapsed) and
//! looked up in a fixed table. Unknown names are derived:
//!
//! * exactly two words: first letter of each word, then the second letter of
//!   the first word (`"Silver Oak"` -> `"SOI"`);
//! * anything else: the first three alphanumeric characters, padded with `X`
//!   (`"Totally Unknown College"` -> `"TOT"`, `"X"` -> `"XXX"`).
//!
//! Only ASCII alphanumerics take part in a code, so a code is always exactly
//! three ASCII uppercase characters.

use thiserror::Error;

const CODE_LEN: usize = 3;
const PAD: char = 'X';

static COLLEGE_CODES: &[(&str, &str)] = &[
    ("saffrony institute of technology", "SAF"),
    ("saffrony", "SAF"),
    ("l.d. college of engineering", "LDC"),
    ("ldrp institute of technology and research", "LDR"),
    ("nirma university", "NIR"),
    ("gujarat technological university", "GTU"),
    ("silver oak university", "SOU"),
    ("ganpat university", "GNU"),
    ("charotar university of science and technology", "CHA"),
    ("adani university", "ADU"),
    ("pandit deendayal energy university", "PDE"),
    ("vishwakarma government engineering college", "VGE"),
];

static GAME_CODES: &[(&str, &str)] = &[
    ("algo cricket", "ACR"),
    ("box cricket", "BCR"),
    ("bgmi", "BGM"),
    ("free fire", "FFR"),
    ("valorant", "VAL"),
    ("chess", "CHS"),
    ("code combat", "CCB"),
    ("tech quiz", "TQZ"),
    ("robo race", "RRC"),
    ("tug of war", "TOW"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("no usable characters in {0:?}")]
    Unusable(String),
}

pub fn college_code(name: &str) -> Result<String, CodeError> {
    code_for(name, COLLEGE_CODES)
}

pub fn game_code(name: &str) -> Result<String, CodeError> {
    code_for(name, GAME_CODES)
}

/// Lowercased, trimmed, single-spaced form used for table lookups.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn code_for(name: &str, table: &[(&str, &str)]) -> Result<String, CodeError> {
    let normalized = normalize(name);

    if let Some((_, code)) = table.iter().find(|(known, _)| *known == normalized) {
        return Ok((*code).to_string());
    }

    let words: Vec<&str> = normalized.split_whitespace().collect();
    if let [first, second] = words.as_slice() {
        if let Some(code) = two_word_code(first, second) {
            return Ok(code);
        }
    }

    leading_code(&normalized).ok_or_else(|| CodeError::Unusable(name.to_string()))
}

fn two_word_code(first: &str, second: &str) -> Option<String> {
    let mut a = first.chars().filter(char::is_ascii_alphanumeric);
    let mut b = second.chars().filter(char::is_ascii_alphanumeric);

    let c1 = a.next()?;
    let c2 = b.next()?;
    // single-letter first word borrows from the second
    let c3 = a.next().or_else(|| b.next()).unwrap_or(PAD);

    Some([c1, c2, c3].iter().map(char::to_ascii_uppercase).collect())
}

fn leading_code(normalized: &str) -> Option<String> {
    let mut code: String = normalized
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(CODE_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if code.is_empty() {
        return None;
    }
    while code.len() < CODE_LEN {
        code.push(PAD);
    }
    Some(code)
}
