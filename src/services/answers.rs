//! Free-text answer matching.

/// Splits a stored gloss such as `"thank you, thanks"` into its accepted
/// alternatives.
pub fn acceptable_answers(expected: &str) -> Vec<String> {
    expected
        .split([',', ';', '/'])
        .map(normalize_answer)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn normalize_answer(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c.is_ascii_punctuation() || c == '。' || c == '！' || c == '？');
    let trimmed = trimmed.trim();
    trimmed.strip_prefix("to ").unwrap_or(trimmed).trim().to_string()
}

/// Case-insensitive match of `answer` against any alternative in `expected`.
pub fn matches_any(answer: &str, expected: &str) -> bool {
    let answer = normalize_answer(answer);
    if answer.is_empty() {
        return false;
    }
    acceptable_answers(expected).iter().any(|candidate| *candidate == answer)
}

/// Reduces pinyin to bare lowercase letters so that `nǐ hǎo`, `ni3 hao3`,
/// `Ni Hao` and `nihao` compare equal. `ü` in any form becomes `v`.
pub fn normalize_pinyin(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if (ch == 'u' || ch == 'U') && chars.peek() == Some(&':') {
            chars.next();
            out.push('v');
            continue;
        }
        match strip_tone(ch) {
            Some(base) => out.push(base),
            None if ch.is_alphabetic() => out.extend(ch.to_lowercase()),
            None => {}
        }
    }
    out
}

pub fn matches_pinyin(answer: &str, pinyin: &str) -> bool {
    let answer = normalize_pinyin(answer);
    !answer.is_empty() && answer == normalize_pinyin(pinyin)
}

fn strip_tone(ch: char) -> Option<char> {
    let base = match ch {
        'ā' | 'á' | 'ǎ' | 'à' | 'Ā' | 'Á' | 'Ǎ' | 'À' => 'a',
        'ē' | 'é' | 'ě' | 'è' | 'Ē' | 'É' | 'Ě' | 'È' => 'e',
        'ī' | 'í' | 'ǐ' | 'ì' | 'Ī' | 'Í' | 'Ǐ' | 'Ì' => 'i',
        'ō' | 'ó' | 'ǒ' | 'ò' | 'Ō' | 'Ó' | 'Ǒ' | 'Ò' => 'o',
        'ū' | 'ú' | 'ǔ' | 'ù' | 'Ū' | 'Ú' | 'Ǔ' | 'Ù' => 'u',
        'ü' | 'ǖ' | 'ǘ' | 'ǚ' | 'ǜ' | 'Ü' | 'Ǖ' | 'Ǘ' | 'Ǚ' | 'Ǜ' => 'v',
        'a'..='z' => ch,
        'A'..='Z' => ch.to_ascii_lowercase(),
        _ => return None,
    };
    Some(base)
}
