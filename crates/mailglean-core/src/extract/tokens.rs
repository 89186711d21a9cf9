#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexTag {
    /// Capitalized word with at least one lowercase letter ("Jane", "O'Brien").
    Title,
    /// Single uppercase letter, optionally dotted ("J", "J.").
    Initial,
    /// Multi-letter all-caps run ("IRS").
    Acronym,
    /// All-lowercase alphabetic word.
    Lower,
    /// Pure digit run.
    Number,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub tag: LexTag,
}

/// Split a body into word tokens: whitespace-separated, with surrounding
/// punctuation peeled off and a lexical tag assigned to each word.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for raw in input.split_whitespace() {
        let Some(word) = strip_token(raw) else {
            continue;
        };
        tokens.push(Token {
            tag: tag_for(word),
            text: word.to_string(),
        });
    }
    tokens
}

fn strip_token(raw: &str) -> Option<&str> {
    let trimmed = raw.trim_matches(|ch: char| !ch.is_alphanumeric());
    if trimmed.is_empty() {
        return None;
    }

    // Keep the trailing dot on single-letter initials ("J.").
    let mut chars = trimmed.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        if first.is_uppercase() {
            if let Some(start) = raw.find(trimmed) {
                let end = start + trimmed.len();
                if raw[end..].starts_with('.') {
                    return Some(&raw[start..=end]);
                }
            }
        }
    }

    Some(trimmed)
}

fn tag_for(word: &str) -> LexTag {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return LexTag::Other;
    };

    if word.chars().all(|ch| ch.is_ascii_digit()) {
        return LexTag::Number;
    }

    let rest: Vec<char> = chars.collect();
    if first.is_uppercase() && first.is_alphabetic() {
        if rest.is_empty() || rest == ['.'] {
            return LexTag::Initial;
        }
        if rest.iter().all(|ch| ch.is_uppercase() && ch.is_alphabetic()) {
            return LexTag::Acronym;
        }
        if rest
            .iter()
            .all(|ch| ch.is_alphabetic() || *ch == '\'' || *ch == '-')
            && rest.iter().any(|ch| ch.is_lowercase())
        {
            return LexTag::Title;
        }
        return LexTag::Other;
    }

    if first.is_lowercase() && word.chars().all(|ch| ch.is_alphabetic()) {
        return LexTag::Lower;
    }

    LexTag::Other
}

#[cfg(test)]
mod tests {
    use super::{tokenize, LexTag};

    fn tags(input: &str) -> Vec<(String, LexTag)> {
        tokenize(input)
            .into_iter()
            .map(|token| (token.text, token.tag))
            .collect()
    }

    #[test]
    fn splits_and_peels_punctuation() {
        let tokens = tags("Hello, Jane Doe!");
        assert_eq!(
            tokens,
            vec![
                ("Hello".to_string(), LexTag::Title),
                ("Jane".to_string(), LexTag::Title),
                ("Doe".to_string(), LexTag::Title),
            ]
        );
    }

    #[test]
    fn keeps_dot_on_initials() {
        let tokens = tags("J. Edgar Hoover");
        assert_eq!(tokens[0].0, "J.");
        assert_eq!(tokens[0].1, LexTag::Initial);
    }

    #[test]
    fn tags_numbers_acronyms_and_compounds() {
        let tokens = tags("call the IRS at 123 about O'Brien-Smith");
        assert_eq!(tokens[1], ("the".to_string(), LexTag::Lower));
        assert_eq!(tokens[2], ("IRS".to_string(), LexTag::Acronym));
        assert_eq!(tokens[4], ("123".to_string(), LexTag::Number));
        assert_eq!(tokens[6], ("O'Brien-Smith".to_string(), LexTag::Title));
    }

    #[test]
    fn mixed_tokens_are_other() {
        let tokens = tags("555-123-4567 jane.doe@example.com");
        assert!(tokens.iter().all(|(_, tag)| *tag == LexTag::Other));
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ...  ").is_empty());
    }
}
