//! Free-form name splitting and `"Last, First"` rendering.

const PREFIXES: &[&str] = &[
    "mr", "mrs", "ms", "miss", "mx", "dr", "prof", "professor", "rev", "sir", "madam",
];

const SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "v", "phd", "md", "esq", "dds", "jd",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    pub prefix: String,
    pub first: String,
    pub middle: String,
    pub last: String,
    pub suffix: String,
}

pub fn parse(raw: &str) -> ParsedName {
    let words: Vec<&str> = raw.split_whitespace().collect();
    let mut parsed = ParsedName::default();

    let mut start = 0;
    let mut end = words.len();

    while start < end && PREFIXES.contains(&bare_word(words[start]).as_str()) {
        if !parsed.prefix.is_empty() {
            parsed.prefix.push(' ');
        }
        parsed.prefix.push_str(words[start]);
        start += 1;
    }

    while end > start + 1 && SUFFIXES.contains(&bare_word(words[end - 1]).as_str()) {
        if parsed.suffix.is_empty() {
            parsed.suffix = words[end - 1].to_string();
        } else {
            parsed.suffix = format!("{} {}", words[end - 1], parsed.suffix);
        }
        end -= 1;
    }

    let rest = &words[start..end];
    match rest.len() {
        0 => {}
        1 => parsed.first = rest[0].to_string(),
        _ => {
            parsed.first = rest[0].to_string();
            parsed.last = rest[rest.len() - 1].to_string();
            parsed.middle = rest[1..rest.len() - 1].join(" ");
        }
    }

    parsed
}

/// Render a free-form name as `"Last, First"`. When either component is
/// missing the comma collapses away instead of leaving a stray delimiter.
pub fn last_first(raw: &str) -> String {
    let parsed = parse(raw);
    format!("{}, {}", parsed.last, parsed.first)
        .trim_matches(|ch: char| ch == ',' || ch == ' ')
        .to_string()
}

fn bare_word(word: &str) -> String {
    word.trim_matches(|ch: char| ch == '.' || ch == ',')
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{last_first, parse};

    #[test]
    fn splits_first_middle_last() {
        let parsed = parse("Jane Q. Doe");
        assert_eq!(parsed.first, "Jane");
        assert_eq!(parsed.middle, "Q.");
        assert_eq!(parsed.last, "Doe");
    }

    #[test]
    fn recognizes_prefix_and_suffix() {
        let parsed = parse("Dr. Jane Doe Jr.");
        assert_eq!(parsed.prefix, "Dr.");
        assert_eq!(parsed.first, "Jane");
        assert_eq!(parsed.last, "Doe");
        assert_eq!(parsed.suffix, "Jr.");
    }

    #[test]
    fn renders_last_first() {
        assert_eq!(last_first("Jane Doe"), "Doe, Jane");
        assert_eq!(last_first("Jane Q. Doe"), "Doe, Jane");
    }

    #[test]
    fn collapses_missing_components() {
        // A single word parses as a bare first name.
        assert_eq!(last_first("Jane"), "Jane");
        assert_eq!(last_first(""), "");
    }

    #[test]
    fn suffix_never_consumes_the_whole_name() {
        let parsed = parse("Jr.");
        assert_eq!(parsed.first, "Jr.");
        assert_eq!(parsed.suffix, "");
    }
}
