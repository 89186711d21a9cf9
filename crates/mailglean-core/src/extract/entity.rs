use crate::error::CoreError;
use crate::extract::tokens::{LexTag, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Person,
    Location,
}

/// A contiguous run of tokens recognized as one named entity.
/// `start..end` indexes into the token slice the finder was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

/// Named-entity span finder. The extraction pipeline only depends on this
/// seam, so the heuristic chunker below can be swapped for a model-backed
/// tagger without touching the filtering logic.
pub trait SpanFinder {
    fn find_spans(&self, tokens: &[Token]) -> Result<Vec<EntitySpan>, CoreError>;
}

/// Capitalized words that routinely open sentences or email boilerplate and
/// must not seed a name span.
const COMMON_WORDS: &[&str] = &[
    "A", "An", "The", "This", "That", "These", "Those", "I", "It", "We", "You", "He", "She",
    "They", "My", "Our", "Your", "If", "In", "On", "At", "To", "For", "From", "And", "Or", "But",
    "Not", "Is", "Are", "Was", "Were", "Be", "Do", "Does", "Did", "As", "By", "With", "When",
    "Where", "What", "Who", "How", "Why", "Here", "There", "Now", "Then", "Please", "Contact",
    "Dear", "Hi", "Hello", "Hey", "Thanks", "Thank", "Regards", "Best", "Sincerely", "Cheers",
    "Subject", "Re", "Fwd", "Sent", "Reply", "Forwarded", "Original", "Message",
];

/// A span ending in one of these is a street name, not a person.
const STREET_SUFFIXES: &[&str] = &[
    "Street",
    "Avenue",
    "Road",
    "Drive",
    "Lane",
    "Boulevard",
    "Parkway",
    "Court",
    "Place",
    "Way",
    "Terrace",
    "Circle",
    "Highway",
];

/// Default span finder: maximal runs of name-shaped tokens, with a
/// common-word stoplist and a street-suffix gazetteer standing in for a
/// trained person/location chunker.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicChunker;

impl SpanFinder for HeuristicChunker {
    fn find_spans(&self, tokens: &[Token]) -> Result<Vec<EntitySpan>, CoreError> {
        let mut spans = Vec::new();
        let mut start = None;

        for (idx, token) in tokens.iter().enumerate() {
            if is_name_shaped(token) {
                start.get_or_insert(idx);
            } else if let Some(begin) = start.take() {
                spans.push(close_span(tokens, begin, idx));
            }
        }
        if let Some(begin) = start {
            spans.push(close_span(tokens, begin, tokens.len()));
        }

        Ok(spans)
    }
}

fn close_span(tokens: &[Token], start: usize, end: usize) -> EntitySpan {
    let label = if STREET_SUFFIXES.contains(&tokens[end - 1].text.as_str()) {
        EntityLabel::Location
    } else {
        EntityLabel::Person
    };
    EntitySpan { label, start, end }
}

fn is_name_shaped(token: &Token) -> bool {
    match token.tag {
        LexTag::Initial => true,
        LexTag::Title => !COMMON_WORDS.contains(&token.text.as_str()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityLabel, HeuristicChunker, SpanFinder};
    use crate::extract::tokens::tokenize;

    fn spans(input: &str) -> Vec<(EntityLabel, String)> {
        let tokens = tokenize(input);
        HeuristicChunker
            .find_spans(&tokens)
            .expect("find spans")
            .into_iter()
            .map(|span| {
                let text = tokens[span.start..span.end]
                    .iter()
                    .map(|token| token.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                (span.label, text)
            })
            .collect()
    }

    #[test]
    fn finds_person_runs() {
        let found = spans("Please ask Jane Doe or Bob O'Brien for details");
        assert_eq!(
            found,
            vec![
                (EntityLabel::Person, "Jane Doe".to_string()),
                (EntityLabel::Person, "Bob O'Brien".to_string()),
            ]
        );
    }

    #[test]
    fn common_words_do_not_seed_spans() {
        let found = spans("Contact Jane Doe today");
        assert_eq!(found, vec![(EntityLabel::Person, "Jane Doe".to_string())]);
    }

    #[test]
    fn street_suffix_labels_location() {
        let found = spans("visit 123 Main Street soon");
        assert_eq!(found, vec![(EntityLabel::Location, "Main Street".to_string())]);
    }

    #[test]
    fn initials_extend_spans() {
        let found = spans("signed by J. Edgar Hoover");
        assert_eq!(
            found,
            vec![(EntityLabel::Person, "J. Edgar Hoover".to_string())]
        );
    }

    #[test]
    fn digits_and_lowercase_break_spans() {
        let found = spans("Jane 42 Doe");
        assert_eq!(
            found,
            vec![
                (EntityLabel::Person, "Jane".to_string()),
                (EntityLabel::Person, "Doe".to_string()),
            ]
        );
    }
}
