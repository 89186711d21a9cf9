pub mod entity;
pub mod patterns;
pub mod tokens;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::exclude::ExclusionSet;
use self::entity::{EntityLabel, HeuristicChunker, SpanFinder};
use self::tokens::tokenize;

/// Everything extracted from one message body. The four sequences are
/// independently sized and ordered by first occurrence in the source text;
/// `names[i]` and `emails[i]` do not belong together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub names: Vec<String>,
    pub emails: Vec<String>,
    pub addresses: Vec<String>,
    pub phones: Vec<String>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
            && self.emails.is_empty()
            && self.addresses.is_empty()
            && self.phones.is_empty()
    }
}

pub struct Extractor {
    exclude: ExclusionSet,
    finder: Box<dyn SpanFinder + Send + Sync>,
}

impl Extractor {
    pub fn new(exclude: ExclusionSet) -> Self {
        Self::with_finder(exclude, Box::new(HeuristicChunker))
    }

    pub fn with_finder(exclude: ExclusionSet, finder: Box<dyn SpanFinder + Send + Sync>) -> Self {
        Self { exclude, finder }
    }

    /// Pure and infallible: identical input yields identical output, and a
    /// span-finder failure degrades to an empty name list instead of
    /// surfacing, so one bad message never aborts a batch.
    pub fn extract(&self, body: &str) -> ExtractionResult {
        let emails = find_all(&patterns::EMAIL, body);
        let phones = find_all(&patterns::PHONE, body);
        let addresses = find_all(&patterns::ADDRESS, body);
        let names = match self.person_names(body) {
            Ok(names) => names,
            Err(err) => {
                warn!(error = %err, "name extraction failed, continuing without names");
                Vec::new()
            }
        };

        debug!(
            names = names.len(),
            emails = emails.len(),
            addresses = addresses.len(),
            phones = phones.len(),
            "extracted entities"
        );

        ExtractionResult {
            names,
            emails,
            addresses,
            phones,
        }
    }

    fn person_names(&self, body: &str) -> Result<Vec<String>, CoreError> {
        let tokens = tokenize(body);
        let spans = self.finder.find_spans(&tokens)?;

        let mut names: Vec<String> = Vec::new();
        for span in spans {
            if span.label != EntityLabel::Person {
                continue;
            }
            let parts = &tokens[span.start..span.end];
            // Lone surnames and mis-tagged single words are noise.
            if parts.len() < 2 {
                continue;
            }
            if parts
                .iter()
                .any(|token| self.exclude.contains_token(&token.text))
            {
                continue;
            }
            let name = parts
                .iter()
                .map(|token| token.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }
}

fn find_all(pattern: &Regex, body: &str) -> Vec<String> {
    pattern
        .find_iter(body)
        .map(|found| found.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::entity::{EntitySpan, SpanFinder};
    use super::tokens::Token;
    use super::{ExtractionResult, Extractor};
    use crate::error::CoreError;
    use crate::exclude::ExclusionSet;

    fn extractor() -> Extractor {
        Extractor::new(ExclusionSet::default_list())
    }

    #[test]
    fn round_trip_single_contact() {
        let body = "Contact Jane Doe at jane.doe@example.com or 555-123-4567, 123 Main Street";
        let result = extractor().extract(body);
        assert_eq!(result.names, vec!["Jane Doe"]);
        assert_eq!(result.emails, vec!["jane.doe@example.com"]);
        assert_eq!(result.phones, vec!["555-123-4567"]);
        assert_eq!(result.addresses, vec!["123 Main Street"]);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = extractor().extract("");
        assert_eq!(result, ExtractionResult::default());
        assert!(result.is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let body = "Ada Lovelace <ada@example.org>, Grace Hopper, 10 Navy Way";
        let first = extractor().extract(body);
        let second = extractor().extract(body);
        assert_eq!(first, second);
    }

    #[test]
    fn excluded_tokens_suppress_names() {
        let result = extractor().extract("Your Google Account was accessed");
        assert!(result.names.is_empty());
    }

    #[test]
    fn single_token_names_are_dropped() {
        let result = extractor().extract("ask Smith about the invoice");
        assert!(result.names.is_empty());
    }

    #[test]
    fn duplicate_names_keep_first_occurrence() {
        let body = "Jane Doe wrote back. Jane Doe confirmed it, then Bob Smith replied.";
        let result = extractor().extract(body);
        assert_eq!(result.names, vec!["Jane Doe", "Bob Smith"]);
    }

    #[test]
    fn duplicate_emails_are_retained() {
        let body = "a@example.com then a@example.com again";
        let result = extractor().extract(body);
        assert_eq!(result.emails, vec!["a@example.com", "a@example.com"]);
    }

    #[test]
    fn several_names_one_email_keep_independent_lengths() {
        let body = "Jane Doe, Bob Smith and Eve Adams share team@example.com";
        let result = extractor().extract(body);
        assert_eq!(result.names.len(), 3);
        assert_eq!(result.emails.len(), 1);
    }

    struct FailingFinder;

    impl SpanFinder for FailingFinder {
        fn find_spans(&self, _tokens: &[Token]) -> Result<Vec<EntitySpan>, CoreError> {
            Err(CoreError::SpanFinder("model unavailable".to_string()))
        }
    }

    #[test]
    fn finder_failure_degrades_to_empty_names() {
        let extractor =
            Extractor::with_finder(ExclusionSet::default_list(), Box::new(FailingFinder));
        let result = extractor.extract("Jane Doe jane@example.com");
        assert!(result.names.is_empty());
        assert_eq!(result.emails, vec!["jane@example.com"]);
    }
}
