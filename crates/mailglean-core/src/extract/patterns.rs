use once_cell::sync::Lazy;
use regex::Regex;

/// `local@domain.tld` with a two-letter-minimum alphabetic top level.
pub static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern")
});

/// North-American 3-3-4 shape with optional country code, separators, and
/// parenthesized area code. Best effort: misses most international formats
/// and matches phone-shaped digit runs such as order numbers.
pub static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\+?\d{1,3})?[-. ]?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b")
        .expect("phone pattern")
});

/// Street number followed by two alphabetic words. Intentionally coarse
/// ("123 very fast" matches); a full address grammar is out of scope.
pub static ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s[A-Za-z]+\s[A-Za-z]+").expect("address pattern"));
