use mailparse::{parse_mail, ParsedMail};

use crate::error::{MailError, Result};

/// Normalize a raw RFC 2822 message into a single body string: depth-first
/// over multipart children, first `text/plain` or `text/html` leaf wins,
/// transfer encodings decoded by the parser. No decodable textual part
/// yields an empty string, not an error.
pub fn decode_body(raw: &[u8]) -> Result<String> {
    let mail = parse_mail(raw).map_err(|err| MailError::Parse(format!("mime parse: {err}")))?;
    Ok(first_text_part(&mail).unwrap_or_default())
}

fn first_text_part(part: &ParsedMail<'_>) -> Option<String> {
    if part.subparts.is_empty() {
        let mimetype = part.ctype.mimetype.to_ascii_lowercase();
        if mimetype == "text/plain" || mimetype == "text/html" {
            return part.get_body().ok();
        }
        return None;
    }
    part.subparts.iter().find_map(first_text_part)
}
