//! Parsing of structured fields from generated email text.
//!
//! The generator is asked to format emails as:
//!
//! ```text
//! SUBJECT: <one line>
//!
//! BODY:
//! <all remaining lines, verbatim>
//! ```
//!
//! Models do not always comply, so parsing never fails: when either field
//! is missing or empty, a default subject is substituted and the entire
//! raw text becomes the body.

/// Subject used when the generated text lacks a usable `SUBJECT:` line.
pub const DEFAULT_SUBJECT: &str = "Application for Position";

/// A parsed email draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    /// The subject line, trimmed.
    pub subject: String,
    /// The body, trimmed as a block.
    pub body: String,
}

/// Extract subject and body from generated email text.
///
/// Total function: any input yields a usable draft via the documented
/// fallback.
pub fn parse_email(raw: &str) -> EmailDraft {
    let mut subject = String::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("SUBJECT:") {
            subject = rest.trim().to_string();
        } else if line.starts_with("BODY:") {
            in_body = true;
        } else if in_body {
            body_lines.push(line);
        }
    }

    let body = body_lines.join("\n").trim().to_string();

    if subject.is_empty() || body.is_empty() {
        return EmailDraft { subject: DEFAULT_SUBJECT.to_string(), body: raw.to_string() };
    }

    EmailDraft { subject, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_email() {
        let draft = parse_email("SUBJECT: Hello\n\nBODY:\nHi there");
        assert_eq!(draft.subject, "Hello");
        assert_eq!(draft.body, "Hi there");
    }

    #[test]
    fn body_keeps_interior_lines_verbatim() {
        let raw = "SUBJECT: Application\n\nBODY:\nDear team,\n\nFirst paragraph.\n\nBest,\nJane";
        let draft = parse_email(raw);
        assert_eq!(draft.body, "Dear team,\n\nFirst paragraph.\n\nBest,\nJane");
    }

    #[test]
    fn missing_markers_fall_back_to_default_subject_and_full_text() {
        let raw = "Just some unstructured model output.";
        let draft = parse_email(raw);
        assert_eq!(draft.subject, DEFAULT_SUBJECT);
        assert_eq!(draft.body, raw);
    }

    #[test]
    fn empty_subject_falls_back() {
        let raw = "SUBJECT:\n\nBODY:\nSome body";
        let draft = parse_email(raw);
        assert_eq!(draft.subject, DEFAULT_SUBJECT);
        assert_eq!(draft.body, raw);
    }

    #[test]
    fn missing_body_falls_back() {
        let raw = "SUBJECT: Only a subject line";
        let draft = parse_email(raw);
        assert_eq!(draft.subject, DEFAULT_SUBJECT);
        assert_eq!(draft.body, raw);
    }

    #[test]
    fn empty_input_yields_usable_draft() {
        let draft = parse_email("");
        assert_eq!(draft.subject, DEFAULT_SUBJECT);
        assert_eq!(draft.body, "");
    }
}
