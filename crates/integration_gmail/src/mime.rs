//! MIME composition for `users.messages.send`

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};

use crate::error::GmailError;

/// Parts of one outgoing email
#[derive(Debug, Clone)]
pub struct EmailComposition<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub text_body: &'a str,
    pub html_body: &'a str,
}

/// Build a multipart/alternative message and encode it for the `raw` field
pub fn build_raw_message(email: &EmailComposition<'_>) -> Result<String, GmailError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|e| GmailError::InvalidMessage(format!("from address: {e}")))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| GmailError::InvalidMessage(format!("to address: {e}")))?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.text_body.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.html_body.to_string()),
                ),
        )
        .map_err(|e| GmailError::InvalidMessage(e.to_string()))?;

    Ok(encode_raw(&message.formatted()))
}

/// Base64url encoding expected by the Gmail API
pub fn encode_raw(bytes: &[u8]) -> String {
    URL_SAFE.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> String {
        String::from_utf8(URL_SAFE.decode(raw).unwrap()).unwrap()
    }

    fn composition<'a>(to: &'a str, subject: &'a str) -> EmailComposition<'a> {
        EmailComposition {
            from: "reader@example.com",
            to,
            subject,
            text_body: "## Top AI News\n\nPlain fallback",
            html_body: "<html><body><h2>Top AI News</h2></body></html>",
        }
    }

    #[test]
    fn message_is_multipart_alternative() {
        let raw = build_raw_message(&composition("reader@example.com", "Weekly brief")).unwrap();
        let decoded = decode(&raw);

        assert!(decoded.contains("Content-Type: multipart/alternative"));
        assert!(decoded.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(decoded.contains("Content-Type: text/html; charset=utf-8"));
        assert!(decoded.contains("To: reader@example.com"));
        assert!(decoded.contains("Subject: Weekly brief"));
    }

    #[test]
    fn raw_is_url_safe() {
        let raw = build_raw_message(&composition(
            "reader@example.com",
            "Weekly AI & Data Engineering Brief – March 02, 2026 to March 08, 2026",
        ))
        .unwrap();
        assert!(!raw.contains('+'));
        assert!(!raw.contains('/'));
    }

    #[test]
    fn invalid_recipient_is_rejected_before_send() {
        let err = build_raw_message(&composition("not an address", "x")).unwrap_err();
        assert!(matches!(err, GmailError::InvalidMessage(_)));
    }
}
