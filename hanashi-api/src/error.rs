use anyhow::{anyhow, Context};

use crate::{MarkupError, MAX_USERNAME_LEN};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Error: {0}")]
    Markup(#[from] MarkupError),

    #[error("Enter a valid URL (e.g., https://example.com)")]
    InvalidHomePage(String),

    #[error("Field {0} is required")]
    MissingField(&'static str),

    #[error("Username must not exceed {} characters", MAX_USERNAME_LEN)]
    UsernameTooLong(String),

    #[error("Only JPG, PNG, GIF, or TXT files are allowed (got {0:?})")]
    UnsupportedAttachment(String),

    #[error("Only JPG, PNG, and GIF files are allowed for avatars (got {0:?})")]
    UnsupportedAvatar(String),

    #[error("Text file size must not exceed 100KB (got {0} bytes)")]
    TextFileTooLarge(usize),

    /// Rejection reason given by the comment API, displayable as-is
    #[error("{0}")]
    Remote(String),
}

impl Error {
    /// Errors that only concern the picked file, not the rest of the form
    pub fn is_attachment_rejection(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedAttachment(_) | Error::UnsupportedAvatar(_) | Error::TextFileTooLarge(_)
        )
    }

    /// Decodes the body of a rejected API request.
    ///
    /// The API answers either `{"error": "..."}` or a map of field names to
    /// lists of messages; the latter is flattened into `field: message`.
    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let fields = data
            .as_object()
            .ok_or_else(|| anyhow!("error contents is not an object"))?;
        if let Some(msg) = fields.get("error").and_then(|e| e.as_str()) {
            return Ok(Error::Remote(String::from(msg)));
        }
        let msgs = fields
            .iter()
            .flat_map(|(field, errs)| {
                let errs = match errs {
                    serde_json::Value::Array(errs) => errs.clone(),
                    e => vec![e.clone()],
                };
                errs.into_iter()
                    .filter_map(|e| e.as_str().map(String::from))
                    .map(move |e| format!("{field}: {e}"))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        if msgs.is_empty() {
            return Err(anyhow!("error contents has no message"));
        }
        Ok(Error::Remote(msgs.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_field() {
        assert_eq!(
            Error::parse(br#"{"error": "Invalid CAPTCHA"}"#).unwrap(),
            Error::Remote(String::from("Invalid CAPTCHA")),
        );
    }

    #[test]
    fn parse_field_errors() {
        assert_eq!(
            Error::parse(br#"{"email": ["Enter a valid email address."]}"#).unwrap(),
            Error::Remote(String::from("email: Enter a valid email address.")),
        );
    }

    #[test]
    fn parse_garbage() {
        assert!(Error::parse(b"<html>502</html>").is_err());
        assert!(Error::parse(b"[1, 2]").is_err());
        assert!(Error::parse(b"{}").is_err());
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::from(MarkupError::Unclosed(String::from("i"))).to_string(),
            "Error: tag <i> unclosed",
        );
        assert_eq!(Error::Remote(String::from("CAPTCHA expired")).to_string(), "CAPTCHA expired");
        assert!(Error::TextFileTooLarge(1 << 20).is_attachment_rejection());
        assert!(!Error::MissingField("text").is_attachment_rejection());
    }
}
