use crate::{domain::MessageParts, error::ContactFormError};

use super::{parts::resolve_part, ContactForm};

impl ContactForm {
    /// Resolves every message part against this form.
    ///
    /// Fails with `InvalidState` unless the form has been validated and is
    /// valid. A recipient list given when the form was built replaces the
    /// class-level one entirely.
    pub fn message_parts(&self) -> Result<MessageParts, ContactFormError> {
        if self.submission().is_none() {
            return Err(ContactFormError::InvalidState(
                "message cannot be built from invalid submission",
            ));
        }

        let parts = self.class().parts();
        let from_email = resolve_part(self, &parts.from_email, "from_email")?;
        let subject = single_line(&resolve_part(self, &parts.subject, "subject")?);
        let recipient_list = match self.recipient_override() {
            Some(list) => list.to_vec(),
            None => resolve_part(self, &parts.recipient_list, "recipient_list")?,
        };
        if recipient_list.is_empty() {
            return Err(ContactFormError::EmptyRecipients);
        }
        let message = resolve_part(self, &parts.message, "message")?;

        Ok(MessageParts {
            from_email,
            subject,
            recipient_list,
            message,
        })
    }
}

/// Removes every line boundary so the value is safe to use as a header.
pub fn single_line(value: &str) -> String {
    value.chars().filter(|c| !is_line_break(*c)).collect()
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_of_every_kind_are_removed() {
        assert_eq!(single_line("a\nb\r\nc\rd\u{2028}e\u{85}f\n"), "abcdef");
        assert_eq!(single_line("plain"), "plain");
    }
}
