use crate::{
    domain::{ClassificationRequest, Verdict},
    error::TransportError,
};

use super::AkismetConfig;

pub const AKISMET_API_BASE: &str = "https://rest.akismet.com/1.1";

pub(crate) const PRO_TIP_HEADER: &str = "x-akismet-pro-tip";
pub(crate) const DEBUG_HELP_HEADER: &str = "x-akismet-debug-help";

pub fn verify_key_form(config: &AkismetConfig) -> Vec<(&'static str, String)> {
    vec![("api_key", config.key.clone()), ("blog", config.url.clone())]
}

pub fn comment_check_form(
    config: &AkismetConfig,
    request: &ClassificationRequest,
) -> Vec<(&'static str, String)> {
    vec![
        ("api_key", config.key.clone()),
        ("blog", config.url.clone()),
        ("blog_charset", "UTF-8".to_string()),
        ("comment_type", request.content_type.to_string()),
        ("referrer", request.referrer.clone()),
        ("user_ip", request.client_ip.clone()),
        ("user_agent", request.user_agent.clone()),
        ("comment_author", request.author.clone()),
        ("comment_author_email", request.author_email.clone()),
        ("comment_content", request.body.clone()),
    ]
}

pub fn parse_verify_key(body: &str) -> Result<bool, TransportError> {
    match body.trim() {
        "valid" => Ok(true),
        "invalid" => Ok(false),
        other => Err(TransportError::UnexpectedResponse {
            operation: "verify-key",
            detail: truncate(other),
        }),
    }
}

pub fn parse_comment_check(
    body: &str,
    pro_tip: Option<&str>,
    debug_help: Option<&str>,
) -> Result<Verdict, TransportError> {
    match body.trim() {
        "true" if pro_tip.map(str::trim) == Some("discard") => Ok(Verdict::Discard),
        "true" => Ok(Verdict::Spam),
        "false" => Ok(Verdict::Ham),
        other => Err(TransportError::UnexpectedResponse {
            operation: "comment-check",
            detail: match debug_help {
                Some(help) => format!("{} ({help})", truncate(other)),
                None => truncate(other),
            },
        }),
    }
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestMeta;

    #[test]
    fn verify_key_responses() {
        assert!(parse_verify_key("valid").unwrap());
        assert!(!parse_verify_key("invalid\n").unwrap());
        assert!(matches!(
            parse_verify_key("<html>"),
            Err(TransportError::UnexpectedResponse { operation: "verify-key", .. })
        ));
    }

    #[test]
    fn comment_check_responses() {
        assert_eq!(parse_comment_check("false", None, None).unwrap(), Verdict::Ham);
        assert_eq!(parse_comment_check("true", None, None).unwrap(), Verdict::Spam);
        assert_eq!(
            parse_comment_check("true", Some("discard"), None).unwrap(),
            Verdict::Discard
        );
        let err = parse_comment_check("invalid", None, Some("Empty \"blog\" value")).unwrap_err();
        assert!(err.to_string().contains("Empty \"blog\" value"));
    }

    #[test]
    fn comment_check_form_carries_request_metadata() {
        let config = AkismetConfig::new("k", "https://example.com/").unwrap();
        let mut meta = RequestMeta::new("example.com");
        meta.remote_addr = Some("203.0.113.9".into());
        let request = ClassificationRequest::new("Hello", "Ann", "ann@example.com", &meta);
        let form = comment_check_form(&config, &request);
        let get = |name: &str| {
            form.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str())
        };
        assert_eq!(get("comment_type"), Some("comment"));
        assert_eq!(get("user_ip"), Some("203.0.113.9"));
        assert_eq!(get("referrer"), Some(""));
        assert_eq!(get("comment_content"), Some("Hello"));
        assert_eq!(get("blog"), Some("https://example.com/"));
    }
}
