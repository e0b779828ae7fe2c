use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::{
    domain::{ClassificationRequest, Verdict},
    error::TransportError,
};

use super::{
    protocol::{
        comment_check_form, parse_comment_check, parse_verify_key, verify_key_form,
        AKISMET_API_BASE, DEBUG_HELP_HEADER, PRO_TIP_HEADER,
    },
    AkismetConfig, SpamClassifier,
};

#[derive(Clone)]
pub struct AkismetClient {
    http: Client,
    config: AkismetConfig,
    endpoint: String,
}

impl AkismetClient {
    pub fn new(http: Client, config: AkismetConfig) -> Self {
        Self {
            http,
            config,
            endpoint: AKISMET_API_BASE.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    async fn post(
        &self,
        operation: &'static str,
        form: &[(&'static str, String)],
    ) -> Result<Response, TransportError> {
        self.http
            .post(format!("{}/{operation}", self.endpoint))
            .form(form)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|err| TransportError::from_reqwest(operation, err))
    }
}

#[async_trait]
impl SpamClassifier for AkismetClient {
    fn config(&self) -> &AkismetConfig {
        &self.config
    }

    async fn verify_key(&self) -> Result<bool, TransportError> {
        let response = self.post("verify-key", &verify_key_form(&self.config)).await?;
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::from_reqwest("verify-key", err))?;
        parse_verify_key(&body)
    }

    async fn comment_check(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Verdict, TransportError> {
        let response = self
            .post("comment-check", &comment_check_form(&self.config, request))
            .await?;
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        let pro_tip = header(PRO_TIP_HEADER);
        let debug_help = header(DEBUG_HELP_HEADER);
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::from_reqwest("comment-check", err))?;
        let verdict = parse_comment_check(&body, pro_tip.as_deref(), debug_help.as_deref())?;
        tracing::debug!(target: "akismet", ?verdict, "comment-check completed");
        Ok(verdict)
    }
}
