//! Contact form validation and message composition.
//!
//! A [`FormClass`] describes how a form builds its message: the
//! [`PartSpec`] for each part, the templates, site lookup and the optional
//! spam check. A [`ContactForm`] is one submission against a class.

mod builder;
pub mod context;
pub mod parts;
pub mod site;
mod spam_check;
pub mod templates;
pub mod validation;

use std::sync::Arc;

use serde_json::Value;

use crate::{
    akismet::SpamClientCache,
    config::FormSettings,
    domain::{FormData, MessageParts, RequestMeta, Submission},
    error::ContactFormError,
    mail::Mailer,
};

pub use builder::single_line;
pub use context::{request_processor, timestamp_processor, ContextProcessor};
pub use parts::{Part, PartSpec, Resolver};
pub use site::{ConfiguredSite, Site, SiteInfo, SiteRegistry};
pub use spam_check::{SpamCheckValidator, SPAM_MESSAGE};
pub use templates::{TemplateRenderer, BODY_TEMPLATE, SUBJECT_TEMPLATE};
pub use validation::{Field, FormErrors};

use parts::resolve_part;

static NO_ERRORS: FormErrors = FormErrors::new();

pub struct FormClass {
    parts: PartSpec,
    templates: Arc<TemplateRenderer>,
    sites: Option<Arc<dyn SiteRegistry>>,
    context_processors: Vec<ContextProcessor>,
    spam_check: Option<SpamCheckValidator>,
}

impl FormClass {
    /// The base contact form: mail from the default sender to the managers,
    /// with subject and body rendered from templates.
    pub fn contact(settings: &FormSettings, templates: Arc<TemplateRenderer>) -> Self {
        let parts = PartSpec::new()
            .from_email(Part::value(settings.default_from_email.clone()))
            .recipient_list(Part::value(settings.managers.clone()))
            .template_name(Part::value(BODY_TEMPLATE))
            .subject_template_name(Part::value(SUBJECT_TEMPLATE))
            .message(Part::from_fn(|form| {
                let name = resolve_part(form, &form.class().parts.template_name, "template_name")?;
                form.render(&name)
            }))
            .subject(Part::from_fn(|form| {
                let name = resolve_part(
                    form,
                    &form.class().parts.subject_template_name,
                    "subject_template_name",
                )?;
                form.render(&name)
            }));

        Self {
            parts,
            templates,
            sites: None,
            context_processors: Vec::new(),
            spam_check: None,
        }
    }

    /// Layers `overrides` on top of the current parts, like a subclass would.
    pub fn with_parts(mut self, overrides: PartSpec) -> Self {
        self.parts = overrides.inherit(&self.parts);
        self
    }

    pub fn with_site_registry(mut self, sites: Arc<dyn SiteRegistry>) -> Self {
        self.sites = Some(sites);
        self
    }

    pub fn with_context_processor(mut self, processor: ContextProcessor) -> Self {
        self.context_processors.push(processor);
        self
    }

    /// Adds the classifier check on the message body.
    pub fn with_spam_filter(mut self, cache: Arc<SpamClientCache>) -> Self {
        self.spam_check = Some(SpamCheckValidator::new(cache));
        self
    }

    pub fn parts(&self) -> &PartSpec {
        &self.parts
    }

    pub fn has_spam_filter(&self) -> bool {
        self.spam_check.is_some()
    }
}

struct Validation {
    submission: Option<Submission>,
    errors: FormErrors,
}

pub struct ContactForm {
    class: Arc<FormClass>,
    request: RequestMeta,
    data: FormData,
    recipient_list: Option<Vec<String>>,
    validation: Option<Validation>,
}

pub struct ContactFormBuilder {
    class: Arc<FormClass>,
    request: Option<RequestMeta>,
    data: FormData,
    recipient_list: Option<Vec<String>>,
}

impl ContactFormBuilder {
    pub fn request(mut self, request: RequestMeta) -> Self {
        self.request = Some(request);
        self
    }

    pub fn data(mut self, data: FormData) -> Self {
        self.data = data;
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Recipients for this submission only; replaces the class-level list.
    pub fn recipient_list(mut self, recipients: Vec<String>) -> Self {
        self.recipient_list = Some(recipients);
        self
    }

    pub fn build(self) -> Result<ContactForm, ContactFormError> {
        let request = self.request.ok_or(ContactFormError::Construction(
            "an originating request must be supplied",
        ))?;
        Ok(ContactForm {
            class: self.class,
            request,
            data: self.data,
            recipient_list: self.recipient_list,
            validation: None,
        })
    }
}

impl ContactForm {
    pub fn builder(class: Arc<FormClass>) -> ContactFormBuilder {
        ContactFormBuilder {
            class,
            request: None,
            data: FormData::new(),
            recipient_list: None,
        }
    }

    /// Validates once and remembers the outcome.
    ///
    /// Field problems, including a spam verdict, yield `Ok(false)` and are
    /// available from [`errors`](Self::errors). Classifier configuration and
    /// transport failures are returned as `Err`.
    pub async fn is_valid(&mut self) -> Result<bool, ContactFormError> {
        if self.validation.is_none() {
            let validation = self.full_clean().await?;
            if !validation.errors.is_empty() {
                tracing::debug!(
                    target: "form",
                    fields = ?validation.errors.iter().map(|(f, _)| f.as_str()).collect::<Vec<_>>(),
                    "submission failed validation"
                );
            }
            self.validation = Some(validation);
        }
        Ok(self.submission().is_some())
    }

    async fn full_clean(&self) -> Result<Validation, ContactFormError> {
        let (cleaned, mut errors) = validation::clean_fields(&self.data);
        if let Some(spam_check) = &self.class.spam_check {
            if let Some(message) = spam_check.validate(&cleaned, &self.request).await? {
                errors.add(Field::Body, message);
            }
        }
        let submission = if errors.is_empty() {
            cleaned.into_submission()
        } else {
            None
        };
        Ok(Validation { submission, errors })
    }

    /// Empty until [`is_valid`](Self::is_valid) has run.
    pub fn errors(&self) -> &FormErrors {
        self.validation
            .as_ref()
            .map_or(&NO_ERRORS, |validation| &validation.errors)
    }

    /// Cleaned values of a validated, valid form.
    pub fn submission(&self) -> Option<&Submission> {
        self.validation.as_ref()?.submission.as_ref()
    }

    pub fn class(&self) -> &FormClass {
        &self.class
    }

    pub fn request(&self) -> &RequestMeta {
        &self.request
    }

    pub(crate) fn recipient_override(&self) -> Option<&[String]> {
        self.recipient_list.as_deref()
    }

    pub fn site(&self) -> SiteInfo {
        SiteInfo::resolve(self.class.sites.as_deref(), &self.request)
    }

    /// Template context: processor values, `site`, and the cleaned fields.
    pub fn context(&self) -> Result<Value, ContactFormError> {
        let submission = self.submission().ok_or(ContactFormError::InvalidState(
            "cannot generate context from invalid contact form",
        ))?;
        Ok(context::build_context(
            &self.class.context_processors,
            &self.request,
            &self.site(),
            submission,
        ))
    }

    pub fn render(&self, template: &str) -> Result<String, ContactFormError> {
        self.class.templates.render(template, &self.context()?)
    }

    /// Validates if needed, builds the message and hands it to `mailer`.
    pub async fn save(
        &mut self,
        mailer: &dyn Mailer,
        fail_silently: bool,
    ) -> Result<MessageParts, ContactFormError> {
        self.is_valid().await?;
        let message = self.message_parts()?;
        mailer.send_mail(&message, fail_silently).await?;
        Ok(message)
    }
}
