use std::sync::Arc;

use crate::error::ContactFormError;

use super::ContactForm;

pub type Resolver<T> = Arc<dyn Fn(&ContactForm) -> Result<T, ContactFormError> + Send + Sync>;

/// A message part declared either as a fixed value or as a function of the form.
pub enum Part<T> {
    Static(T),
    Resolver(Resolver<T>),
}

impl<T> Part<T> {
    pub fn value(value: impl Into<T>) -> Self {
        Part::Static(value.into())
    }

    pub fn from_fn<F>(resolver: F) -> Self
    where
        F: Fn(&ContactForm) -> Result<T, ContactFormError> + Send + Sync + 'static,
    {
        Part::Resolver(Arc::new(resolver))
    }
}

impl<T: Clone> Part<T> {
    /// Evaluated on every call so overrides see the current form state.
    pub fn resolve(&self, form: &ContactForm) -> Result<T, ContactFormError> {
        match self {
            Part::Static(value) => Ok(value.clone()),
            Part::Resolver(resolver) => resolver(form),
        }
    }
}

impl<T: Clone> Clone for Part<T> {
    fn clone(&self) -> Self {
        match self {
            Part::Static(value) => Part::Static(value.clone()),
            Part::Resolver(resolver) => Part::Resolver(resolver.clone()),
        }
    }
}

/// The message parts one layer of a form class declares.
///
/// Within a layer a resolver beats a static value for the same part no matter
/// the order they are declared in. Across layers, [`PartSpec::inherit`] keeps
/// the derived layer's declaration and falls back to the parent's.
#[derive(Clone, Default)]
pub struct PartSpec {
    pub(crate) from_email: Option<Part<String>>,
    pub(crate) subject: Option<Part<String>>,
    pub(crate) recipient_list: Option<Part<Vec<String>>>,
    pub(crate) message: Option<Part<String>>,
    pub(crate) template_name: Option<Part<String>>,
    pub(crate) subject_template_name: Option<Part<String>>,
}

impl PartSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_email(mut self, part: Part<String>) -> Self {
        declare(&mut self.from_email, part);
        self
    }

    pub fn subject(mut self, part: Part<String>) -> Self {
        declare(&mut self.subject, part);
        self
    }

    pub fn recipient_list(mut self, part: Part<Vec<String>>) -> Self {
        declare(&mut self.recipient_list, part);
        self
    }

    pub fn message(mut self, part: Part<String>) -> Self {
        declare(&mut self.message, part);
        self
    }

    pub fn template_name(mut self, part: Part<String>) -> Self {
        declare(&mut self.template_name, part);
        self
    }

    pub fn subject_template_name(mut self, part: Part<String>) -> Self {
        declare(&mut self.subject_template_name, part);
        self
    }

    pub fn inherit(self, parent: &PartSpec) -> Self {
        fn pick<T: Clone>(own: Option<Part<T>>, parent: &Option<Part<T>>) -> Option<Part<T>> {
            own.or_else(|| parent.clone())
        }

        Self {
            from_email: pick(self.from_email, &parent.from_email),
            subject: pick(self.subject, &parent.subject),
            recipient_list: pick(self.recipient_list, &parent.recipient_list),
            message: pick(self.message, &parent.message),
            template_name: pick(self.template_name, &parent.template_name),
            subject_template_name: pick(self.subject_template_name, &parent.subject_template_name),
        }
    }
}

fn declare<T>(slot: &mut Option<Part<T>>, part: Part<T>) {
    if matches!((&*slot, &part), (Some(Part::Resolver(_)), Part::Static(_))) {
        return;
    }
    *slot = Some(part);
}

pub(crate) fn resolve_part<T: Clone>(
    form: &ContactForm,
    part: &Option<Part<T>>,
    name: &'static str,
) -> Result<T, ContactFormError> {
    part.as_ref()
        .ok_or(ContactFormError::UndefinedPart(name))?
        .resolve(form)
}
