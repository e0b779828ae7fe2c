use std::{
    fs,
    path::{Path, PathBuf},
};

use minijinja::{Environment, Error, ErrorKind};
use serde_json::Value;

use crate::{config::FormSettings, error::ContactFormError};

pub const BODY_TEMPLATE: &str = "contact_form/contact_form.txt";
pub const SUBJECT_TEMPLATE: &str = "contact_form/contact_form_subject.txt";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        BODY_TEMPLATE,
        include_str!("../../templates/contact_form/contact_form.txt"),
    ),
    (
        SUBJECT_TEMPLATE,
        include_str!("../../templates/contact_form/contact_form_subject.txt"),
    ),
];

/// Renders message templates, preferring files in the configured template
/// directory over the built-in defaults.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(template_dir: Option<PathBuf>) -> Self {
        let mut env = Environment::new();
        env.set_loader(move |name| load_template(template_dir.as_deref(), name));
        Self { env }
    }

    pub fn from_settings(settings: &FormSettings) -> Self {
        Self::new(settings.template_dir.as_ref().map(PathBuf::from))
    }

    /// Registers an in-memory template; it shadows any file of the same name.
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), ContactFormError> {
        self.env.add_template_owned(name.into(), source.into())?;
        Ok(())
    }

    pub fn render(&self, name: &str, context: &Value) -> Result<String, ContactFormError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context)?)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(None)
    }
}

fn load_template(dir: Option<&Path>, name: &str) -> Result<Option<String>, Error> {
    if let Some(dir) = dir {
        if name
            .split(['/', '\\'])
            .any(|segment| segment.is_empty() || segment == "..")
        {
            return Ok(None);
        }
        let path = dir.join(name);
        if path.is_file() {
            return fs::read_to_string(&path).map(Some).map_err(|err| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {}", path.display()),
                )
                .with_source(err)
            });
        }
    }
    Ok(BUILTIN_TEMPLATES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| source.to_string()))
}
