use serde::Serialize;

use crate::{config::SiteSettings, domain::RequestMeta};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub name: String,
    pub domain: String,
}

/// Source of the current site when the deployment registers one.
pub trait SiteRegistry: Send + Sync {
    fn current_site(&self) -> Site;
}

pub struct ConfiguredSite(Site);

impl From<&SiteSettings> for ConfiguredSite {
    fn from(settings: &SiteSettings) -> Self {
        Self(Site {
            name: settings.name.clone(),
            domain: settings.domain.clone(),
        })
    }
}

impl SiteRegistry for ConfiguredSite {
    fn current_site(&self) -> Site {
        self.0.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SiteInfo {
    Registered(Site),
    /// Stand-in built from the request host when no registry is installed.
    Request(Site),
}

impl SiteInfo {
    pub fn resolve(registry: Option<&dyn SiteRegistry>, request: &RequestMeta) -> Self {
        match registry {
            Some(registry) => SiteInfo::Registered(registry.current_site()),
            None => {
                let host = request.host.trim().to_string();
                SiteInfo::Request(Site {
                    name: host.clone(),
                    domain: host,
                })
            }
        }
    }

    pub fn site(&self) -> &Site {
        match self {
            SiteInfo::Registered(site) | SiteInfo::Request(site) => site,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_preferred() {
        let registry = ConfiguredSite::from(&SiteSettings {
            name: "Example".into(),
            domain: "example.com".into(),
        });
        let info = SiteInfo::resolve(Some(&registry), &RequestMeta::new("other.test"));
        assert!(matches!(info, SiteInfo::Registered(_)));
        assert_eq!(info.site().name, "Example");
    }

    #[test]
    fn request_host_is_the_fallback() {
        let info = SiteInfo::resolve(None, &RequestMeta::new("testserver:8000"));
        assert!(matches!(info, SiteInfo::Request(_)));
        assert_eq!(info.site().domain, "testserver:8000");
        assert_eq!(info.site().name, "testserver:8000");
    }
}
