use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::domain::{RequestMeta, Submission};

use super::site::SiteInfo;

/// Contributes ambient variables to every rendering context.
pub type ContextProcessor = Arc<dyn Fn(&RequestMeta) -> Map<String, Value> + Send + Sync>;

/// Exposes the originating request as `request`.
pub fn request_processor() -> ContextProcessor {
    Arc::new(|request: &RequestMeta| {
        let mut vars = Map::new();
        vars.insert(
            "request".to_string(),
            json!({
                "host": request.host,
                "secure": request.secure,
                "referrer": request.referrer,
                "remote_addr": request.remote_addr,
                "user_agent": request.user_agent,
            }),
        );
        vars
    })
}

/// Exposes the render time as `now` (RFC 3339, UTC).
pub fn timestamp_processor() -> ContextProcessor {
    Arc::new(|_: &RequestMeta| {
        let mut vars = Map::new();
        vars.insert("now".to_string(), Value::String(Utc::now().to_rfc3339()));
        vars
    })
}

/// Processor output first, then `site`, then the submitted fields, so
/// form values shadow ambient variables of the same name.
pub(crate) fn build_context(
    processors: &[ContextProcessor],
    request: &RequestMeta,
    site: &SiteInfo,
    submission: &Submission,
) -> Value {
    let mut context = Map::new();
    for processor in processors {
        context.extend(processor(request));
    }
    context.insert("site".to_string(), json!(site.site()));
    context.insert("name".to_string(), json!(submission.name));
    context.insert("email".to_string(), json!(submission.email));
    context.insert("body".to_string(), json!(submission.body));
    Value::Object(context)
}
