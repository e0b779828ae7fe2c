pub mod message;
pub mod request;
pub mod types;

pub use message::MessageParts;
pub use request::RequestMeta;
pub use types::{ClassificationRequest, FormData, Submission, Verdict};
