//! Validated value types shared by the credential and API layers.

mod scope;
mod service_url;

pub use scope::ScopeSet;
pub use service_url::ServiceUrl;
