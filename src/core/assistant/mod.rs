pub mod assistant_models;
pub mod assistant_ports;
pub mod assistant_service;
pub mod extraction;
pub mod prompts;

pub use assistant_models::{AssistantReply, AssistantRequest, DriveFile};
pub use assistant_ports::{DriveStore, OAuthProvider, UsageSheet};
pub use assistant_service::{AssistantError, AssistantService, AssistantSettings, RequestHandler};

#[cfg(test)]
pub(crate) mod test_support;
