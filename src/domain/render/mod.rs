//! Rendering collaborator contract - one document per client, merged per batch

mod document;
mod renderer;

pub use document::{MailerDocument, SaleLine, DEFAULT_GREETING_NAME};
pub use renderer::{MailerRenderer, RenderedMailer};

#[cfg(test)]
pub use renderer::mock::MockRenderer;
