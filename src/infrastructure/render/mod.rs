//! HTML rendering collaborator - tri-fold mailer pages and the merged batch file

mod assets;
mod format;
mod html;
mod template;

pub use assets::{image_to_data_uri, MailerAssets};
pub use html::{HtmlMailerRenderer, DEFAULT_BRAND, INDIVIDUAL_DIR, MERGED_FILE};
pub use template::{escape_html, MailerTemplate, TemplateError, TemplateVariable};
