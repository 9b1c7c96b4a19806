pub mod email;

pub use email::{EmailKind, EmailMessage, EmailRenderer, RenderError};
