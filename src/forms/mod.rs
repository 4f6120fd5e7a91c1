//! Contact and resume-request forms relayed to a third-party service

mod relay;
mod session;

pub use relay::{ContactForm, FormFields, FormRelay, RelayError, RelayReply, ResumeRequest};
pub use session::{AlreadyPending, FormSession, FormStatus};
