//! Link lifecycle between MAAT applications and common platform cases.
//!
//! A link is created only after the ordered validation chain passes, and every row it writes
//! (work-queue case and core rows, the link itself, solicitor, defendant, sessions, offences)
//! commits in the same store transaction. Unlinking never deletes: it stamps the active link
//! with a removal transaction id.

pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use router::link_router;
pub use service::{LinkOutcome, LinkService, UnlinkOutcome};
pub use validation::{validate_link, ValidatedLink};
