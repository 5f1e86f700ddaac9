//! Portal navigation and extraction machinery
//!
//! This module drives the filing-access portal's fixed navigation sequence
//! and pulls structured data out of its pages:
//! - [`state`]: the guarded navigation state machine
//! - [`session`]: PortalSession, the step-level navigation driver
//! - [`locate`]: named selector strategies for unversioned markup
//! - [`form`]: criteria form filling
//! - [`paginate`]: page-bounded results walking
//! - [`documents`]: detail-view document harvesting

pub mod documents;
pub mod form;
pub mod locate;
pub mod paginate;
pub mod session;
pub mod state;

pub use documents::{DocumentExtractor, classify_documents};
pub use form::CriteriaFormFiller;
pub use locate::Locator;
pub use paginate::{LiveResultsPage, PageHarvest, ResultsPage, paginate};
pub use session::PortalSession;
pub use state::PortalStep;
