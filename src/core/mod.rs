pub mod diff;
pub mod floating_ip;
pub mod reconcile;
pub mod tenant;
pub mod validate;

pub use crate::domain::model::{ReconciliationOutcome, SecurityGroupRequest};
pub use crate::domain::ports::WaldurApi;
pub use crate::utils::error::Result;
