pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::waldur::WaldurClient;
pub use config::{CliConfig, Command};
pub use core::reconcile::reconcile;
pub use domain::model::{ReconciliationOutcome, SecurityGroupRequest};
pub use domain::ports::WaldurApi;
pub use utils::error::{ProvisionError, Result};
