use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("A rule must contain the {field} parameter")]
    MissingField { field: &'static str },

    #[error("Either cidr or remote_group must be specified, not both")]
    ConflictingTarget,

    #[error("Either cidr or remote_group must be specified")]
    MissingTarget,

    #[error("Invalid {ethertype} address {address}: {source}")]
    InvalidAddress {
        ethertype: &'static str,
        address: String,
        source: ipnetwork::IpNetworkError,
    },

    #[error("Invalid ethertype: {value}")]
    InvalidEthertype { value: String },

    #[error("Invalid direction {value}, expected ingress or egress")]
    InvalidDirection { value: String },

    #[error("Tenant or waldur_resource must be specified")]
    TenantRequired,

    #[error("Unable to resolve tenant from marketplace resource {resource}: {reason}")]
    TenantUnresolvable { resource: String, reason: String },

    #[error("Security group {name} was not found in tenant {tenant}")]
    RemoteGroupNotFound { tenant: String, name: String },

    #[error("API returned status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Resource did not become ready within {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Provisioning failed: {message}")]
    Provisioning { message: String },

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value {value} for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfig { field: String },
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
