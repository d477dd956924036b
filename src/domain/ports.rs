use crate::domain::model::{
    AssignFloatingIps, CreateSecurityGroup, MarketplaceResource, RemoteSecurityGroup, RuleSpec,
    ScopeRecord,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Operations the reconciliation core needs from the resource-management API.
/// The reqwest client in adapters implements this; tests substitute mocks.
#[async_trait]
pub trait WaldurApi: Send + Sync {
    /// Looks up a security group by tenant and name. A missing group is a
    /// normal outcome, not an error. Also serves as the lookup for
    /// remote_group rule targets (the validator takes the group's URL).
    async fn get_security_group(
        &self,
        tenant: &str,
        name: &str,
    ) -> Result<Option<RemoteSecurityGroup>>;

    /// Creates a security group, optionally blocking until the resource is
    /// ready per the request's wait options.
    async fn create_security_group(
        &self,
        request: &CreateSecurityGroup<'_>,
    ) -> Result<RemoteSecurityGroup>;

    async fn update_security_group_description(
        &self,
        group: &RemoteSecurityGroup,
        description: &str,
    ) -> Result<()>;

    async fn update_security_group_rules(
        &self,
        group: &RemoteSecurityGroup,
        rules: &[RuleSpec],
    ) -> Result<()>;

    async fn delete_security_group(&self, uuid: &str) -> Result<()>;

    async fn get_marketplace_resource(&self, uuid: &str) -> Result<MarketplaceResource>;

    /// Dereferences a scope URL returned inside a marketplace resource.
    async fn get_scope(&self, url: &str) -> Result<ScopeRecord>;

    async fn assign_floating_ips(
        &self,
        request: &AssignFloatingIps<'_>,
    ) -> Result<serde_json::Value>;
}
