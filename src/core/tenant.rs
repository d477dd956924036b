use crate::domain::ports::WaldurApi;
use crate::utils::error::{ProvisionError, Result};

/// Resolves a marketplace resource reference to the UUID of the tenant it
/// provisions: fetch the resource record, follow its scope URL, take the
/// scope's UUID. Any failure along the way, including records missing the
/// expected fields, surfaces as TenantUnresolvable.
pub async fn resolve_tenant<A: WaldurApi>(api: &A, resource: &str) -> Result<String> {
    let record = api
        .get_marketplace_resource(resource)
        .await
        .map_err(|e| unresolvable(resource, e))?;

    let scope = api
        .get_scope(&record.scope)
        .await
        .map_err(|e| unresolvable(resource, e))?;

    Ok(scope.uuid)
}

fn unresolvable(resource: &str, cause: ProvisionError) -> ProvisionError {
    ProvisionError::TenantUnresolvable {
        resource: resource.to_string(),
        reason: cause.to_string(),
    }
}
