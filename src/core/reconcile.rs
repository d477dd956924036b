use crate::core::diff::{descriptions_equivalent, rules_equivalent};
use crate::core::tenant::resolve_tenant;
use crate::core::validate::RuleValidator;
use crate::domain::model::{
    Action, CreateSecurityGroup, DesiredState, ReconciliationOutcome, SecurityGroupRequest,
};
use crate::domain::ports::WaldurApi;
use crate::utils::error::{ProvisionError, Result};

/// Converges the remote security group to the requested state and reports
/// whether anything changed. One remote read, then at most the minimal set
/// of mutating calls. Mutations already issued are never rolled back.
pub async fn reconcile<A: WaldurApi>(
    api: &A,
    request: &SecurityGroupRequest,
) -> Result<ReconciliationOutcome> {
    let tenant = match &request.tenant {
        Some(tenant) => tenant.clone(),
        None => match &request.waldur_resource {
            Some(resource) => resolve_tenant(api, resource).await?,
            None => return Err(ProvisionError::TenantRequired),
        },
    };

    // Validate everything up front; the first bad rule aborts before any
    // remote state is touched.
    let validator = RuleValidator::new(api, &tenant);
    let mut rules = Vec::with_capacity(request.rules.len());
    for raw in &request.rules {
        rules.push(validator.validate(raw).await?);
    }

    let existing = api.get_security_group(&tenant, &request.name).await?;
    tracing::debug!(
        "Security group {} in tenant {}: {}",
        request.name,
        tenant,
        if existing.is_some() { "found" } else { "absent" }
    );

    match (request.state, existing) {
        (DesiredState::Absent, None) => Ok(ReconciliationOutcome::unchanged()),
        (DesiredState::Absent, Some(group)) => {
            tracing::info!("Deleting security group {}", request.name);
            api.delete_security_group(&group.uuid).await?;
            Ok(ReconciliationOutcome::changed(Action::Deleted))
        }
        (DesiredState::Present, None) => {
            tracing::info!(
                "Creating security group {} with {} rules",
                request.name,
                rules.len()
            );
            let create = CreateSecurityGroup {
                project: request.project.as_deref(),
                tenant: &tenant,
                name: &request.name,
                description: &request.description,
                rules: &rules,
                tags: request.tags.as_deref(),
                wait: request.wait,
            };
            api.create_security_group(&create).await?;
            Ok(ReconciliationOutcome::changed(Action::Created))
        }
        (DesiredState::Present, Some(group)) => {
            let description_converged =
                descriptions_equivalent(&group.description, &request.description);
            let rules_converged = rules_equivalent(&rules, &group.rules);

            if description_converged && rules_converged {
                return Ok(ReconciliationOutcome::unchanged());
            }

            if !description_converged {
                tracing::info!("Updating description of security group {}", request.name);
                api.update_security_group_description(&group, &request.description)
                    .await?;
            }
            if !rules_converged {
                tracing::info!("Updating rules of security group {}", request.name);
                api.update_security_group_rules(&group, &rules).await?;
            }

            Ok(ReconciliationOutcome::changed(Action::Updated))
        }
    }
}
