use crate::domain::model::{AssignFloatingIps, DesiredState, FloatingIpAssignment, WaitOptions};
use crate::domain::ports::WaldurApi;
use crate::utils::error::{ProvisionError, Result};

/// Desired floating-IP assignment for one instance. Unlike security groups
/// there is no diffing here; the API call itself is idempotent on the remote
/// side and the full desired list is sent every time.
#[derive(Debug, Clone)]
pub struct FloatingIpRequest {
    pub instance: String,
    pub floating_ips: Vec<FloatingIpAssignment>,
    pub state: DesiredState,
    pub wait: WaitOptions,
}

pub async fn assign<A: WaldurApi>(
    api: &A,
    request: &FloatingIpRequest,
) -> Result<serde_json::Value> {
    let floating_ips: &[FloatingIpAssignment] = match request.state {
        DesiredState::Present => {
            if request.floating_ips.is_empty() {
                return Err(ProvisionError::MissingConfig {
                    field: "floating_ip".to_string(),
                });
            }
            &request.floating_ips
        }
        // Absent detaches everything by assigning an empty list.
        DesiredState::Absent => &[],
    };

    tracing::info!(
        "Assigning {} floating IPs to instance {}",
        floating_ips.len(),
        request.instance
    );

    api.assign_floating_ips(&AssignFloatingIps {
        instance: &request.instance,
        floating_ips,
        wait: request.wait,
    })
    .await
}
