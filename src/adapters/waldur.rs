use crate::domain::model::{
    AssignFloatingIps, CreateSecurityGroup, MarketplaceResource, RemoteSecurityGroup, RuleRecord,
    RuleSpec, ScopeRecord, WaitOptions,
};
use crate::domain::ports::WaldurApi;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Reqwest-backed Waldur API client. Requests are issued sequentially; the
/// only suspension point is the bounded polling loop used while waiting for
/// a freshly created resource to become ready.
pub struct WaldurClient {
    client: Client,
    api_url: String,
    access_token: String,
}

impl WaldurClient {
    pub fn new(api_url: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.access_token)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ProvisionError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        let response = self.check(response).await?;
        Ok(response.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await?;
        let response = self.check(response).await?;
        Ok(response.json().await?)
    }

    /// Polls the resource at `url` until its reported state is OK. An Erred
    /// state fails immediately; passing the deadline fails with Timeout.
    async fn wait_until_ready(&self, url: &str, wait: WaitOptions) -> Result<()> {
        if !wait.wait {
            return Ok(());
        }

        let deadline = tokio::time::Instant::now() + Duration::from_secs(wait.timeout_secs);
        loop {
            let resource: serde_json::Value = self.get_json(url).await?;
            match resource.get("state").and_then(|s| s.as_str()) {
                Some("OK") => return Ok(()),
                Some("Erred") => {
                    return Err(ProvisionError::Provisioning {
                        message: format!("resource at {} entered state Erred", url),
                    })
                }
                other => {
                    tracing::debug!("Resource at {} still in state {:?}", url, other);
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ProvisionError::Timeout {
                    seconds: wait.timeout_secs,
                });
            }
            tokio::time::sleep(Duration::from_secs(wait.interval_secs)).await;
        }
    }
}

fn wire_rules(rules: &[RuleSpec]) -> Vec<RuleRecord> {
    rules.iter().map(|r| r.record()).collect()
}

#[async_trait]
impl WaldurApi for WaldurClient {
    async fn get_security_group(
        &self,
        tenant: &str,
        name: &str,
    ) -> Result<Option<RemoteSecurityGroup>> {
        let response = self
            .client
            .get(self.endpoint("openstack-security-groups/"))
            .query(&[("tenant_uuid", tenant), ("name_exact", name)])
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        let response = self.check(response).await?;
        let mut groups: Vec<RemoteSecurityGroup> = response.json().await?;
        if groups.is_empty() {
            Ok(None)
        } else {
            Ok(Some(groups.remove(0)))
        }
    }

    async fn create_security_group(
        &self,
        request: &CreateSecurityGroup<'_>,
    ) -> Result<RemoteSecurityGroup> {
        let url = self.endpoint(&format!(
            "openstack-tenants/{}/create_security_group/",
            request.tenant
        ));
        let mut body = serde_json::json!({
            "name": request.name,
            "description": request.description,
            "rules": wire_rules(request.rules),
        });
        if let Some(project) = request.project {
            body["project"] = serde_json::Value::String(project.to_string());
        }
        if let Some(tags) = request.tags {
            body["tags"] = serde_json::json!(tags);
        }

        let group: RemoteSecurityGroup = self.post_json(&url, &body).await?;
        self.wait_until_ready(&group.url, request.wait).await?;
        Ok(group)
    }

    async fn update_security_group_description(
        &self,
        group: &RemoteSecurityGroup,
        description: &str,
    ) -> Result<()> {
        let url = self.endpoint(&format!("openstack-security-groups/{}/", group.uuid));
        let response = self
            .client
            .put(&url)
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "description": description }))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn update_security_group_rules(
        &self,
        group: &RemoteSecurityGroup,
        rules: &[RuleSpec],
    ) -> Result<()> {
        let url = self.endpoint(&format!(
            "openstack-security-groups/{}/set_rules/",
            group.uuid
        ));
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&wire_rules(rules))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn delete_security_group(&self, uuid: &str) -> Result<()> {
        let url = self.endpoint(&format!("openstack-security-groups/{}/", uuid));
        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn get_marketplace_resource(&self, uuid: &str) -> Result<MarketplaceResource> {
        let url = self.endpoint(&format!("marketplace-resources/{}/", uuid));
        self.get_json(&url).await
    }

    async fn get_scope(&self, url: &str) -> Result<ScopeRecord> {
        self.get_json(url).await
    }

    async fn assign_floating_ips(
        &self,
        request: &AssignFloatingIps<'_>,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint(&format!(
            "openstack-instances/{}/update_floating_ips/",
            request.instance
        ));
        let body = serde_json::json!({ "floating_ips": request.floating_ips });
        let response: serde_json::Value = self.post_json(&url, &body).await?;

        let instance_url = self.endpoint(&format!("openstack-instances/{}/", request.instance));
        self.wait_until_ready(&instance_url, request.wait).await?;
        Ok(response)
    }
}
