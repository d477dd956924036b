use crate::domain::model::{Direction, Ethertype, RawRule, RuleSpec, RuleTarget};
use crate::domain::ports::WaldurApi;
use crate::utils::error::{ProvisionError, Result};
use ipnetwork::{Ipv4Network, Ipv6Network};

/// Validates raw rule mappings and normalizes them into RuleSpec values.
/// Validation is fail-fast: the first invalid rule aborts the whole run,
/// before any mutating call is issued.
pub struct RuleValidator<'a, A: WaldurApi> {
    api: &'a A,
    tenant: &'a str,
}

impl<'a, A: WaldurApi> RuleValidator<'a, A> {
    pub fn new(api: &'a A, tenant: &'a str) -> Self {
        Self { api, tenant }
    }

    pub async fn validate(&self, raw: &RawRule) -> Result<RuleSpec> {
        let from_port = raw
            .from_port
            .ok_or(ProvisionError::MissingField { field: "from_port" })?;
        let to_port = raw
            .to_port
            .ok_or(ProvisionError::MissingField { field: "to_port" })?;
        let protocol = raw
            .protocol
            .clone()
            .ok_or(ProvisionError::MissingField { field: "protocol" })?;

        if raw.cidr.is_some() && raw.remote_group.is_some() {
            return Err(ProvisionError::ConflictingTarget);
        }

        let target = if let Some(remote_group) = &raw.remote_group {
            let url = self.resolve_remote_group(remote_group).await?;
            RuleTarget::RemoteGroup { url }
        } else if let Some(cidr) = &raw.cidr {
            let ethertype = validate_cidr(cidr, raw.ethertype.as_deref())?;
            RuleTarget::Cidr {
                cidr: cidr.clone(),
                ethertype,
            }
        } else {
            return Err(ProvisionError::MissingTarget);
        };

        let direction = match raw.direction.as_deref() {
            None => Direction::Ingress,
            Some("ingress") => Direction::Ingress,
            Some("egress") => Direction::Egress,
            Some(other) => {
                return Err(ProvisionError::InvalidDirection {
                    value: other.to_string(),
                })
            }
        };

        Ok(RuleSpec {
            from_port,
            to_port,
            protocol,
            direction,
            target,
        })
    }

    async fn resolve_remote_group(&self, name: &str) -> Result<String> {
        let group = self.api.get_security_group(self.tenant, name).await?;
        match group {
            Some(group) => Ok(group.url),
            None => Err(ProvisionError::RemoteGroupNotFound {
                tenant: self.tenant.to_string(),
                name: name.to_string(),
            }),
        }
    }
}

/// Checks the cidr against the declared ethertype, defaulting to IPv4 when
/// the ethertype is absent.
fn validate_cidr(cidr: &str, ethertype: Option<&str>) -> Result<Ethertype> {
    match ethertype {
        None | Some("IPv4") => match cidr.parse::<Ipv4Network>() {
            Ok(_) => Ok(Ethertype::IPv4),
            Err(source) => Err(ProvisionError::InvalidAddress {
                ethertype: "IPv4",
                address: cidr.to_string(),
                source,
            }),
        },
        Some("IPv6") => match cidr.parse::<Ipv6Network>() {
            Ok(_) => Ok(Ethertype::IPv6),
            Err(source) => Err(ProvisionError::InvalidAddress {
                ethertype: "IPv6",
                address: cidr.to_string(),
                source,
            }),
        },
        Some(other) => Err(ProvisionError::InvalidEthertype {
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AssignFloatingIps, CreateSecurityGroup, MarketplaceResource, RemoteSecurityGroup,
        ScopeRecord,
    };
    use async_trait::async_trait;

    /// Stub API that only knows a fixed set of security groups by name.
    struct StubApi {
        groups: Vec<RemoteSecurityGroup>,
    }

    impl StubApi {
        fn empty() -> Self {
            Self { groups: vec![] }
        }

        fn with_group(name: &str, url: &str) -> Self {
            Self {
                groups: vec![RemoteSecurityGroup {
                    uuid: format!("{}-uuid", name),
                    url: url.to_string(),
                    description: String::new(),
                    rules: vec![],
                }],
            }
        }
    }

    #[async_trait]
    impl WaldurApi for StubApi {
        async fn get_security_group(
            &self,
            _tenant: &str,
            name: &str,
        ) -> Result<Option<RemoteSecurityGroup>> {
            Ok(self
                .groups
                .iter()
                .find(|g| g.uuid == format!("{}-uuid", name))
                .cloned())
        }

        async fn create_security_group(
            &self,
            _request: &CreateSecurityGroup<'_>,
        ) -> Result<RemoteSecurityGroup> {
            unreachable!("validation must not create groups")
        }

        async fn update_security_group_description(
            &self,
            _group: &RemoteSecurityGroup,
            _description: &str,
        ) -> Result<()> {
            unreachable!("validation must not update groups")
        }

        async fn update_security_group_rules(
            &self,
            _group: &RemoteSecurityGroup,
            _rules: &[RuleSpec],
        ) -> Result<()> {
            unreachable!("validation must not update groups")
        }

        async fn delete_security_group(&self, _uuid: &str) -> Result<()> {
            unreachable!("validation must not delete groups")
        }

        async fn get_marketplace_resource(&self, _uuid: &str) -> Result<MarketplaceResource> {
            unreachable!("validation must not touch marketplace resources")
        }

        async fn get_scope(&self, _url: &str) -> Result<ScopeRecord> {
            unreachable!("validation must not dereference scopes")
        }

        async fn assign_floating_ips(
            &self,
            _request: &AssignFloatingIps<'_>,
        ) -> Result<serde_json::Value> {
            unreachable!("validation must not assign floating IPs")
        }
    }

    fn raw_cidr_rule(cidr: &str) -> RawRule {
        RawRule {
            from_port: Some(80),
            to_port: Some(80),
            protocol: Some("tcp".to_string()),
            cidr: Some(cidr.to_string()),
            ..RawRule::default()
        }
    }

    #[tokio::test]
    async fn test_defaults_applied_to_minimal_cidr_rule() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");

        let spec = validator.validate(&raw_cidr_rule("0.0.0.0/0")).await.unwrap();

        assert_eq!(spec.from_port, 80);
        assert_eq!(spec.to_port, 80);
        assert_eq!(spec.protocol, "tcp");
        assert_eq!(spec.direction, Direction::Ingress);
        assert_eq!(
            spec.target,
            RuleTarget::Cidr {
                cidr: "0.0.0.0/0".to_string(),
                ethertype: Ethertype::IPv4,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_protocol_fails() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let raw = RawRule {
            from_port: Some(80),
            to_port: Some(80),
            cidr: Some("0.0.0.0/0".to_string()),
            ..RawRule::default()
        };

        let err = validator.validate(&raw).await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::MissingField { field: "protocol" }
        ));
    }

    #[tokio::test]
    async fn test_both_targets_fail() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let mut raw = raw_cidr_rule("0.0.0.0/0");
        raw.remote_group = Some("web".to_string());

        let err = validator.validate(&raw).await.unwrap_err();
        assert!(matches!(err, ProvisionError::ConflictingTarget));
    }

    #[tokio::test]
    async fn test_no_target_fails() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let raw = RawRule {
            from_port: Some(80),
            to_port: Some(80),
            protocol: Some("tcp".to_string()),
            ..RawRule::default()
        };

        let err = validator.validate(&raw).await.unwrap_err();
        assert!(matches!(err, ProvisionError::MissingTarget));
    }

    #[tokio::test]
    async fn test_invalid_ipv4_address_fails() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");

        let err = validator
            .validate(&raw_cidr_rule("999.1.1.1/33"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_ipv6_cidr_with_ipv6_ethertype() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let mut raw = raw_cidr_rule("2002::/16");
        raw.ethertype = Some("IPv6".to_string());

        let spec = validator.validate(&raw).await.unwrap();
        assert_eq!(
            spec.target,
            RuleTarget::Cidr {
                cidr: "2002::/16".to_string(),
                ethertype: Ethertype::IPv6,
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_ethertype_fails() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let mut raw = raw_cidr_rule("0.0.0.0/0");
        raw.ethertype = Some("IPv5".to_string());

        let err = validator.validate(&raw).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidEthertype { .. }));
    }

    #[tokio::test]
    async fn test_unknown_direction_fails() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let mut raw = raw_cidr_rule("0.0.0.0/0");
        raw.direction = Some("sideways".to_string());

        let err = validator.validate(&raw).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidDirection { .. }));
    }

    #[tokio::test]
    async fn test_egress_direction_is_accepted() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let mut raw = raw_cidr_rule("0.0.0.0/0");
        raw.direction = Some("egress".to_string());

        let spec = validator.validate(&raw).await.unwrap();
        assert_eq!(spec.direction, Direction::Egress);
    }

    #[tokio::test]
    async fn test_remote_group_resolves_to_url() {
        let api = StubApi::with_group("web", "https://api.example.com/groups/web/");
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let raw = RawRule {
            from_port: Some(80),
            to_port: Some(80),
            protocol: Some("tcp".to_string()),
            remote_group: Some("web".to_string()),
            ..RawRule::default()
        };

        let spec = validator.validate(&raw).await.unwrap();
        assert_eq!(
            spec.target,
            RuleTarget::RemoteGroup {
                url: "https://api.example.com/groups/web/".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_remote_group_fails() {
        let api = StubApi::empty();
        let validator = RuleValidator::new(&api, "tenant-uuid");
        let raw = RawRule {
            from_port: Some(80),
            to_port: Some(80),
            protocol: Some("tcp".to_string()),
            remote_group: Some("missing".to_string()),
            ..RawRule::default()
        };

        let err = validator.validate(&raw).await.unwrap_err();
        assert!(matches!(err, ProvisionError::RemoteGroupNotFound { .. }));
    }
}
