use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ethertype {
    IPv4,
    IPv6,
}

impl Ethertype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ethertype::IPv4 => "IPv4",
            Ethertype::IPv6 => "IPv6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ingress,
    Egress,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        }
    }
}

/// A rule points either at an address range or at another security group,
/// never at both. Ethertype only makes sense for address targets, so it
/// lives inside the Cidr variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
    Cidr { cidr: String, ethertype: Ethertype },
    RemoteGroup { url: String },
}

/// A validated, normalized security group rule. Port -1 means "all ports"
/// (used for ICMP).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub from_port: i32,
    pub to_port: i32,
    pub protocol: String,
    pub direction: Direction,
    pub target: RuleTarget,
}

impl RuleSpec {
    /// Projects the rule onto the flat field set used both for comparison
    /// against remote rules and as the wire payload.
    pub fn record(&self) -> RuleRecord {
        let mut record = RuleRecord {
            from_port: Some(self.from_port),
            to_port: Some(self.to_port),
            protocol: Some(self.protocol.clone()),
            direction: Some(self.direction.as_str().to_string()),
            ..RuleRecord::default()
        };
        match &self.target {
            RuleTarget::Cidr { cidr, ethertype } => {
                record.cidr = Some(cidr.clone());
                record.ethertype = Some(ethertype.as_str().to_string());
            }
            RuleTarget::RemoteGroup { url } => {
                record.remote_group = Some(url.clone());
            }
        }
        record
    }
}

/// A raw rule mapping as given by the caller. Fields are all optional here;
/// normalization into a RuleSpec is where requiredness and defaults apply.
/// The input is never rewritten in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRule {
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub protocol: Option<String>,
    pub cidr: Option<String>,
    pub remote_group: Option<String>,
    pub ethertype: Option<String>,
    pub direction: Option<String>,
}

/// The comparable/serializable view of a rule, restricted to the fields the
/// reconciliation cares about. Remote rules may carry extra fields; serde
/// drops them on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethertype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_group: Option<String>,
}

impl RuleRecord {
    /// Masks the fields that are meaningless for the given desired target
    /// before comparison: a remote-group rule ignores cidr and ethertype on
    /// the remote side, a cidr rule ignores remote_group.
    pub fn masked_for(&self, target: &RuleTarget) -> RuleRecord {
        let mut masked = self.clone();
        match target {
            RuleTarget::RemoteGroup { .. } => {
                masked.cidr = None;
                masked.ethertype = None;
            }
            RuleTarget::Cidr { .. } => {
                masked.remote_group = None;
            }
        }
        masked
    }
}

/// Remote state of a security group. Absence of the group is represented by
/// Option::None at the call site, not by an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSecurityGroup {
    pub uuid: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceResource {
    pub scope: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScopeRecord {
    pub uuid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub wait: bool,
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            wait: true,
            interval_secs: 20,
            timeout_secs: 600,
        }
    }
}

/// Desired state of one security group, as handed to the controller.
#[derive(Debug, Clone)]
pub struct SecurityGroupRequest {
    pub tenant: Option<String>,
    pub waldur_resource: Option<String>,
    pub project: Option<String>,
    pub name: String,
    pub description: String,
    pub rules: Vec<RawRule>,
    pub state: DesiredState,
    pub tags: Option<Vec<String>>,
    pub wait: WaitOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    None,
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconciliationOutcome {
    pub changed: bool,
    pub action: Action,
}

impl ReconciliationOutcome {
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            action: Action::None,
        }
    }

    pub fn changed(action: Action) -> Self {
        Self {
            changed: true,
            action,
        }
    }
}

/// Parameters forwarded verbatim to the create call.
#[derive(Debug, Clone, Copy)]
pub struct CreateSecurityGroup<'a> {
    pub project: Option<&'a str>,
    pub tenant: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub rules: &'a [RuleSpec],
    pub tags: Option<&'a [String]>,
    pub wait: WaitOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIpAssignment {
    pub address: String,
    pub subnet: String,
}

#[derive(Debug, Clone, Copy)]
pub struct AssignFloatingIps<'a> {
    pub instance: &'a str,
    pub floating_ips: &'a [FloatingIpAssignment],
    pub wait: WaitOptions,
}
