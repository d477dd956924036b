use crate::core::floating_ip::FloatingIpRequest;
use crate::domain::model::{
    DesiredState, FloatingIpAssignment, RawRule, SecurityGroupRequest, WaitOptions,
};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "waldur-provision")]
#[command(about = "Declarative provisioning of OpenStack resources via the Waldur API")]
pub struct CliConfig {
    #[arg(long, env = "WALDUR_API_URL", help = "Fully qualified Waldur API URL")]
    pub api_url: String,

    #[arg(long, env = "WALDUR_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Converge an OpenStack tenant security group to the desired state
    SecurityGroup(SecurityGroupArgs),
    /// Assign floating IPs to an OpenStack instance
    FloatingIp(FloatingIpArgs),
}

#[derive(Debug, Args)]
pub struct SecurityGroupArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, help = "Name of the tenant owning the security group")]
    pub tenant: Option<String>,

    #[arg(
        long,
        help = "Marketplace resource UUID to resolve the tenant from, if --tenant is not given"
    )]
    pub waldur_resource: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, help = "Path to a JSON file holding the desired rule list")]
    pub rules: Option<PathBuf>,

    #[arg(long, default_value = "present", value_parser = parse_state)]
    pub state: DesiredState,

    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Debug, Args)]
pub struct FloatingIpArgs {
    #[arg(long)]
    pub instance: String,

    #[arg(
        long = "floating-ip",
        value_parser = parse_assignment,
        help = "Floating IP as ADDRESS,SUBNET; repeatable"
    )]
    pub floating_ips: Vec<FloatingIpAssignment>,

    #[arg(long, default_value = "present", value_parser = parse_state)]
    pub state: DesiredState,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    #[arg(long, help = "Do not wait for provisioning to finish")]
    pub no_wait: bool,

    #[arg(long, default_value_t = 600, help = "Provisioning wait deadline in seconds")]
    pub timeout: u64,

    #[arg(long, default_value_t = 20, help = "State polling interval in seconds")]
    pub interval: u64,
}

impl WaitArgs {
    pub fn options(&self) -> WaitOptions {
        WaitOptions {
            wait: !self.no_wait,
            interval_secs: self.interval,
            timeout_secs: self.timeout,
        }
    }
}

fn parse_state(value: &str) -> std::result::Result<DesiredState, String> {
    match value {
        "present" => Ok(DesiredState::Present),
        "absent" => Ok(DesiredState::Absent),
        other => Err(format!("expected present or absent, got {}", other)),
    }
}

fn parse_assignment(value: &str) -> std::result::Result<FloatingIpAssignment, String> {
    match value.split_once(',') {
        Some((address, subnet)) if !address.is_empty() && !subnet.is_empty() => {
            Ok(FloatingIpAssignment {
                address: address.to_string(),
                subnet: subnet.to_string(),
            })
        }
        _ => Err(format!("expected ADDRESS,SUBNET, got {}", value)),
    }
}

/// Reads the desired rule set from a JSON file containing an array of rule
/// mappings. Missing file or malformed JSON aborts the run.
pub fn load_rules(path: &Path) -> Result<Vec<RawRule>> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

impl SecurityGroupArgs {
    pub fn to_request(&self) -> Result<SecurityGroupRequest> {
        let rules = match &self.rules {
            Some(path) => load_rules(path)?,
            None => vec![],
        };
        Ok(SecurityGroupRequest {
            tenant: self.tenant.clone(),
            waldur_resource: self.waldur_resource.clone(),
            project: self.project.clone(),
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            rules,
            state: self.state,
            tags: self.tags.clone(),
            wait: self.wait.options(),
        })
    }
}

impl FloatingIpArgs {
    pub fn to_request(&self) -> FloatingIpRequest {
        FloatingIpRequest {
            instance: self.instance.clone(),
            floating_ips: self.floating_ips.clone(),
            state: self.state,
            wait: self.wait.options(),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_url", &self.api_url)?;
        validate_non_empty_string("access_token", &self.access_token)?;
        match &self.command {
            Command::SecurityGroup(args) => {
                validate_non_empty_string("name", &args.name)?;
                validate_positive_number("interval", args.wait.interval, 1)?;
                validate_positive_number("timeout", args.wait.timeout, 1)?;
            }
            Command::FloatingIp(args) => {
                validate_non_empty_string("instance", &args.instance)?;
                validate_positive_number("interval", args.wait.interval, 1)?;
                validate_positive_number("timeout", args.wait.timeout, 1)?;
            }
        }
        Ok(())
    }
}
