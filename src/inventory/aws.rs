//! AWS EC2 inventory through the `aws` CLI.
//!
//! Lists the VPCs of a region (default or custom ones) and the subnets of
//! each VPC, in the order the CLI returns them.

use super::{cli, InventorySource};
use crate::config::MAX_CONCURRENT_QUERIES;
use crate::models::SubnetObservation;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::error::Error;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Vpc {
    pub vpc_id: String,
    #[serde(default)]
    pub cidr_block: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Ipv6CidrBlockAssociation {
    pub ipv6_cidr_block: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Subnet {
    pub subnet_id: String,
    pub vpc_id: String,
    /// Absent on IPv6-only subnets.
    #[serde(default)]
    pub cidr_block: Option<String>,
    #[serde(default)]
    pub ipv6_cidr_block_association_set: Vec<Ipv6CidrBlockAssociation>,
    pub available_ip_address_count: u64,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Subnet {
    /// Value of the `Name` tag; the last one wins when repeated.
    pub fn name(&self) -> Option<&str> {
        self.tags
            .iter()
            .filter(|t| t.key == "Name")
            .map(|t| t.value.as_str())
            .last()
    }

    /// IPv4 block, or the first IPv6 block for IPv6-only subnets.
    pub fn block(&self) -> Option<&str> {
        self.cidr_block.as_deref().or_else(|| {
            self.ipv6_cidr_block_association_set
                .first()
                .map(|a| a.ipv6_cidr_block.as_str())
        })
    }
}

impl From<Subnet> for SubnetObservation {
    fn from(subnet: Subnet) -> Self {
        SubnetObservation {
            label: subnet.name().map(str::to_string),
            cidr_block: subnet.block().unwrap_or_default().to_string(),
            available: subnet.available_ip_address_count,
            network_id: subnet.vpc_id,
            subnet_id: subnet.subnet_id,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DescribeVpcs {
    vpcs: Vec<Vpc>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DescribeSubnets {
    subnets: Vec<Subnet>,
}

/// Deserialize CLI output, reporting the JSON path of the first bad field.
fn parse_json<T: DeserializeOwned>(what: &str, output: &str) -> Result<T, Box<dyn Error>> {
    let mut deserializer = serde_json::Deserializer::from_str(output);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| -> Box<dyn Error> {
        log::debug!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", output);
        format!("Error parsing {what} JSON: path={} error={}", e.path(), e).into()
    })
}

pub fn parse_vpcs(output: &str) -> Result<Vec<Vpc>, Box<dyn Error>> {
    Ok(parse_json::<DescribeVpcs>("describe-vpcs", output)?.vpcs)
}

pub fn parse_subnets(output: &str) -> Result<Vec<Subnet>, Box<dyn Error>> {
    Ok(parse_json::<DescribeSubnets>("describe-subnets", output)?.subnets)
}

/// Runs one provider CLI command and returns its stdout.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, Box<dyn Error>>;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsCli;

impl CommandRunner for AwsCli {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, Box<dyn Error>> {
        cli::run(program, args).await
    }
}

/// Live inventory of one region.
#[derive(Debug, Clone)]
pub struct AwsCliInventory<R = AwsCli> {
    pub region: String,
    /// true: only default VPCs, false: only custom VPCs.
    pub default_vpc: bool,
    runner: R,
}

impl AwsCliInventory {
    pub fn new(region: &str, default_vpc: bool) -> AwsCliInventory {
        AwsCliInventory::with_runner(region, default_vpc, AwsCli)
    }
}

impl<R: CommandRunner> AwsCliInventory<R> {
    pub fn with_runner(region: &str, default_vpc: bool, runner: R) -> AwsCliInventory<R> {
        AwsCliInventory {
            region: region.to_string(),
            default_vpc,
            runner,
        }
    }

    pub fn describe_vpcs_args(&self) -> Vec<String> {
        [
            "ec2",
            "describe-vpcs",
            "--region",
            self.region.as_str(),
            "--filters",
            format!("Name=isDefault,Values={}", self.default_vpc).as_str(),
            "--output",
            "json",
        ]
        .map(str::to_string)
        .to_vec()
    }

    pub fn describe_subnets_args(&self, vpc_id: &str) -> Vec<String> {
        [
            "ec2",
            "describe-subnets",
            "--region",
            self.region.as_str(),
            "--filters",
            format!("Name=vpc-id,Values={vpc_id}").as_str(),
            "--output",
            "json",
        ]
        .map(str::to_string)
        .to_vec()
    }

    /// VPCs matching the default/custom selection, in CLI order.
    pub async fn vpcs(&self) -> Result<Vec<Vpc>, Box<dyn Error>> {
        let output = self.runner.run("aws", &self.describe_vpcs_args()).await?;
        let mut vpcs = parse_vpcs(&output)?;
        vpcs.retain(|vpc| {
            log::debug!(
                "{} cidr={} default={}",
                vpc.vpc_id,
                vpc.cidr_block.as_deref().unwrap_or("-"),
                vpc.is_default
            );
            if vpc.is_default != self.default_vpc {
                log::warn!(
                    "skipping {}: default={} but default={} was requested",
                    vpc.vpc_id,
                    vpc.is_default,
                    self.default_vpc
                );
            }
            vpc.is_default == self.default_vpc
        });
        log::info!(
            "region {} default={}: {} VPC(s)",
            self.region,
            self.default_vpc,
            vpcs.len()
        );
        Ok(vpcs)
    }

    pub async fn vpc_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>, Box<dyn Error>> {
        let output = self
            .runner
            .run("aws", &self.describe_subnets_args(vpc_id))
            .await?;
        let subnets = parse_subnets(&output)?;
        log::info!("VPC {vpc_id}: {} subnet(s)", subnets.len());
        Ok(subnets)
    }
}

impl<R: CommandRunner> InventorySource for AwsCliInventory<R> {
    async fn subnets(&self) -> Result<Vec<SubnetObservation>, Box<dyn Error>> {
        let vpcs = self.vpcs().await?;
        // buffered keeps VPC order regardless of completion order
        let per_vpc: Vec<Vec<Subnet>> = stream::iter(&vpcs)
            .map(|v| self.vpc_subnets(&v.vpc_id))
            .buffered(MAX_CONCURRENT_QUERIES)
            .try_collect()
            .await?;
        Ok(per_vpc
            .into_iter()
            .flatten()
            .map(SubnetObservation::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const VPCS_JSON: &str = r#"{
        "Vpcs": [
            {"CidrBlock": "10.0.0.0/16", "State": "available", "VpcId": "vpc-0a1", "IsDefault": false},
            {"CidrBlock": "10.1.0.0/16", "State": "available", "VpcId": "vpc-0b2", "IsDefault": false}
        ]
    }"#;

    const SUBNETS_JSON: &str = r#"{
        "Subnets": [
            {
                "AvailabilityZone": "us-west-2a",
                "AvailableIpAddressCount": 200,
                "CidrBlock": "10.0.1.0/24",
                "SubnetId": "subnet-01",
                "VpcId": "vpc-0a1",
                "Tags": [{"Key": "env", "Value": "prod"}, {"Key": "Name", "Value": "app-a"}]
            },
            {
                "AvailableIpAddressCount": 10,
                "CidrBlock": "10.0.2.0/28",
                "SubnetId": "subnet-02",
                "VpcId": "vpc-0a1"
            },
            {
                "AvailableIpAddressCount": 0,
                "SubnetId": "subnet-03",
                "VpcId": "vpc-0a1",
                "Ipv6CidrBlockAssociationSet": [
                    {"AssociationId": "x", "Ipv6CidrBlock": "2600:1f14:1:2::/64"}
                ],
                "Tags": [{"Key": "Name", "Value": "v6-old"}, {"Key": "Name", "Value": "v6-only"}]
            }
        ]
    }"#;

    #[test]
    fn test_parse_vpcs() {
        let vpcs = parse_vpcs(VPCS_JSON).unwrap();
        let ids: Vec<_> = vpcs.iter().map(|v| v.vpc_id.as_str()).collect();
        assert_eq!(ids, vec!["vpc-0a1", "vpc-0b2"]);
        assert_eq!(vpcs[0].cidr_block.as_deref(), Some("10.0.0.0/16"));
    }

    #[test]
    fn test_parse_subnets_to_observations() {
        let observations: Vec<SubnetObservation> = parse_subnets(SUBNETS_JSON)
            .unwrap()
            .into_iter()
            .map(SubnetObservation::from)
            .collect();

        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].label.as_deref(), Some("app-a"));
        assert_eq!(observations[0].cidr_block, "10.0.1.0/24");
        assert_eq!(observations[0].available, 200);
        assert_eq!(observations[0].network_id, "vpc-0a1");
        assert_eq!(observations[0].subnet_id, "subnet-01");

        assert_eq!(observations[1].label, None);
        assert_eq!(observations[2].label.as_deref(), Some("v6-only"));
        assert_eq!(observations[2].cidr_block, "2600:1f14:1:2::/64");
    }

    #[test]
    fn test_parse_error_reports_path() {
        let bad = r#"{"Subnets": [{"SubnetId": "s", "VpcId": "v", "AvailableIpAddressCount": "many"}]}"#;
        let err = parse_subnets(bad).unwrap_err().to_string();
        assert!(
            err.contains("Subnets[0].AvailableIpAddressCount"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_command_args() {
        let inv = AwsCliInventory::new("eu-west-1", true);
        assert_eq!(
            inv.describe_vpcs_args().join(" "),
            "ec2 describe-vpcs --region eu-west-1 --filters Name=isDefault,Values=true --output json"
        );
        assert_eq!(
            inv.describe_subnets_args("vpc-0a1"),
            vec![
                "ec2",
                "describe-subnets",
                "--region",
                "eu-west-1",
                "--filters",
                "Name=vpc-id,Values=vpc-0a1",
                "--output",
                "json"
            ]
        );
    }

    /// Serves canned `describe-*` output. The first VPC answers last.
    #[derive(Default)]
    struct CannedAws {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    const CANNED_VPCS: [&str; 6] = ["vpc-a", "vpc-b", "vpc-c", "vpc-d", "vpc-e", "vpc-f"];

    impl CommandRunner for CannedAws {
        async fn run(&self, program: &str, args: &[String]) -> Result<String, Box<dyn Error>> {
            assert_eq!(program, "aws");
            if args[1] == "describe-vpcs" {
                let vpcs = CANNED_VPCS
                    .iter()
                    .map(|id| format!(r#"{{"VpcId": "{id}", "IsDefault": false}}"#))
                    .chain([r#"{"VpcId": "vpc-default", "IsDefault": true}"#.to_string()])
                    .collect::<Vec<_>>()
                    .join(",");
                return Ok(format!(r#"{{"Vpcs": [{vpcs}]}}"#));
            }

            let vpc_id = args[5]
                .strip_prefix("Name=vpc-id,Values=")
                .ok_or("unexpected filter")?
                .to_string();
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let delay = if vpc_id == CANNED_VPCS[0] { 50 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Ok(format!(
                r#"{{"Subnets": [
                    {{"SubnetId": "{vpc_id}-1", "VpcId": "{vpc_id}", "CidrBlock": "10.0.1.0/24", "AvailableIpAddressCount": 250}},
                    {{"SubnetId": "{vpc_id}-2", "VpcId": "{vpc_id}", "CidrBlock": "10.0.2.0/24", "AvailableIpAddressCount": 100}}
                ]}}"#
            ))
        }
    }

    #[tokio::test]
    async fn test_subnets_keep_vpc_order_with_bounded_queries() {
        let inv = AwsCliInventory::with_runner("us-west-2", false, CannedAws::default());
        let observations = inv.subnets().await.unwrap();

        let ids: Vec<_> = observations.iter().map(|o| o.subnet_id.as_str()).collect();
        let expected: Vec<String> = CANNED_VPCS
            .iter()
            .flat_map(|id| [format!("{id}-1"), format!("{id}-2")])
            .collect();
        assert_eq!(ids, expected);
        assert!(observations.iter().all(|o| o.network_id != "vpc-default"));

        let peak = inv.runner.peak.load(Ordering::SeqCst);
        assert!(peak > 1, "queries ran one at a time");
        assert!(
            peak <= MAX_CONCURRENT_QUERIES,
            "{peak} queries in flight, limit {MAX_CONCURRENT_QUERIES}"
        );
    }

    #[tokio::test]
    async fn test_subnets_query_error_fails_inventory() {
        struct Broken;
        impl CommandRunner for Broken {
            async fn run(&self, _: &str, args: &[String]) -> Result<String, Box<dyn Error>> {
                if args[1] == "describe-vpcs" {
                    Ok(VPCS_JSON.to_string())
                } else {
                    Err("ERROR running: AccessDenied".into())
                }
            }
        }
        let inv = AwsCliInventory::with_runner("us-west-2", false, Broken);
        let err = inv.subnets().await.unwrap_err().to_string();
        assert!(err.contains("AccessDenied"), "unexpected error: {err}");
    }
}
