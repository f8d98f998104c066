use super::CollectContext;
use crate::inventory::{CollectorFailure, FieldValue, Payload, RecordShape};
use crate::provider::Service;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

declare_collector! {
    /// VPCs with their subnet and peering counts.
    Network {
        name: "network",
        title: "Network Topology",
        description: "Virtual networks, how many subnets each has and how many peering connections touch it.",
        scope: Regional,
        collect: collect_network,
    }
}

declare_collector! {
    DnsZones {
        name: "dns_zones",
        title: "DNS Zones",
        description: "Hosted DNS zones, sorted by name.",
        scope: Global,
        collect: collect_dns_zones,
    }
}

declare_collector! {
    ApiGateways {
        name: "api_gateways",
        title: "API Gateways",
        description: "REST APIs, sorted by name.",
        scope: Regional,
        collect: collect_api_gateways,
    }
}

declare_collector! {
    CdnDistributions {
        name: "cdn_distributions",
        title: "CDN Distributions",
        description: "Content delivery distributions.",
        scope: Global,
        collect: collect_distributions,
    }
}

declare_collector! {
    LoadBalancers {
        name: "load_balancers",
        title: "Load Balancers",
        description: "Application, network and gateway load balancers.",
        scope: Regional,
        collect: collect_load_balancers,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DescribeVpcs {
    vpcs: Vec<Vpc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Vpc {
    vpc_id: String,
    #[serde(default)]
    cidr_block: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    is_default: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DescribeSubnets {
    subnets: Vec<Subnet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Subnet {
    vpc_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DescribePeerings {
    vpc_peering_connections: Vec<Peering>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Peering {
    #[serde(default)]
    requester_vpc_info: Option<PeeringVpc>,
    #[serde(default)]
    accepter_vpc_info: Option<PeeringVpc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PeeringVpc {
    #[serde(default)]
    vpc_id: Option<String>,
}

impl Peering {
    fn touches(&self, vpc_id: &str) -> bool {
        [&self.requester_vpc_info, &self.accepter_vpc_info]
            .into_iter()
            .flatten()
            .any(|side| side.vpc_id.as_deref() == Some(vpc_id))
    }
}

struct VpcRecord {
    vpc: Vpc,
    subnet_count: Option<usize>,
    peering_count: Option<usize>,
}

impl RecordShape for VpcRecord {
    const COLUMNS: &'static [&'static str] = &["vpc_id", "cidr_block", "state", "is_default", "subnet_count", "peering_count"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.vpc.vpc_id.into()),
            self.vpc.cidr_block.map(Into::into),
            self.vpc.state.map(Into::into),
            Some(self.vpc.is_default.into()),
            self.subnet_count.map(Into::into),
            self.peering_count.map(Into::into),
        ]
    }
}

async fn collect_network(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let vpcs: DescribeVpcs = ctx.call(Service::Ec2, "DescribeVpcs", Value::Null).await?;

    let mut notes = Vec::new();
    let subnets = match ctx.call::<DescribeSubnets>(Service::Ec2, "DescribeSubnets", Value::Null).await {
        Ok(response) => Some(response.subnets),
        Err(failure) => {
            notes.push(format!("Subnet counts unavailable ({failure})"));
            None
        }
    };

    let peerings = match ctx.call::<DescribePeerings>(Service::Ec2, "DescribeVpcPeeringConnections", Value::Null).await {
        Ok(response) => Some(response.vpc_peering_connections),
        Err(failure) => {
            notes.push(format!("Peering counts unavailable ({failure})"));
            None
        }
    };

    let records = vpcs.vpcs.into_iter().map(|vpc| {
        let subnet_count = subnets.as_ref().map(|s| s.iter().filter(|subnet| subnet.vpc_id == vpc.vpc_id).count());
        let peering_count = peerings.as_ref().map(|p| p.iter().filter(|peering| peering.touches(&vpc.vpc_id)).count());
        VpcRecord {
            vpc,
            subnet_count,
            peering_count,
        }
    });

    Ok(Payload::from_shapes(records)?.with_notes(notes))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListHostedZones {
    hosted_zones: Vec<HostedZone>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZone {
    id: String,
    name: String,
    #[serde(default)]
    resource_record_set_count: Option<u64>,
    #[serde(default)]
    config: Option<HostedZoneConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZoneConfig {
    #[serde(default)]
    private_zone: bool,
}

impl RecordShape for HostedZone {
    const COLUMNS: &'static [&'static str] = &["name", "zone_id", "record_count", "private_zone"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.name.into()),
            Some(self.id.into()),
            self.resource_record_set_count.map(Into::into),
            self.config.map(|c| c.private_zone.into()),
        ]
    }
}

async fn collect_dns_zones(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let mut response: ListHostedZones = ctx.call(Service::Route53, "ListHostedZones", Value::Null).await?;
    response.hosted_zones.sort_by(|a, b| a.name.cmp(&b.name));
    Payload::from_shapes(response.hosted_zones)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GetRestApis {
    items: Vec<RestApi>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestApi {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    created_date: Option<DateTime<Utc>>,
}

impl RecordShape for RestApi {
    const COLUMNS: &'static [&'static str] = &["api_id", "name", "created_date"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![Some(self.id.into()), Some(self.name.into()), self.created_date.map(Into::into)]
    }
}

async fn collect_api_gateways(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let mut response: GetRestApis = ctx.call(Service::ApiGateway, "GetRestApis", Value::Null).await?;
    response.items.sort_by(|a, b| a.name.cmp(&b.name));
    Payload::from_shapes(response.items)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListDistributions {
    distribution_list: Option<DistributionList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DistributionList {
    items: Vec<Distribution>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Distribution {
    id: String,
    #[serde(default)]
    domain_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    enabled: Option<bool>,
}

impl RecordShape for Distribution {
    const COLUMNS: &'static [&'static str] = &["distribution_id", "domain_name", "status", "enabled"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.id.into()),
            self.domain_name.map(Into::into),
            self.status.map(Into::into),
            self.enabled.map(Into::into),
        ]
    }
}

async fn collect_distributions(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: ListDistributions = ctx.call(Service::CloudFront, "ListDistributions", Value::Null).await?;
    Payload::from_shapes(response.distribution_list.map(|list| list.items).unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DescribeLoadBalancers {
    load_balancers: Vec<LoadBalancer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LoadBalancer {
    load_balancer_name: String,
    #[serde(default, rename = "Type")]
    lb_type: Option<String>,
    #[serde(default)]
    scheme: Option<String>,
    #[serde(default)]
    state: Option<LoadBalancerState>,
    #[serde(default, rename = "DNSName")]
    dns_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LoadBalancerState {
    code: String,
}

impl RecordShape for LoadBalancer {
    const COLUMNS: &'static [&'static str] = &["name", "lb_type", "scheme", "state", "dns_name"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.load_balancer_name.into()),
            self.lb_type.map(Into::into),
            self.scheme.map(Into::into),
            self.state.map(|s| s.code.into()),
            self.dns_name.map(Into::into),
        ]
    }
}

async fn collect_load_balancers(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: DescribeLoadBalancers = ctx.call(Service::Elbv2, "DescribeLoadBalancers", Value::Null).await?;
    Payload::from_shapes(response.load_balancers)
}
