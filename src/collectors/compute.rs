use super::{CollectContext, arn_suffix};
use crate::inventory::{CollectorFailure, FieldValue, Payload, RecordShape};
use crate::provider::Service;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

declare_collector! {
    Instances {
        name: "instances",
        title: "Compute Instances",
        description: "Virtual machine instances across all reservations.",
        scope: Regional,
        collect: collect_instances,
    }
}

declare_collector! {
    Functions {
        name: "functions",
        title: "Serverless Functions",
        description: "Serverless functions, sorted by name.",
        scope: Regional,
        collect: collect_functions,
    }
}

declare_collector! {
    /// Container clusters with the number of services in each.
    ///
    /// Services are listed per cluster. A cluster whose services cannot be listed is still
    /// reported, with an absent service count and a note.
    ContainerClusters {
        name: "container_clusters",
        title: "Container Clusters",
        description: "Container clusters and how many services each runs.",
        scope: Regional,
        collect: collect_clusters,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DescribeInstances {
    reservations: Vec<Reservation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Reservation {
    instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Instance {
    instance_id: String,
    #[serde(default)]
    instance_type: Option<String>,
    #[serde(default)]
    state: Option<InstanceState>,
    #[serde(default)]
    launch_time: Option<DateTime<Utc>>,
    #[serde(default)]
    private_ip_address: Option<String>,
    #[serde(default)]
    public_ip_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceState {
    name: String,
}

impl RecordShape for Instance {
    const COLUMNS: &'static [&'static str] = &["instance_id", "instance_type", "state", "launch_time", "private_ip", "public_ip"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.instance_id.into()),
            self.instance_type.map(Into::into),
            self.state.map(|s| s.name.into()),
            self.launch_time.map(Into::into),
            self.private_ip_address.map(Into::into),
            self.public_ip_address.map(Into::into),
        ]
    }
}

async fn collect_instances(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: DescribeInstances = ctx.call(Service::Ec2, "DescribeInstances", Value::Null).await?;
    Payload::from_shapes(response.reservations.into_iter().flat_map(|r| r.instances))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListFunctions {
    functions: Vec<Function>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Function {
    function_name: String,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    handler: Option<String>,

    // Kept verbatim, the provider's format is not RFC 3339
    #[serde(default)]
    last_modified: Option<String>,
}

impl RecordShape for Function {
    const COLUMNS: &'static [&'static str] = &["name", "runtime", "handler", "last_modified"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.function_name.into()),
            self.runtime.map(Into::into),
            self.handler.map(Into::into),
            self.last_modified.map(Into::into),
        ]
    }
}

async fn collect_functions(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let mut response: ListFunctions = ctx.call(Service::Lambda, "ListFunctions", Value::Null).await?;
    response.functions.sort_by(|a, b| a.function_name.cmp(&b.function_name));
    Payload::from_shapes(response.functions)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListClusters {
    cluster_arns: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListServices {
    service_arns: Vec<String>,
}

struct ClusterRecord {
    arn: String,
    service_count: Option<usize>,
}

impl RecordShape for ClusterRecord {
    const COLUMNS: &'static [&'static str] = &["name", "arn", "service_count"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(arn_suffix(&self.arn, '/').into()),
            Some(self.arn.into()),
            self.service_count.map(Into::into),
        ]
    }
}

async fn collect_clusters(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let clusters: ListClusters = ctx.call(Service::Ecs, "ListClusters", Value::Null).await?;

    let mut records = Vec::with_capacity(clusters.cluster_arns.len());
    let mut notes = Vec::new();
    for arn in clusters.cluster_arns {
        let service_count = match ctx.call::<ListServices>(Service::Ecs, "ListServices", json!({ "cluster": arn })).await {
            Ok(services) => Some(services.service_arns.len()),
            Err(failure) => {
                notes.push(format!("Services of cluster {} unavailable ({failure})", arn_suffix(&arn, '/')));
                None
            }
        };

        records.push(ClusterRecord { arn, service_count });
    }

    Ok(Payload::from_shapes(records)?.with_notes(notes))
}
