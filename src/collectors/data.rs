use super::CollectContext;
use crate::inventory::{CollectorFailure, FieldValue, Payload, RecordShape};
use crate::provider::Service;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

declare_collector! {
    Databases {
        name: "databases",
        title: "Managed Databases",
        description: "Managed relational database instances.",
        scope: Regional,
        collect: collect_databases,
    }
}

declare_collector! {
    BackupPlans {
        name: "backup_plans",
        title: "Backup Plans",
        description: "Centralized backup plans.",
        scope: Regional,
        collect: collect_backup_plans,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DescribeDbInstances {
    #[serde(rename = "DBInstances")]
    db_instances: Vec<DbInstance>,
}

#[derive(Debug, Deserialize)]
struct DbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    identifier: String,
    #[serde(default, rename = "Engine")]
    engine: Option<String>,
    #[serde(default, rename = "DBInstanceStatus")]
    status: Option<String>,
    #[serde(default, rename = "Endpoint")]
    endpoint: Option<Endpoint>,
    #[serde(default, rename = "DBInstanceClass")]
    instance_class: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Endpoint {
    address: String,
}

impl RecordShape for DbInstance {
    const COLUMNS: &'static [&'static str] = &["identifier", "engine", "status", "endpoint", "instance_class"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.identifier.into()),
            self.engine.map(Into::into),
            self.status.map(Into::into),
            self.endpoint.map(|e| e.address.into()),
            self.instance_class.map(Into::into),
        ]
    }
}

async fn collect_databases(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: DescribeDbInstances = ctx.call(Service::Rds, "DescribeDBInstances", Value::Null).await?;
    Payload::from_shapes(response.db_instances)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListBackupPlans {
    backup_plans_list: Vec<BackupPlan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BackupPlan {
    backup_plan_id: String,
    #[serde(default)]
    backup_plan_name: Option<String>,
    #[serde(default)]
    creation_date: Option<DateTime<Utc>>,
}

impl RecordShape for BackupPlan {
    const COLUMNS: &'static [&'static str] = &["plan_id", "name", "creation_date"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.backup_plan_id.into()),
            self.backup_plan_name.map(Into::into),
            self.creation_date.map(Into::into),
        ]
    }
}

async fn collect_backup_plans(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: ListBackupPlans = ctx.call(Service::Backup, "ListBackupPlans", Value::Null).await?;
    Payload::from_shapes(response.backup_plans_list)
}
