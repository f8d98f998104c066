use super::CollectContext;
use crate::inventory::{CollectorFailure, FieldValue, Payload, RecordShape};
use crate::provider::Service;
use serde::Deserialize;
use serde_json::Value;

declare_collector! {
    /// The caller identity and account aliases.
    AccountIdentity {
        name: "account_identity",
        title: "Account Summary",
        description: "Identity the inventory ran as, and the account's aliases.",
        scope: Global,
        collect: collect_identity,
    }
}

declare_collector! {
    /// Organization membership.
    Organizations {
        name: "organizations",
        title: "Organizations",
        description: "The organization this account belongs to, if any.",
        scope: Global,
        collect: collect_organization,
    }
}

declare_collector! {
    ControlTower {
        name: "control_tower",
        title: "Control Tower",
        description: "Landing zones managed by Control Tower.",
        scope: Regional,
        collect: collect_landing_zones,
    }
}

declare_collector! {
    IdentityCenter {
        name: "identity_center",
        title: "Identity Center",
        description: "Identity Center instances and their identity stores.",
        scope: Regional,
        collect: collect_identity_center,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CallerIdentity {
    account: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    arn: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct AccountAliases {
    account_aliases: Vec<String>,
}

struct IdentityRecord {
    identity: CallerIdentity,
    aliases: Option<Vec<String>>,
}

impl RecordShape for IdentityRecord {
    const COLUMNS: &'static [&'static str] = &["account_id", "user_id", "arn", "aliases"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.identity.account.into()),
            self.identity.user_id.map(Into::into),
            self.identity.arn.map(Into::into),
            self.aliases.map(Into::into),
        ]
    }
}

async fn collect_identity(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let identity: CallerIdentity = ctx.call(Service::Sts, "GetCallerIdentity", Value::Null).await?;

    let mut notes = Vec::new();
    let aliases = match ctx.call::<AccountAliases>(Service::Iam, "ListAccountAliases", Value::Null).await {
        Ok(aliases) => Some(aliases.account_aliases),
        Err(failure) => {
            notes.push(format!("Account aliases unavailable ({failure})"));
            None
        }
    };

    Ok(Payload::from_shapes([IdentityRecord { identity, aliases }])?.with_notes(notes))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeOrganization {
    organization: Organization,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Organization {
    id: String,
    #[serde(default)]
    master_account_id: Option<String>,
    #[serde(default)]
    feature_set: Option<String>,
}

impl RecordShape for Organization {
    const COLUMNS: &'static [&'static str] = &["organization_id", "master_account_id", "feature_set"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![
            Some(self.id.into()),
            self.master_account_id.map(Into::into),
            self.feature_set.map(Into::into),
        ]
    }
}

async fn collect_organization(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: DescribeOrganization = ctx.call(Service::Organizations, "DescribeOrganization", Value::Null).await?;
    Payload::from_shapes([response.organization])
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListLandingZones {
    landing_zones: Vec<LandingZone>,
}

#[derive(Debug, Deserialize)]
struct LandingZone {
    arn: String,
}

impl RecordShape for LandingZone {
    const COLUMNS: &'static [&'static str] = &["landing_zone_arn"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![Some(self.arn.into())]
    }
}

async fn collect_landing_zones(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: ListLandingZones = ctx.call(Service::ControlTower, "ListLandingZones", Value::Null).await?;
    Payload::from_shapes(response.landing_zones)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListInstances {
    instances: Vec<IdentityCenterInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct IdentityCenterInstance {
    instance_arn: String,
    #[serde(default)]
    identity_store_id: Option<String>,
}

impl RecordShape for IdentityCenterInstance {
    const COLUMNS: &'static [&'static str] = &["instance_arn", "identity_store_id"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![Some(self.instance_arn.into()), self.identity_store_id.map(Into::into)]
    }
}

async fn collect_identity_center(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: ListInstances = ctx.call(Service::SsoAdmin, "ListInstances", Value::Null).await?;
    Payload::from_shapes(response.instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::invoke;
    use crate::collectors::test_support::{CannedApi, Fixture};
    use crate::inventory::FailureKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_identity_with_aliases() {
        let fixture = Fixture::new();
        let api = CannedApi::default()
            .ok(
                Service::Sts,
                "GetCallerIdentity",
                json!({ "Account": "111111111111", "UserId": "AIDA", "Arn": "arn:aws:iam::111111111111:user/ops" }),
            )
            .ok(Service::Iam, "ListAccountAliases", json!({ "AccountAliases": ["prod"] }));

        let result = invoke(&AccountIdentity, &fixture.context(&api)).await;
        let payload = result.payload().unwrap();
        assert_eq!(payload.columns, vec!["account_id", "user_id", "arn", "aliases"]);
        assert_eq!(payload.records[0].get("account_id"), Some(Some(&FieldValue::String("111111111111".into()))));
        assert_eq!(
            payload.records[0].get("aliases"),
            Some(Some(&FieldValue::List(vec![FieldValue::String("prod".into())])))
        );
        assert!(payload.notes.is_empty());
    }

    #[tokio::test]
    async fn test_identity_alias_failure_is_a_note() {
        let fixture = Fixture::new();
        let api = CannedApi::default()
            .ok(Service::Sts, "GetCallerIdentity", json!({ "Account": "111111111111" }))
            .err(Service::Iam, "ListAccountAliases", "AccessDenied");

        let result = invoke(&AccountIdentity, &fixture.context(&api)).await;
        let payload = result.payload().unwrap();
        assert_eq!(payload.records[0].get("aliases"), Some(None));
        assert_eq!(payload.notes.len(), 1);
        assert!(payload.notes[0].contains("NotAuthorized"));
    }

    #[tokio::test]
    async fn test_organizations_not_in_use_is_benign() {
        let fixture = Fixture::new();
        let api = CannedApi::default().err(Service::Organizations, "DescribeOrganization", "AWSOrganizationsNotInUseException");

        let result = invoke(&Organizations, &fixture.context(&api)).await;
        assert_eq!(result.failure().unwrap().kind, FailureKind::NotFoundOrDisabled);
    }

    #[tokio::test]
    async fn test_landing_zones_and_identity_center() {
        let fixture = Fixture::new();
        let api = CannedApi::default()
            .ok(Service::ControlTower, "ListLandingZones", json!({ "landingZones": [{ "arn": "arn:lz" }] }))
            .ok(Service::SsoAdmin, "ListInstances", json!({}));

        let zones = invoke(&ControlTower, &fixture.context(&api)).await;
        assert_eq!(zones.payload().unwrap().len(), 1);

        let instances = invoke(&IdentityCenter, &fixture.context(&api)).await;
        let payload = instances.payload().unwrap();
        assert!(payload.is_empty());
        assert_eq!(payload.columns, vec!["instance_arn", "identity_store_id"]);
    }
}
