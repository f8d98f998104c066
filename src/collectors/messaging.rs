use super::{CollectContext, arn_suffix};
use crate::inventory::{CollectorFailure, FieldValue, Payload, RecordShape};
use crate::provider::Service;
use serde::Deserialize;
use serde_json::Value;

declare_collector! {
    Topics {
        name: "topics",
        title: "Messaging Topics",
        description: "Notification topics, sorted by name.",
        scope: Regional,
        collect: collect_topics,
    }
}

declare_collector! {
    EventRules {
        name: "event_rules",
        title: "Event Rules",
        description: "Event bus rules and their patterns.",
        scope: Regional,
        collect: collect_event_rules,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListTopics {
    topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Topic {
    topic_arn: String,
}

struct TopicRecord {
    name: String,
    arn: String,
}

impl RecordShape for TopicRecord {
    const COLUMNS: &'static [&'static str] = &["name", "arn"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![Some(self.name.into()), Some(self.arn.into())]
    }
}

async fn collect_topics(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: ListTopics = ctx.call(Service::Sns, "ListTopics", Value::Null).await?;

    let mut records: Vec<_> = response
        .topics
        .into_iter()
        .map(|topic| TopicRecord {
            name: arn_suffix(&topic.topic_arn, ':'),
            arn: topic.topic_arn,
        })
        .collect();
    records.sort_by(|a, b| a.name.cmp(&b.name));

    Payload::from_shapes(records)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ListRules {
    rules: Vec<Rule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Rule {
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    event_pattern: Option<String>,
}

impl RecordShape for Rule {
    const COLUMNS: &'static [&'static str] = &["name", "state", "event_pattern"];

    fn into_values(self) -> Vec<Option<FieldValue>> {
        vec![Some(self.name.into()), self.state.map(Into::into), self.event_pattern.map(Into::into)]
    }
}

async fn collect_event_rules(ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
    let response: ListRules = ctx.call(Service::Events, "ListRules", Value::Null).await?;
    Payload::from_shapes(response.rules)
}
