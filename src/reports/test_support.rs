use crate::aggregate::{PairStatus, ReportModel, ReportSection, RunSummary, ScanStatus, SectionEntry};
use crate::inventory::{Account, CollectorFailure, CollectorResult, FailureKind, FieldValue, Payload, Record, Region};
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;

pub fn prod() -> Account {
    Account::new("111111111111", None, Some("prod".into())).unwrap()
}

pub fn staging() -> Account {
    Account::new("222222222222", None, None).unwrap()
}

pub fn us_east() -> Region {
    Region::new("us-east-1").unwrap()
}

pub fn topics(count: usize) -> CollectorResult {
    let records = (0..count)
        .map(|i| {
            Record::new()
                .with("name", Some(FieldValue::from(format!("topic-{i:02}"))))
                .with("arn", None)
        })
        .collect();
    CollectorResult::Found(Payload::from_records(records))
}

/// Two accounts in one region: `prod` scanned completely, `staging` unreachable.
pub fn sample() -> (ReportModel, RunSummary) {
    let denied = CollectorFailure::new(FailureKind::AuthFailure, "assuming role: AccessDenied: not allowed");
    let model = ReportModel {
        accounts: vec![prod(), staging()],
        regions: vec![us_east()],
        scans: vec![
            PairStatus {
                account: prod(),
                region: us_east(),
                status: ScanStatus::Complete,
                message: None,
            },
            PairStatus {
                account: staging(),
                region: us_east(),
                status: ScanStatus::Failed(FailureKind::AuthFailure),
                message: Some(denied.message.clone()),
            },
        ],
        sections: vec![
            ReportSection {
                name: "topics",
                title: "Messaging Topics",
                description: "Notification topics.",
                entries: vec![
                    SectionEntry {
                        account: prod(),
                        region: us_east(),
                        result: topics(3),
                    },
                    SectionEntry {
                        account: staging(),
                        region: us_east(),
                        result: CollectorResult::Failed(denied.clone()),
                    },
                ],
            },
            ReportSection {
                name: "functions",
                title: "Serverless Functions",
                description: "Functions and their runtimes.",
                entries: vec![
                    SectionEntry {
                        account: prod(),
                        region: us_east(),
                        result: CollectorResult::Found(Payload::default().with_note("one function could not be read")),
                    },
                    SectionEntry {
                        account: staging(),
                        region: us_east(),
                        result: CollectorResult::Failed(denied),
                    },
                ],
            },
        ],
    };

    let summary = RunSummary {
        accounts_scanned: 2,
        regions_scanned: 1,
        tasks_total: 2,
        tasks_attempted: 2,
        tasks_succeeded: 1,
        tasks_partially_failed: 0,
        tasks_failed: 1,
        tasks_timed_out: 0,
        tasks_cancelled: 0,
        failures_by_kind: BTreeMap::from([(FailureKind::AuthFailure, 2)]),
        generated_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
    };

    (model, summary)
}
