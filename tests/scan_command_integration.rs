//! Runs the command-line entry point against replayed provider responses.

use camino::Utf8PathBuf;
use cloud_runbook::{Host, run};
use std::fs;
use std::io::Write;

#[derive(Debug, Default)]
struct CapturingHost {
    output: Vec<u8>,
    error: Vec<u8>,
    exit_code: Option<i32>,
}

impl Host for CapturingHost {
    fn output(&mut self) -> impl Write {
        &mut self.output
    }

    fn error(&mut self) -> impl Write {
        &mut self.error
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

impl CapturingHost {
    fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.error).into_owned()
    }
}

const RECORDING: &str = r#"{
    "roles": [
        {
            "role_arn": "arn:aws:iam::222222222222:role/InventoryReader",
            "credentials": { "access_key_id": "AKIASTAGING", "secret_access_key": "secret", "session_token": "token" }
        }
    ],
    "responses": [
        {
            "service": "sts",
            "operation": "GetCallerIdentity",
            "account": "111111111111",
            "response": { "Account": "111111111111", "UserId": "AIDAPROD", "Arn": "arn:aws:iam::111111111111:user/scanner" }
        },
        {
            "service": "sts",
            "operation": "GetCallerIdentity",
            "account": "222222222222",
            "response": { "Account": "222222222222", "UserId": "AROASTAGING", "Arn": "arn:aws:sts::222222222222:assumed-role/InventoryReader/cloud-runbook" }
        },
        {
            "service": "iam",
            "operation": "ListAccountAliases",
            "account": "111111111111",
            "response": { "AccountAliases": ["acme-prod"] }
        },
        {
            "service": "organizations",
            "operation": "DescribeOrganization",
            "error": { "code": "AWSOrganizationsNotInUseException", "message": "Your account is not a member of an organization." }
        },
        {
            "service": "ec2",
            "operation": "DescribeVpcs",
            "account": "111111111111",
            "region": "us-east-1",
            "response": { "Vpcs": [{ "VpcId": "vpc-0a1", "CidrBlock": "10.0.0.0/16", "State": "available", "IsDefault": false }] }
        },
        {
            "service": "ec2",
            "operation": "DescribeVpcs",
            "response": { "Vpcs": [] }
        },
        {
            "service": "ec2",
            "operation": "DescribeSubnets",
            "response": { "Subnets": [{ "SubnetId": "subnet-1", "VpcId": "vpc-0a1" }, { "SubnetId": "subnet-2", "VpcId": "vpc-0a1" }] }
        },
        {
            "service": "ec2",
            "operation": "DescribeVpcPeeringConnections",
            "error": { "code": "UnauthorizedOperation", "message": "You are not authorized to perform this operation." }
        },
        {
            "service": "sns",
            "operation": "ListTopics",
            "account": "222222222222",
            "error": { "code": "AccessDenied", "message": "sns:ListTopics denied" }
        },
        {
            "service": "sns",
            "operation": "ListTopics",
            "response": { "Topics": [{ "TopicArn": "arn:aws:sns:us-east-1:111111111111:zeta" }, { "TopicArn": "arn:aws:sns:us-east-1:111111111111:alpha" }] }
        }
    ]
}"#;

const CONFIG: &str = r#"
accounts:
  - id: "111111111111"
    alias: prod
  - id: "222222222222"
    alias: staging
    role_arn: "arn:aws:iam::222222222222:role/InventoryReader"
regions: [us-east-1, eu-west-1]
collectors: [account_identity, organizations, network, topics]
max_table_rows: 5
"#;

struct Workspace {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::write(root.join("recording.json"), RECORDING).unwrap();
        fs::write(root.join("runbook.yaml"), CONFIG).unwrap();
        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> String {
        self.root.join(name).into_string()
    }

    fn scan_args(&self, extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "cloud-runbook".to_string(),
            "scan".to_string(),
            "--replay".to_string(),
            self.path("recording.json"),
            "--config".to_string(),
            self.path("runbook.yaml"),
            "--color".to_string(),
            "never".to_string(),
        ];
        args.extend(extra.iter().map(ToString::to_string));
        args
    }
}

#[tokio::test]
async fn scan_writes_markdown_and_json() {
    let workspace = Workspace::new();
    let markdown_path = workspace.path("runbook.md");
    let json_path = workspace.path("runbook.json");
    let mut host = CapturingHost::default();

    run(&mut host, workspace.scan_args(&["--markdown", &markdown_path, "--json", &json_path]))
        .await
        .unwrap();

    assert_eq!(host.exit_code, None);
    assert!(host.output_text().is_empty());

    let markdown = fs::read_to_string(&markdown_path).unwrap();
    assert!(markdown.contains("- 111111111111 (prod)"));
    assert!(markdown.contains("- [1. Account Summary](#1-account-summary)"));
    assert!(markdown.contains("## 3. Network Topology"));

    // global collectors run only in the home region
    assert!(markdown.contains("Global resource, collected in home region us-east-1"));

    // topics are sorted by name
    let alpha = markdown.find("| alpha |").unwrap();
    let zeta = markdown.find("| zeta |").unwrap();
    assert!(alpha < zeta);

    assert!(markdown.contains("**Error (NotAuthorized)**"));
    assert!(markdown.contains("**Error (NotFoundOrDisabled)**"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    let summary = &json["summary"];
    assert_eq!(summary["tasks_total"], 4);
    assert_eq!(summary["accounts_scanned"], 2);
    assert_eq!(summary["regions_scanned"], 2);

    let sections = json["report"]["sections"].as_array().unwrap();
    let names: Vec<_> = sections.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["account_identity", "organizations", "network", "topics"]);

    let network = &sections[2]["entries"][0]["result"];
    assert_eq!(network["status"], "found");
    assert_eq!(network["data"]["records"][0]["vpc_id"], "vpc-0a1");
    assert_eq!(network["data"]["records"][0]["subnet_count"], 2);
    assert!(network["data"]["records"][0]["peering_count"].is_null());
    assert!(!network["data"]["notes"].as_array().unwrap().is_empty());

    let staging_topics = &sections[3]["entries"][2]["result"];
    assert_eq!(staging_topics["status"], "failed");
    assert_eq!(staging_topics["data"]["kind"], "NotAuthorized");
}

#[tokio::test]
async fn scan_prints_console_summary_without_report_files() {
    let workspace = Workspace::new();
    let mut host = CapturingHost::default();

    run(&mut host, workspace.scan_args(&[])).await.unwrap();

    let output = host.output_text();
    assert!(output.contains("Run Summary"));
    assert!(output.contains("Tasks planned"));
    assert!(output.contains("111111111111 (prod)"));
    assert!(output.contains("222222222222 (staging)"));
}

#[tokio::test]
async fn scan_overrides_narrow_the_matrix() {
    let workspace = Workspace::new();
    let json_path = workspace.path("narrow.json");
    let mut host = CapturingHost::default();

    run(
        &mut host,
        workspace.scan_args(&["--account", "222222222222", "--region", "eu-west-1", "--json", &json_path]),
    )
    .await
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["tasks_total"], 1);
    assert_eq!(json["report"]["accounts"][0]["alias"], "staging");
    assert_eq!(json["report"]["regions"][0], "eu-west-1");
}

#[tokio::test]
async fn scan_exits_non_zero_when_every_task_fails() {
    let workspace = Workspace::new();
    let recording = workspace.path("denied.json");
    fs::write(&recording, r#"{ "ambient": { "error": { "code": "ExpiredToken", "message": "expired" } } }"#).unwrap();

    let mut host = CapturingHost::default();
    let args = vec![
        "cloud-runbook".to_string(),
        "scan".to_string(),
        "--replay".to_string(),
        recording,
        "--config".to_string(),
        workspace.path("runbook.yaml"),
        "--account".to_string(),
        "111111111111".to_string(),
        "--color".to_string(),
        "never".to_string(),
    ];

    let result = run(&mut host, args).await;

    assert!(result.is_err());
    assert_eq!(host.exit_code, Some(1));
    assert!(host.error_text().contains("No scan produced any data"));
    assert!(host.output_text().contains("Failed (AuthFailure)"));
}

#[tokio::test]
async fn init_then_validate() {
    let workspace = Workspace::new();
    let config_path = workspace.path("fresh.toml");

    let mut host = CapturingHost::default();
    run(&mut host, ["cloud-runbook", "init", config_path.as_str()]).await.unwrap();
    assert!(host.output_text().contains("Generated default configuration file"));

    let mut host = CapturingHost::default();
    run(&mut host, ["cloud-runbook", "validate", "--config", config_path.as_str()])
        .await
        .unwrap();
    assert!(host.output_text().contains("Configuration file is valid"));
}

#[tokio::test]
async fn validate_reports_bad_config() {
    let workspace = Workspace::new();
    let config_path = workspace.path("bad.toml");
    fs::write(&config_path, "regions = [\"us-east-1\"]\nmax_concurrency = 0\n").unwrap();

    let mut host = CapturingHost::default();
    let result = run(&mut host, ["cloud-runbook", "validate", "--config", config_path.as_str()]).await;

    assert!(result.is_err());
    assert_eq!(host.exit_code, Some(1));
    assert!(host.error_text().contains("max_concurrency must be at least 1"));
}
