use super::Host;
use super::config::Config;
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `runbook.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let base_dir = Utf8PathBuf::from(".");
    let config_path = args.config.as_ref();

    match Config::load(&base_dir, config_path) {
        Ok(config) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no config file given)");
            }

            let _ = writeln!(
                host.output(),
                "{} account(s) × {} region(s), {} collector(s)",
                config.accounts.len(),
                config.regions.len(),
                config.registry()?.len()
            );
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};

    fn write_config(dir: &tempfile::TempDir, name: &str, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_default_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::from_path_buf(dir.path().join("runbook.toml")).unwrap();

        let mut init_host = TestHost::new();
        init_config(&mut init_host, &InitArgs {
            output: Some(config_path.clone()),
        })
        .unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        assert!(result.is_ok(), "Default configuration should validate successfully: {result:?}");
        assert!(host.output_text().contains("0 account(s) × 1 region(s), 16 collector(s)"));
        assert_eq!(host.exit_code, None);
    }

    #[test]
    fn test_default_config_matches_embedded() {
        let parsed: Config = toml::from_str(super::super::config::DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(Config::default(), parsed);
    }

    #[test]
    fn test_invalid_toml_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&dir, "broken.toml", "[[accounts]\nid = \"111111111111\"\n");

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        let _ = result.unwrap_err();
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_text().contains("Configuration validation failed"));
    }

    #[test]
    fn test_role_for_other_account() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            &dir,
            "runbook.toml",
            "[[accounts]]\nid = \"111111111111\"\nrole_arn = \"arn:aws:iam::222222222222:role/Reader\"\n",
        );

        let mut host = TestHost::new();
        let err = validate_config(&mut host, &ValidateArgs { config: Some(config_path) }).unwrap_err();

        assert!(err.to_string().contains("belongs to account 222222222222"));
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    fn test_unknown_collector() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&dir, "runbook.yaml", "collectors: [network, mainframes]\n");

        let mut host = TestHost::new();
        let err = validate_config(&mut host, &ValidateArgs { config: Some(config_path) }).unwrap_err();

        assert!(err.to_string().contains("unknown collector 'mainframes'"));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&dir, "empty.toml", "# Empty config file\n");

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        assert!(result.is_ok(), "Empty config should be valid (uses defaults)");
        assert!(host.output_text().contains("0 account(s) × 0 region(s)"));
    }
}
