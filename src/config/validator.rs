//! Configuration validation
//!
//! Checks run in a fixed order and stop at the first offending field.
//! Nothing here touches storage; the remote probes are delegated to
//! [`ConnectivityChecker`] by [`ConfigValidator::verify_remote`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::dataset::{DatasetName, PathCodec};
use crate::exec::CommandRunner;
use crate::remote::{ConnectivityChecker, ConnectivityResult, RemoteEndpoint};

use super::errors::{ConfigError, ConfigResult};
use super::file::{Config, ProgramsConfig, RetentionConfig};
use super::settings::{
    DestinationBases, DestinationTopology, MirrorMode, NotifyLevel, Programs, RetentionPolicy,
    Settings,
};

const STATE_FILE_NAME: &str = "datasets.state";

pub struct ConfigValidator;

impl ConfigValidator {
    /// Turn a loaded file into typed settings.
    pub fn validate(config: &Config) -> ConfigResult<Settings> {
        if config.datasets.is_empty() {
            return Err(ConfigError::invalid("datasets", "at least one dataset is required"));
        }

        let auto_snapshot = parse_flag("auto_snapshot", &config.auto_snapshot)?;
        let autoprune = parse_flag("autoprune", &config.autoprune)?;
        let replication = parse_flag("replication", &config.replication)?;
        if !auto_snapshot && !replication {
            return Err(ConfigError::invalid(
                "auto_snapshot",
                "auto_snapshot and replication are both disabled, nothing to do",
            ));
        }

        let topology = DestinationTopology::parse(&config.destination).ok_or_else(|| {
            one_of("destination", &config.destination, &["local", "remote", "both"])
        })?;
        let mirror_mode = MirrorMode::parse(&config.mirror_mode)
            .ok_or_else(|| one_of("mirror_mode", &config.mirror_mode, &["strict", "basic"]))?;
        let dry_run = parse_flag("dry_run", &config.dry_run)?;
        let notify = NotifyLevel::parse(&config.notify)
            .ok_or_else(|| one_of("notify", &config.notify, &["all", "error", "none"]))?;

        let codec = parse_codec(&config.separator_substitute)?;
        let datasets = parse_datasets(&config.datasets)?;

        let mut bases = DestinationBases::default();
        if topology.includes_local() {
            bases.local = Some(parse_base("local_base", config.local_base.as_deref())?);
        }
        let mut remote = None;
        if topology.includes_remote() {
            bases.remote = Some(parse_base("remote_base", config.remote_base.as_deref())?);
            let user = parse_remote_part("remote_user", config.remote_user.as_deref())?;
            let host = parse_remote_part("remote_host", config.remote_host.as_deref())?;
            remote = Some(RemoteEndpoint::new(user, host));
        }

        let retention = parse_retention(&config.retention)?;

        if config.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid("connect_timeout_secs", "must be greater than 0"));
        }
        let remote_tool = require_word("remote_tool", &config.remote_tool)?;
        let programs = parse_programs(&config.programs)?;

        let notify_command = match config.notify_command.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(command) => Some(command.to_string()),
        };

        if config.config_root.trim().is_empty() {
            return Err(ConfigError::invalid("config_root", "must not be empty"));
        }
        let config_root = PathBuf::from(&config.config_root);
        let state_file = match config.state_file.as_deref() {
            Some(path) if path.trim().is_empty() => {
                return Err(ConfigError::invalid("state_file", "must not be empty"));
            }
            Some(path) => PathBuf::from(path),
            None => Path::new(&config.config_root).join(STATE_FILE_NAME),
        };

        Ok(Settings {
            datasets,
            auto_snapshot,
            autoprune,
            replication,
            topology,
            mirror_mode,
            bases,
            remote,
            retention,
            dry_run,
            notify,
            notify_command,
            config_root,
            state_file,
            codec,
            connect_timeout_secs: config.connect_timeout_secs,
            remote_tool,
            programs,
        })
    }

    /// Probe the remote endpoint when the topology uses it.
    pub fn verify_remote(settings: &Settings, runner: &CommandRunner<'_>) -> ConnectivityResult<()> {
        match &settings.remote {
            Some(endpoint) if settings.topology.includes_remote() => {
                let transport = settings.transport();
                ConnectivityChecker::new(&transport, &settings.remote_tool).check(runner, endpoint)
            }
            _ => Ok(()),
        }
    }
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> ConfigError {
    ConfigError::invalid(
        field,
        format!("'{}' is not one of: {}", value, allowed.join(", ")),
    )
}

fn parse_flag(field: &str, value: &str) -> ConfigResult<bool> {
    match value {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(one_of(field, other, &["yes", "no"])),
    }
}

fn parse_codec(substitute: &str) -> ConfigResult<PathCodec> {
    let mut chars = substitute.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PathCodec::new(c)
            .map_err(|e| ConfigError::invalid("separator_substitute", e.to_string())),
        _ => Err(ConfigError::invalid(
            "separator_substitute",
            "must be exactly one character",
        )),
    }
}

fn parse_datasets(raw: &[String]) -> ConfigResult<Vec<DatasetName>> {
    let mut seen = HashSet::new();
    let mut datasets = Vec::with_capacity(raw.len());
    for (index, value) in raw.iter().enumerate() {
        let field = format!("datasets[{}]", index);
        let name =
            DatasetName::parse(value).map_err(|e| ConfigError::invalid(&field, e.to_string()))?;
        if !seen.insert(name.clone()) {
            return Err(ConfigError::invalid(
                field,
                format!("'{}' is listed more than once", name),
            ));
        }
        datasets.push(name);
    }
    Ok(datasets)
}

fn parse_base(field: &str, value: Option<&str>) -> ConfigResult<DatasetName> {
    let value = value.ok_or_else(|| {
        ConfigError::invalid(field, "required for the configured destination")
    })?;
    DatasetName::parse(value).map_err(|e| ConfigError::invalid(field, e.to_string()))
}

fn parse_remote_part(field: &str, value: Option<&str>) -> ConfigResult<String> {
    let value = value.ok_or_else(|| {
        ConfigError::invalid(field, "required when the destination includes remote")
    })?;
    let value = require_word(field, value)?;
    if value.contains('@') || value.contains(':') {
        return Err(ConfigError::invalid(field, "must not contain '@' or ':'"));
    }
    Ok(value)
}

fn require_word(field: &str, value: &str) -> ConfigResult<String> {
    if value.is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid(field, "must not contain whitespace"));
    }
    Ok(value.to_string())
}

fn parse_retention(raw: &RetentionConfig) -> ConfigResult<RetentionPolicy> {
    let tier = |field: &str, value: i64| {
        u32::try_from(value).map_err(|_| {
            ConfigError::invalid(
                format!("retention.{}", field),
                format!("{} is not a non-negative count", value),
            )
        })
    };
    Ok(RetentionPolicy {
        hourly: tier("hourly", raw.hourly)?,
        daily: tier("daily", raw.daily)?,
        weekly: tier("weekly", raw.weekly)?,
        monthly: tier("monthly", raw.monthly)?,
        yearly: tier("yearly", raw.yearly)?,
    })
}

fn parse_programs(raw: &ProgramsConfig) -> ConfigResult<Programs> {
    Ok(Programs {
        zfs: require_word("programs.zfs", &raw.zfs)?,
        sanoid: require_word("programs.sanoid", &raw.sanoid)?,
        syncoid: require_word("programs.syncoid", &raw.syncoid)?,
        ssh: require_word("programs.ssh", &raw.ssh)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{CommandOutput, ScriptedExecutor};
    use crate::remote::ConnectivityError;

    fn config(json: &str) -> Config {
        Config::from_json(json).unwrap()
    }

    fn rejected_field(json: &str) -> String {
        let err = ConfigValidator::validate(&config(json)).unwrap_err();
        err.field().unwrap().to_string()
    }

    #[test]
    fn test_minimal_local_config() {
        let settings = ConfigValidator::validate(&config(
            r#"{"datasets": ["cache/appdata"], "local_base": "vault/replication"}"#,
        ))
        .unwrap();

        assert_eq!(settings.datasets.len(), 1);
        assert!(settings.auto_snapshot);
        assert!(!settings.replication);
        assert_eq!(settings.topology, DestinationTopology::Local);
        assert_eq!(settings.mirror_mode, MirrorMode::StrictMirror);
        assert!(settings.remote.is_none());
        assert_eq!(settings.state_file, PathBuf::from("/etc/zmirror/datasets.state"));
        assert_eq!(settings.retention.hourly, 24);
    }

    #[test]
    fn test_remote_config() {
        let settings = ConfigValidator::validate(&config(
            r#"{"datasets": ["cache/appdata"], "replication": "yes", "destination": "remote",
                "remote_base": "vault/replication", "remote_user": "root", "remote_host": "10.0.0.5",
                "mirror_mode": "basic", "notify": "error"}"#,
        ))
        .unwrap();

        assert_eq!(settings.remote, Some(RemoteEndpoint::new("root", "10.0.0.5")));
        assert!(settings.bases.local.is_none());
        assert_eq!(settings.bases.remote.unwrap().as_str(), "vault/replication");
        assert_eq!(settings.mirror_mode, MirrorMode::Basic);
        assert_eq!(settings.notify, NotifyLevel::Error);
    }

    #[test]
    fn test_empty_dataset_list() {
        assert_eq!(rejected_field(r#"{"datasets": []}"#), "datasets");
    }

    #[test]
    fn test_flag_values_are_closed() {
        assert_eq!(
            rejected_field(r#"{"datasets": ["a"], "local_base": "b", "autoprune": "true"}"#),
            "autoprune"
        );
        assert_eq!(
            rejected_field(r#"{"datasets": ["a"], "local_base": "b", "destination": "yes"}"#),
            "destination"
        );
        assert_eq!(
            rejected_field(r#"{"datasets": ["a"], "local_base": "b", "notify": "loud"}"#),
            "notify"
        );
    }

    #[test]
    fn test_nothing_enabled() {
        assert_eq!(
            rejected_field(
                r#"{"datasets": ["a"], "local_base": "b", "auto_snapshot": "no", "replication": "no"}"#
            ),
            "auto_snapshot"
        );
    }

    #[test]
    fn test_remote_fields_required() {
        assert_eq!(
            rejected_field(
                r#"{"datasets": ["a"], "destination": "both", "local_base": "b", "remote_base": "c", "remote_host": "h"}"#
            ),
            "remote_user"
        );
        assert_eq!(
            rejected_field(
                r#"{"datasets": ["a"], "destination": "remote", "remote_base": "c", "remote_user": "root", "remote_host": "bad host"}"#
            ),
            "remote_host"
        );
        assert_eq!(
            rejected_field(
                r#"{"datasets": ["a"], "destination": "remote", "remote_base": "c", "remote_user": "root@x", "remote_host": "h"}"#
            ),
            "remote_user"
        );
    }

    #[test]
    fn test_local_base_required_for_local() {
        assert_eq!(rejected_field(r#"{"datasets": ["a"]}"#), "local_base");
    }

    #[test]
    fn test_dataset_names() {
        assert_eq!(
            rejected_field(r#"{"datasets": ["ok", "bad name"], "local_base": "b"}"#),
            "datasets[1]"
        );
        assert_eq!(
            rejected_field(r#"{"datasets": ["a/b", "a/b"], "local_base": "b"}"#),
            "datasets[1]"
        );
    }

    #[test]
    fn test_substitute_choices() {
        let settings = ConfigValidator::validate(&config(
            r#"{"datasets": ["cache/app_data"], "local_base": "b"}"#,
        ))
        .unwrap();
        assert_eq!(settings.codec.encode(&settings.datasets[0]), "cache_app:_data");

        let settings = ConfigValidator::validate(&config(
            r#"{"datasets": ["cache/app_data"], "local_base": "b", "separator_substitute": "-"}"#,
        ))
        .unwrap();
        assert_eq!(settings.codec.substitute(), '-');
        assert_eq!(settings.codec.encode(&settings.datasets[0]), "cache-app_data");

        assert_eq!(
            rejected_field(r#"{"datasets": ["a"], "local_base": "b", "separator_substitute": ":"}"#),
            "separator_substitute"
        );

        assert_eq!(
            rejected_field(r#"{"datasets": ["a"], "local_base": "b", "separator_substitute": "/"}"#),
            "separator_substitute"
        );
        assert_eq!(
            rejected_field(r#"{"datasets": ["a"], "local_base": "b", "separator_substitute": "__"}"#),
            "separator_substitute"
        );
    }

    #[test]
    fn test_negative_retention() {
        assert_eq!(
            rejected_field(r#"{"datasets": ["a"], "local_base": "b", "retention": {"weekly": -1}}"#),
            "retention.weekly"
        );
    }

    #[test]
    fn test_zero_timeout() {
        assert_eq!(
            rejected_field(r#"{"datasets": ["a"], "local_base": "b", "connect_timeout_secs": 0}"#),
            "connect_timeout_secs"
        );
    }

    #[test]
    fn test_verify_remote_only_for_remote_topologies() {
        let exec = ScriptedExecutor::new();
        let runner = CommandRunner::new(&exec, false);

        let local = ConfigValidator::validate(&config(r#"{"datasets": ["a"], "local_base": "b"}"#))
            .unwrap();
        ConfigValidator::verify_remote(&local, &runner).unwrap();
        assert!(exec.executed().is_empty());

        exec.respond("which zfs", CommandOutput::failure(1, ""));
        let remote = ConfigValidator::validate(&config(
            r#"{"datasets": ["a"], "destination": "remote", "remote_base": "c", "remote_user": "root", "remote_host": "h"}"#,
        ))
        .unwrap();
        let err = ConfigValidator::verify_remote(&remote, &runner).unwrap_err();
        assert!(matches!(err, ConnectivityError::ToolMissing { .. }));
    }
}
