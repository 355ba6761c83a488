use std::path::Path;

use crate::error::ConfigError;
use crate::runner::{Complexity, Condition};

use super::types::{ConfigOverlay, OrchestrationConfig, UnitConfig};

/// The built-in review agent set a project overlay is merged onto.
pub fn default_agents() -> Vec<UnitConfig> {
    vec![
        UnitConfig {
            name: "style-review".to_string(),
            depends_on: Vec::new(),
            timeout_secs: 120,
            required: true,
            condition: Condition::Always,
        },
        UnitConfig {
            name: "unit-tests".to_string(),
            depends_on: Vec::new(),
            timeout_secs: 240,
            required: true,
            condition: Condition::Always,
        },
        UnitConfig {
            name: "security-review".to_string(),
            depends_on: vec!["style-review".to_string()],
            timeout_secs: 180,
            required: true,
            condition: Condition::HasSensitiveFiles,
        },
        UnitConfig {
            name: "architecture-review".to_string(),
            depends_on: vec!["style-review".to_string()],
            timeout_secs: 180,
            required: false,
            condition: Condition::ComplexityAtLeast(Complexity::Standard),
        },
        UnitConfig {
            name: "docs-review".to_string(),
            depends_on: vec!["architecture-review".to_string()],
            timeout_secs: 120,
            required: false,
            condition: Condition::Always,
        },
    ]
}

/// Built-in defaults: DAG mode over the default agent set.
pub fn default_config() -> OrchestrationConfig {
    OrchestrationConfig {
        agents: default_agents(),
        ..OrchestrationConfig::default()
    }
}

/// Loads a complete orchestration document from a TOML file.
pub fn load_from_path(path: &Path) -> Result<OrchestrationConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let cfg: OrchestrationConfig = toml::from_str(&raw)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Loads a partial project document (if any) merged over the built-in
/// defaults, keyed by agent name.
pub fn load_with_defaults(path: Option<&Path>) -> Result<OrchestrationConfig, ConfigError> {
    let cfg = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let overlay: ConfigOverlay = toml::from_str(&raw)?;
            default_config().merged_with(overlay)
        }
        None => default_config(),
    };
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::{ExecutionMode, MAX_UNIT_TIMEOUT_SECS};

    #[test]
    fn defaults_validate() {
        default_config().validate().unwrap();
    }

    #[test]
    fn overlay_replaces_by_name_and_appends_new_agents() {
        let overlay: ConfigOverlay = toml::from_str(
            r#"
            mode = "sequential"

            [[agents]]
            name = "security-review"
            timeout_secs = 60
            required = false

            [[agents]]
            name = "license-check"
            timeout_secs = 30
            "#,
        )
        .unwrap();

        let base_len = default_agents().len();
        let merged = default_config().merged_with(overlay);

        assert_eq!(merged.mode, ExecutionMode::Sequential);
        assert_eq!(merged.agents.len(), base_len + 1);

        let security = merged.agent("security-review").unwrap();
        assert_eq!(security.timeout_secs, 60);
        assert!(!security.required);
        // the overlay entry fully replaces the base one
        assert_eq!(security.condition, Condition::Always);

        assert!(merged.agent("license-check").is_some());
        // untouched defaults survive the merge
        assert!(merged.agent("unit-tests").is_some());
    }

    #[test]
    fn unit_timeout_out_of_range_fails_fast() {
        let mut cfg = default_config();
        cfg.agents[0].timeout_secs = MAX_UNIT_TIMEOUT_SECS + 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidUnitTimeout { .. })
        ));

        cfg.agents[0].timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn global_timeout_out_of_range_fails_fast() {
        let mut cfg = default_config();
        cfg.global_timeout_secs = 601;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidGlobalTimeout { .. })
        ));
    }

    #[test]
    fn undeclared_dependency_rejected() {
        let mut cfg = default_config();
        cfg.agents[0].depends_on.push("nonexistent".to_string());
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UndeclaredDependency { ref missing, .. }) if missing == "nonexistent"
        ));
    }

    #[test]
    fn unknown_mode_fails_at_parse() {
        let err = toml::from_str::<OrchestrationConfig>("mode = \"turbo\"");
        assert!(err.is_err());
    }

    #[test]
    fn unknown_condition_fails_at_parse() {
        let err = toml::from_str::<ConfigOverlay>(
            r#"
            [[agents]]
            name = "x"
            condition = "whenever"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn load_with_defaults_reads_overlay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            max_parallel = 2

            [[agents]]
            name = "style-review"
            timeout_secs = 45
            "#
        )
        .unwrap();

        let cfg = load_with_defaults(Some(file.path())).unwrap();
        assert_eq!(cfg.max_parallel, 2);
        assert_eq!(cfg.agent("style-review").unwrap().timeout_secs, 45);
    }
}
