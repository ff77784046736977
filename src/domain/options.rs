use indexmap::IndexMap;
use serde::Deserialize;

/// Keys of the `[Unit]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UnitOptions {
    pub description: Option<String>,
    pub documentation: Vec<String>,
    pub after: Vec<String>,
    pub before: Vec<String>,
    pub wants: Vec<String>,
    pub requires: Vec<String>,
}

impl UnitOptions {
    /// Returns a copy where values from `other` win for scalars and are
    /// appended (without duplicates) for lists.
    pub fn merged(&self, other: &UnitOptions) -> UnitOptions {
        UnitOptions {
            description: other.description.clone().or_else(|| self.description.clone()),
            documentation: merge_unique(&self.documentation, &other.documentation),
            after: merge_unique(&self.after, &other.after),
            before: merge_unique(&self.before, &other.before),
            wants: merge_unique(&self.wants, &other.wants),
            requires: merge_unique(&self.requires, &other.requires),
        }
    }

    /// Adds `<name>.service` to both `After=` and `Wants=` for every dependency.
    pub fn with_dependencies(&self, dependencies: &[String]) -> UnitOptions {
        let units: Vec<String> = dependencies
            .iter()
            .map(|name| format!("{name}.service"))
            .collect();

        self.merged(&UnitOptions {
            after: units.clone(),
            wants: units,
            ..Default::default()
        })
    }
}

/// Keys of the `[Service]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceOptions {
    pub restart: Option<String>,
    pub restart_sec: Option<String>,
    pub timeout_start_sec: Option<String>,
    pub timeout_stop_sec: Option<String>,
}

impl ServiceOptions {
    pub fn merged(&self, other: &ServiceOptions) -> ServiceOptions {
        ServiceOptions {
            restart: other.restart.clone().or_else(|| self.restart.clone()),
            restart_sec: other.restart_sec.clone().or_else(|| self.restart_sec.clone()),
            timeout_start_sec: other
                .timeout_start_sec
                .clone()
                .or_else(|| self.timeout_start_sec.clone()),
            timeout_stop_sec: other
                .timeout_stop_sec
                .clone()
                .or_else(|| self.timeout_stop_sec.clone()),
        }
    }
}

/// Keys of the `[Install]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstallOptions {
    pub wanted_by: Vec<String>,
    pub required_by: Vec<String>,
}

impl InstallOptions {
    pub fn merged(&self, other: &InstallOptions) -> InstallOptions {
        InstallOptions {
            wanted_by: merge_unique(&self.wanted_by, &other.wanted_by),
            required_by: merge_unique(&self.required_by, &other.required_by),
        }
    }
}

/// Free-form `[GlobalArgs]` entries, emitted in insertion order.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GlobalArgs(pub IndexMap<String, String>);

impl GlobalArgs {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn merged(&self, other: &GlobalArgs) -> GlobalArgs {
        let mut merged = self.0.clone();
        for (key, value) in &other.0 {
            merged.insert(key.clone(), value.clone());
        }
        GlobalArgs(merged)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// All option bags handed to the generator next to the container model.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UnitFileOptions {
    pub unit: UnitOptions,
    pub service: ServiceOptions,
    pub install: InstallOptions,
    pub global_args: GlobalArgs,
}

impl UnitFileOptions {
    pub fn merged(&self, other: &UnitFileOptions) -> UnitFileOptions {
        UnitFileOptions {
            unit: self.unit.merged(&other.unit),
            service: self.service.merged(&other.service),
            install: self.install.merged(&other.install),
            global_args: self.global_args.merged(&other.global_args),
        }
    }
}

fn merge_unique(base: &[String], extra: &[String]) -> Vec<String> {
    let mut merged = base.to_vec();
    for item in extra {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_dependencies_adds_after_and_wants() {
        let unit = UnitOptions {
            description: Some("web".into()),
            after: vec!["network-online.target".into()],
            ..Default::default()
        };

        let merged = unit.with_dependencies(&["db".to_string(), "cache".to_string()]);

        assert_eq!(
            merged.after,
            vec!["network-online.target", "db.service", "cache.service"]
        );
        assert_eq!(merged.wants, vec!["db.service", "cache.service"]);
        assert_eq!(merged.description.as_deref(), Some("web"));
        // original untouched
        assert_eq!(unit.after, vec!["network-online.target"]);
    }

    #[test]
    fn test_with_dependencies_skips_duplicates() {
        let unit = UnitOptions {
            after: vec!["db.service".into()],
            ..Default::default()
        };
        let merged = unit.with_dependencies(&["db".to_string()]);
        assert_eq!(merged.after, vec!["db.service"]);
        assert_eq!(merged.wants, vec!["db.service"]);
    }

    #[test]
    fn test_service_merge_prefers_other() {
        let base = ServiceOptions {
            restart: Some("always".into()),
            restart_sec: Some("5".into()),
            ..Default::default()
        };
        let other = ServiceOptions {
            restart: Some("on-failure".into()),
            ..Default::default()
        };

        let merged = base.merged(&other);
        assert_eq!(merged.restart.as_deref(), Some("on-failure"));
        assert_eq!(merged.restart_sec.as_deref(), Some("5"));
    }

    #[test]
    fn test_global_args_keep_insertion_order() {
        let mut args = GlobalArgs::default();
        args.insert("log-level", "debug").insert("cgroup-manager", "systemd");

        let mut other = GlobalArgs::default();
        other.insert("log-level", "info");

        let merged = args.merged(&other);
        let keys: Vec<_> = merged.iter().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(keys, vec!["log-level=info", "cgroup-manager=systemd"]);
    }

    #[test]
    fn test_options_deserialize_from_toml() {
        let toml = r#"
[unit]
description = "My app"
after = ["network-online.target"]

[service]
restart = "always"

[install]
wanted_by = ["default.target"]

[global_args]
log-level = "info"
"#;

        let options: UnitFileOptions = toml::from_str(toml).unwrap();
        assert_eq!(options.unit.description.as_deref(), Some("My app"));
        assert_eq!(options.service.restart.as_deref(), Some("always"));
        assert_eq!(options.install.wanted_by, vec!["default.target"]);
        assert_eq!(options.global_args.0.get("log-level").map(String::as_str), Some("info"));
    }
}
