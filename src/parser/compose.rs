//! Compose manifest decoding and per-service mapping onto [`ContainerConfig`].

use crate::domain::{ContainerConfig, ParseError};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yml::Value;
use std::fmt;
use tracing::{debug, info, warn};

/// Top-level keys naming features Quadlet has no counterpart for.
const UNSUPPORTED_TOP_LEVEL: &[&str] = &["configs", "secrets"];

/// Top-level keys accepted without comment.
const IGNORED_TOP_LEVEL: &[&str] = &["version", "name", "networks", "volumes", "services"];

/// Service keys that are understood but cannot be translated.
const UNSUPPORTED_SERVICE_KEYS: &[&str] = &[
    "links",
    "external_links",
    "network_mode",
    "secrets",
    "configs",
    "deploy",
];

/// Every service of a manifest, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeProject {
    pub services: Vec<ComposeService>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeService {
    pub name: String,
    pub container: ContainerConfig,
    /// Names of the services this one depends on, in declaration order.
    pub depends_on: Vec<String>,
}

impl ComposeProject {
    pub fn service(&self, name: &str) -> Option<&ComposeService> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// A YAML scalar rendered back to text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(serde_yml::Number),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<Scalar>),
}

impl StringOrList {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::String(s) => vec![s],
            StringOrList::List(list) => list.iter().map(Scalar::to_string).collect(),
        }
    }

    fn joined(self) -> String {
        self.into_vec().join(" ")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ListOrMap {
    List(Vec<Scalar>),
    Map(IndexMap<String, Option<Scalar>>),
}

impl ListOrMap {
    /// Normalizes to `KEY<sep>VALUE` entries; a null map value yields `KEY<sep>`.
    fn into_entries(self, separator: char) -> Vec<String> {
        match self {
            ListOrMap::List(list) => list.iter().map(Scalar::to_string).collect(),
            ListOrMap::Map(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    Some(value) => format!("{key}{separator}{value}"),
                    None => format!("{key}{separator}"),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PortEntry {
    Number(u32),
    Short(String),
    Long(PortDefinition),
}

#[derive(Debug, Clone, Deserialize)]
struct PortDefinition {
    target: Scalar,
    published: Option<Scalar>,
    protocol: Option<String>,
    host_ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum VolumeEntry {
    Short(String),
    Long(VolumeDefinition),
}

#[derive(Debug, Clone, Deserialize)]
struct VolumeDefinition {
    #[serde(rename = "type")]
    kind: String,
    source: Option<String>,
    target: String,
    #[serde(default)]
    read_only: bool,
    tmpfs: Option<TmpfsDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
struct TmpfsDefinition {
    size: Option<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NetworkList {
    List(Vec<String>),
    Map(IndexMap<String, Option<NetworkAttachment>>),
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NetworkAttachment {
    ipv4_address: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DependsOn {
    List(Vec<String>),
    Map(IndexMap<String, Value>),
}

impl DependsOn {
    fn into_names(self) -> Vec<String> {
        match self {
            DependsOn::List(names) => names,
            DependsOn::Map(map) => map.into_keys().collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct HealthcheckDefinition {
    test: Option<StringOrList>,
    interval: Option<String>,
    timeout: Option<String>,
    retries: Option<u32>,
    start_period: Option<String>,
    #[serde(default)]
    disable: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingDefinition {
    driver: Option<String>,
    #[serde(default)]
    options: IndexMap<String, Option<Scalar>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum UlimitEntry {
    Single(Scalar),
    SoftHard { soft: Scalar, hard: Scalar },
}

/// The subset of a compose service this crate understands.
#[derive(Debug, Clone, Deserialize)]
struct ServiceDefinition {
    image: Option<String>,
    build: Option<Value>,
    container_name: Option<String>,
    command: Option<StringOrList>,
    entrypoint: Option<StringOrList>,
    working_dir: Option<String>,
    hostname: Option<String>,
    user: Option<Scalar>,
    environment: Option<ListOrMap>,
    env_file: Option<StringOrList>,
    labels: Option<ListOrMap>,
    annotations: Option<ListOrMap>,
    sysctls: Option<ListOrMap>,
    extra_hosts: Option<ListOrMap>,
    #[serde(default)]
    ports: Vec<PortEntry>,
    #[serde(default)]
    volumes: Vec<VolumeEntry>,
    tmpfs: Option<StringOrList>,
    networks: Option<NetworkList>,
    dns: Option<StringOrList>,
    dns_search: Option<StringOrList>,
    dns_opt: Option<StringOrList>,
    cap_add: Option<StringOrList>,
    cap_drop: Option<StringOrList>,
    devices: Option<StringOrList>,
    security_opt: Option<StringOrList>,
    healthcheck: Option<HealthcheckDefinition>,
    depends_on: Option<DependsOn>,
    restart: Option<Scalar>,
    #[serde(default)]
    privileged: bool,
    #[serde(default)]
    tty: bool,
    #[serde(default)]
    stdin_open: bool,
    #[serde(default)]
    init: bool,
    #[serde(default)]
    read_only: bool,
    mem_limit: Option<Scalar>,
    cpus: Option<Scalar>,
    shm_size: Option<Scalar>,
    pull_policy: Option<String>,
    stop_signal: Option<String>,
    stop_grace_period: Option<Scalar>,
    logging: Option<LoggingDefinition>,
    ulimits: Option<IndexMap<String, UlimitEntry>>,
    #[serde(flatten)]
    other: IndexMap<String, Value>,
}

/// Decodes a compose document. Structural problems abort the whole document;
/// keys that merely cannot be translated are logged and skipped.
pub fn parse_compose(text: &str) -> Result<ComposeProject, ParseError> {
    let document: Value = serde_yml::from_str(text)?;
    let Value::Mapping(root) = document else {
        return Err(ParseError::NotAnObject);
    };

    for key in root.keys() {
        let Some(key) = key.as_str() else {
            continue;
        };
        if UNSUPPORTED_TOP_LEVEL.contains(&key) {
            return Err(ParseError::UnsupportedFeature(key.to_string()));
        }
        if !IGNORED_TOP_LEVEL.contains(&key) && !key.starts_with("x-") {
            warn!("Ignoring unknown top-level key '{}'", key);
        }
    }

    let services = match root.get("services") {
        Some(Value::Mapping(services)) if !services.is_empty() => services,
        _ => return Err(ParseError::MissingServices),
    };

    let mut parsed = Vec::with_capacity(services.len());
    for (key, value) in services {
        let name = match key {
            Value::String(name) => name.clone(),
            other => scalar_key(other),
        };

        let definition: ServiceDefinition =
            serde_yml::from_value(value.clone()).map_err(|source| ParseError::InvalidService {
                service: name.clone(),
                source,
            })?;

        debug!("Mapping service {}", name);
        parsed.push(map_service(name, definition)?);
    }

    info!("Parsed {} service(s) from compose file", parsed.len());
    Ok(ComposeProject { services: parsed })
}

fn scalar_key(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn map_service(name: String, def: ServiceDefinition) -> Result<ComposeService, ParseError> {
    let mut config = ContainerConfig::default();

    config.image = match (def.image, def.build.is_some()) {
        (Some(image), _) if !image.trim().is_empty() => image,
        (_, true) => {
            warn!(
                "Service '{}' uses 'build'; using placeholder image '{}.build'",
                name, name
            );
            format!("{name}.build")
        }
        _ => return Err(ParseError::MissingImage { service: name }),
    };

    config.container_name = Some(def.container_name.unwrap_or_else(|| name.clone()));
    config.exec = def.command.map(StringOrList::joined);
    config.entrypoint = def.entrypoint.map(StringOrList::joined);
    config.working_dir = def.working_dir;
    config.hostname = def.hostname;
    if let Some(user) = def.user {
        config.apply_user_spec(&user.to_string());
    }

    if let Some(environment) = def.environment {
        config.environment = environment.into_entries('=');
    }
    config.environment_files = def.env_file.map(StringOrList::into_vec).unwrap_or_default();
    if let Some(labels) = def.labels {
        config.labels = labels.into_entries('=');
    }
    if let Some(annotations) = def.annotations {
        config.annotations = annotations.into_entries('=');
    }
    if let Some(sysctls) = def.sysctls {
        config.sysctls = sysctls.into_entries('=');
    }
    if let Some(hosts) = def.extra_hosts {
        config.add_hosts = hosts.into_entries(':');
    }

    for port in def.ports {
        map_port(&mut config, port);
    }
    for volume in def.volumes {
        map_volume(&mut config, &name, volume);
    }
    config
        .tmpfs
        .extend(def.tmpfs.map(StringOrList::into_vec).unwrap_or_default());

    if let Some(networks) = def.networks {
        map_networks(&mut config, networks);
    }
    config.dns = def.dns.map(StringOrList::into_vec).unwrap_or_default();
    config.dns_search = def.dns_search.map(StringOrList::into_vec).unwrap_or_default();
    config.dns_options = def.dns_opt.map(StringOrList::into_vec).unwrap_or_default();

    config.add_capabilities = def.cap_add.map(StringOrList::into_vec).unwrap_or_default();
    config.drop_capabilities = def.cap_drop.map(StringOrList::into_vec).unwrap_or_default();
    config.devices = def.devices.map(StringOrList::into_vec).unwrap_or_default();
    for opt in def.security_opt.map(StringOrList::into_vec).unwrap_or_default() {
        config.apply_security_opt(&opt);
    }
    config.read_only = def.read_only;
    config.init = def.init;

    if let Some(healthcheck) = def.healthcheck {
        map_healthcheck(&mut config, healthcheck);
    }

    config.pull = def.pull_policy;
    config.stop_signal = def.stop_signal;
    if let Some(period) = def.stop_grace_period.map(|p| p.to_string()) {
        match parse_duration_secs(&period) {
            Some(seconds) => config.stop_timeout = Some(seconds),
            None => warn!(
                "Service '{}': cannot parse stop_grace_period '{}', ignoring",
                name, period
            ),
        }
    }
    config.shm_size = def.shm_size.map(|s| s.to_string());

    if let Some(logging) = def.logging {
        config.log_driver = logging.driver;
        config.log_options = logging
            .options
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => format!("{key}={value}"),
                None => key,
            })
            .collect();
    }

    if let Some(ulimits) = def.ulimits {
        config.ulimits = ulimits
            .into_iter()
            .map(|(name, limit)| match limit {
                UlimitEntry::Single(value) => format!("{name}={value}"),
                UlimitEntry::SoftHard { soft, hard } => format!("{name}={soft}:{hard}"),
            })
            .collect();
    }

    config.restart = def.restart.map(|restart| match restart {
        // YAML 1.1 readers turn a bare `no` into false
        Scalar::Bool(false) => "no".to_string(),
        other => other.to_string(),
    });

    if def.privileged {
        config.push_podman_flag("--privileged", None);
    }
    if def.tty {
        config.push_podman_flag("--tty", None);
    }
    if def.stdin_open {
        config.push_podman_flag("--interactive", None);
    }
    if let Some(memory) = def.mem_limit {
        config.push_podman_flag("--memory", Some(&memory.to_string()));
    }
    if let Some(cpus) = def.cpus {
        config.push_podman_flag("--cpus", Some(&cpus.to_string()));
    }

    for key in def.other.keys() {
        if UNSUPPORTED_SERVICE_KEYS.contains(&key.as_str()) {
            warn!(
                "Service '{}': '{}' is not supported by Quadlet and was ignored",
                name, key
            );
        } else {
            warn!("Service '{}': ignoring unknown key '{}'", name, key);
        }
    }

    let depends_on = def.depends_on.map(DependsOn::into_names).unwrap_or_default();

    Ok(ComposeService {
        name,
        container: config,
        depends_on,
    })
}

fn map_port(config: &mut ContainerConfig, port: PortEntry) {
    match port {
        PortEntry::Number(port) => config.ports.push(port.to_string()),
        PortEntry::Short(spec) => config.ports.push(spec),
        PortEntry::Long(def) => {
            let suffix = match def.protocol.as_deref() {
                None | Some("tcp") => String::new(),
                Some(protocol) => format!("/{protocol}"),
            };

            match def.published {
                Some(published) => {
                    let host_ip = def.host_ip.map(|ip| format!("{ip}:")).unwrap_or_default();
                    config
                        .ports
                        .push(format!("{host_ip}{published}:{}{suffix}", def.target));
                }
                None => config
                    .expose_host_ports
                    .push(format!("{}{suffix}", def.target)),
            }
        }
    }
}

fn map_volume(config: &mut ContainerConfig, service: &str, volume: VolumeEntry) {
    let def = match volume {
        VolumeEntry::Short(spec) => {
            config.volumes.push(spec);
            return;
        }
        VolumeEntry::Long(def) => def,
    };

    match def.kind.as_str() {
        "bind" | "volume" => {
            let mut spec = match def.source {
                Some(source) if !source.is_empty() => format!("{source}:{}", def.target),
                _ => def.target,
            };
            if def.read_only {
                spec.push_str(":ro");
            }
            config.volumes.push(spec);
        }
        "tmpfs" => {
            let size = def.tmpfs.and_then(|t| t.size);
            config.tmpfs.push(match size {
                Some(size) => format!("{}:size={size}", def.target),
                None => def.target,
            });
        }
        other => warn!(
            "Service '{}': volume type '{}' is not supported, skipping {}",
            service, other, def.target
        ),
    }
}

fn map_networks(config: &mut ContainerConfig, networks: NetworkList) {
    match networks {
        NetworkList::List(names) => config.networks.extend(names),
        NetworkList::Map(map) => {
            for (name, attachment) in map {
                let attachment = attachment.unwrap_or_default();
                config.networks.push(match attachment.ipv4_address {
                    Some(ip) => format!("{name}:ip={ip}"),
                    None => name,
                });
                config.network_aliases.extend(attachment.aliases);
            }
        }
    }
}

fn map_healthcheck(config: &mut ContainerConfig, def: HealthcheckDefinition) {
    config.health.cmd = if def.disable {
        Some("none".to_string())
    } else {
        def.test.map(|test| match test {
            StringOrList::String(cmd) => cmd,
            StringOrList::List(parts) => {
                let mut parts: Vec<String> = parts.iter().map(Scalar::to_string).collect();
                match parts.first().map(String::as_str) {
                    Some("NONE") => return "none".to_string(),
                    Some("CMD") | Some("CMD-SHELL") => {
                        parts.remove(0);
                    }
                    _ => {}
                }
                parts.join(" ")
            }
        })
    };
    config.health.interval = def.interval;
    config.health.timeout = def.timeout;
    config.health.retries = def.retries;
    config.health.start_period = def.start_period;
}

/// Parses compose durations such as `10s`, `1m30s`, `1h` or `500ms` into
/// whole seconds, rounding down. A bare number is taken as seconds.
fn parse_duration_secs(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(seconds) = s.parse::<u32>() {
        return Some(seconds);
    }

    let mut total_ms: u64 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits_end == 0 {
            return None;
        }
        let value: u64 = rest[..digits_end].parse().ok()?;
        rest = &rest[digits_end..];

        let unit_end = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let multiplier = match &rest[..unit_end] {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            _ => return None,
        };
        total_ms = total_ms.checked_add(value.checked_mul(multiplier)?)?;
        rest = &rest[unit_end..];
    }

    u32::try_from(total_ms / 1_000).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(yaml: &str) -> ComposeService {
        let project = parse_compose(yaml).unwrap();
        assert_eq!(project.services.len(), 1);
        project.services.into_iter().next().unwrap()
    }

    #[test]
    fn test_services_keep_document_order() {
        let yaml = r#"
services:
  web:
    image: nginx
  db:
    image: postgres:16
  cache:
    image: redis:7
"#;
        let project = parse_compose(yaml).unwrap();
        let names: Vec<_> = project.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["web", "db", "cache"]);
        assert_eq!(project.service("db").unwrap().container.image, "postgres:16");
    }

    #[test]
    fn test_rejects_invalid_yaml() {
        let err = parse_compose("services: [unclosed").unwrap_err();
        assert!(matches!(err, ParseError::Yaml(_)));
    }

    #[test]
    fn test_rejects_non_mapping_document() {
        assert!(matches!(
            parse_compose("- a\n- b\n").unwrap_err(),
            ParseError::NotAnObject
        ));
        assert!(matches!(
            parse_compose("just a string").unwrap_err(),
            ParseError::NotAnObject
        ));
    }

    #[test]
    fn test_rejects_missing_or_empty_services() {
        assert!(matches!(
            parse_compose("version: '3'\n").unwrap_err(),
            ParseError::MissingServices
        ));
        assert!(matches!(
            parse_compose("services: {}\n").unwrap_err(),
            ParseError::MissingServices
        ));
    }

    #[test]
    fn test_rejects_unsupported_top_level_feature() {
        let yaml = r#"
services:
  web:
    image: nginx
configs:
  app_config:
    file: ./app.conf
"#;
        let err = parse_compose(yaml).unwrap_err();
        assert!(matches!(&err, ParseError::UnsupportedFeature(key) if key == "configs"));
        assert!(err.to_string().contains("configs"));
    }

    #[test]
    fn test_rejects_service_without_image_or_build() {
        let yaml = r#"
services:
  worker:
    command: run
"#;
        let err = parse_compose(yaml).unwrap_err();
        assert!(matches!(&err, ParseError::MissingImage { service } if service == "worker"));
    }

    #[test]
    fn test_build_uses_placeholder_image() {
        let svc = single("services:\n  api:\n    build: .\n");
        assert_eq!(svc.container.image, "api.build");
    }

    #[test]
    fn test_rejects_malformed_service() {
        let yaml = "services:\n  web:\n    image: nginx\n    ports: 12\n";
        let err = parse_compose(yaml).unwrap_err();
        assert!(matches!(&err, ParseError::InvalidService { service, .. } if service == "web"));
    }

    #[test]
    fn test_environment_list_and_map() {
        let svc = single(
            r#"
services:
  app:
    image: app
    environment:
      - A=1
      - B=two words
"#,
        );
        assert_eq!(svc.container.environment, vec!["A=1", "B=two words"]);

        let svc = single(
            r#"
services:
  app:
    image: app
    environment:
      PORT: 8080
      DEBUG: true
      NAME: demo
      EMPTY:
"#,
        );
        assert_eq!(
            svc.container.environment,
            vec!["PORT=8080", "DEBUG=true", "NAME=demo", "EMPTY="]
        );
    }

    #[test]
    fn test_float_values_keep_their_decimal_point() {
        let svc = single(
            r#"
services:
  app:
    image: app
    cpus: 2.0
    environment:
      VERSION: 1.0
      RATIO: 0.25
"#,
        );
        assert_eq!(svc.container.environment, vec!["VERSION=1.0", "RATIO=0.25"]);
        assert_eq!(svc.container.podman_args, "--cpus 2.0");
    }

    #[test]
    fn test_labels_map() {
        let svc = single(
            r#"
services:
  app:
    image: app
    labels:
      com.example.team: platform
"#,
        );
        assert_eq!(svc.container.labels, vec!["com.example.team=platform"]);
    }

    #[test]
    fn test_ports_short_and_long() {
        let svc = single(
            r#"
services:
  app:
    image: app
    ports:
      - "8080:80"
      - 9000
      - "5353:53/udp"
      - target: 443
        published: 8443
        protocol: tcp
      - target: 53
        published: "1053"
        protocol: udp
      - target: 9090
"#,
        );
        assert_eq!(
            svc.container.ports,
            vec!["8080:80", "9000", "5353:53/udp", "8443:443", "1053:53/udp"]
        );
        assert_eq!(svc.container.expose_host_ports, vec!["9090"]);
    }

    #[test]
    fn test_volumes_short_and_long() {
        let svc = single(
            r#"
services:
  app:
    image: app
    volumes:
      - ./data:/data:z
      - type: bind
        source: /etc/app
        target: /config
        read_only: true
      - type: volume
        source: cache
        target: /cache
      - type: tmpfs
        target: /run/app
        tmpfs:
          size: 64m
      - type: tmpfs
        target: /scratch
"#,
        );
        assert_eq!(
            svc.container.volumes,
            vec!["./data:/data:z", "/etc/app:/config:ro", "cache:/cache"]
        );
        assert_eq!(svc.container.tmpfs, vec!["/run/app:size=64m", "/scratch"]);
    }

    #[test]
    fn test_networks_list_and_map() {
        let svc = single(
            r#"
services:
  app:
    image: app
    networks:
      - front
      - back
"#,
        );
        assert_eq!(svc.container.networks, vec!["front", "back"]);

        let svc = single(
            r#"
services:
  app:
    image: app
    networks:
      front:
        ipv4_address: 10.0.0.5
        aliases:
          - api
          - api.internal
      back:
"#,
        );
        assert_eq!(svc.container.networks, vec!["front:ip=10.0.0.5", "back"]);
        assert_eq!(svc.container.network_aliases, vec!["api", "api.internal"]);
    }

    #[test]
    fn test_healthcheck_forms() {
        let svc = single(
            r#"
services:
  app:
    image: app
    healthcheck:
      test: ["CMD", "curl", "-f", "http://localhost"]
      interval: 30s
      timeout: 5s
      retries: 3
      start_period: 10s
"#,
        );
        let health = &svc.container.health;
        assert_eq!(health.cmd.as_deref(), Some("curl -f http://localhost"));
        assert_eq!(health.interval.as_deref(), Some("30s"));
        assert_eq!(health.timeout.as_deref(), Some("5s"));
        assert_eq!(health.retries, Some(3));
        assert_eq!(health.start_period.as_deref(), Some("10s"));

        let svc = single(
            r#"
services:
  app:
    image: app
    healthcheck:
      test: pg_isready -U postgres
"#,
        );
        assert_eq!(svc.container.health.cmd.as_deref(), Some("pg_isready -U postgres"));

        let svc = single(
            r#"
services:
  app:
    image: app
    healthcheck:
      test: ["CMD", "true"]
      disable: true
"#,
        );
        assert_eq!(svc.container.health.cmd.as_deref(), Some("none"));
    }

    #[test]
    fn test_healthcheck_list_is_joined_with_spaces() {
        let svc = single(
            r#"
services:
  app:
    image: app
    healthcheck:
      test: ["curl", "-f", "http://localhost/health"]
"#,
        );
        assert_eq!(
            svc.container.health.cmd.as_deref(),
            Some("curl -f http://localhost/health")
        );

        let svc = single(
            r#"
services:
  app:
    image: app
    healthcheck:
      test: ["CMD-SHELL", "pg_isready -U postgres || exit 1"]
"#,
        );
        assert_eq!(
            svc.container.health.cmd.as_deref(),
            Some("pg_isready -U postgres || exit 1")
        );

        let svc = single("services:\n  a:\n    image: a\n    healthcheck:\n      test: [\"NONE\"]\n");
        assert_eq!(svc.container.health.cmd.as_deref(), Some("none"));
    }

    #[test]
    fn test_depends_on_list_and_map() {
        let yaml = r#"
services:
  web:
    image: nginx
    depends_on:
      - db
      - cache
  api:
    image: api
    depends_on:
      db:
        condition: service_healthy
"#;
        let project = parse_compose(yaml).unwrap();
        assert_eq!(project.services[0].depends_on, vec!["db", "cache"]);
        assert_eq!(project.services[1].depends_on, vec!["db"]);
    }

    #[test]
    fn test_restart_is_kept_verbatim() {
        let svc = single("services:\n  a:\n    image: a\n    restart: unless-stopped\n");
        assert_eq!(svc.container.restart.as_deref(), Some("unless-stopped"));

        let svc = single("services:\n  a:\n    image: a\n    restart: \"no\"\n");
        assert_eq!(svc.container.restart.as_deref(), Some("no"));
    }

    #[test]
    fn test_passthrough_fields() {
        let svc = single(
            r#"
services:
  app:
    image: app
    privileged: true
    tty: true
    stdin_open: true
    mem_limit: 512m
    cpus: 1.5
    security_opt:
      - no-new-privileges:true
      - apparmor:unconfined
"#,
        );
        assert!(svc.container.no_new_privileges);
        assert_eq!(
            svc.container.podman_args,
            "--security-opt apparmor:unconfined --privileged --tty --interactive --memory 512m --cpus 1.5"
        );
    }

    #[test]
    fn test_unsupported_service_keys_are_tolerated() {
        let svc = single(
            r#"
services:
  app:
    image: app
    links:
      - db
    network_mode: host
    deploy:
      replicas: 2
    secrets:
      - token
    ports:
      - "80:80"
"#,
        );
        assert_eq!(svc.container.ports, vec!["80:80"]);
    }

    #[test]
    fn test_identity_fields() {
        let svc = single(
            r#"
services:
  app:
    image: ghcr.io/org/app:1.0
    container_name: my-app
    command: ["serve", "--port", 8080]
    entrypoint: /entrypoint.sh
    working_dir: /srv
    hostname: app.local
    user: "1000:1000"
    stop_grace_period: 1m30s
    stop_signal: SIGTERM
    init: true
    read_only: true
"#,
        );
        let c = &svc.container;
        assert_eq!(c.container_name.as_deref(), Some("my-app"));
        assert_eq!(c.exec.as_deref(), Some("serve --port 8080"));
        assert_eq!(c.entrypoint.as_deref(), Some("/entrypoint.sh"));
        assert_eq!(c.working_dir.as_deref(), Some("/srv"));
        assert_eq!(c.hostname.as_deref(), Some("app.local"));
        assert_eq!(c.user.as_deref(), Some("1000"));
        assert_eq!(c.group.as_deref(), Some("1000"));
        assert_eq!(c.stop_timeout, Some(90));
        assert_eq!(c.stop_signal.as_deref(), Some("SIGTERM"));
        assert!(c.init);
        assert!(c.read_only);
    }

    #[test]
    fn test_container_name_defaults_to_service_name() {
        let svc = single("services:\n  worker:\n    image: busybox\n");
        assert_eq!(svc.container.container_name.as_deref(), Some("worker"));
    }

    #[test]
    fn test_logging_and_ulimits() {
        let svc = single(
            r#"
services:
  app:
    image: app
    logging:
      driver: journald
      options:
        tag: app
    ulimits:
      nproc: 65535
      nofile:
        soft: 20000
        hard: 40000
"#,
        );
        assert_eq!(svc.container.log_driver.as_deref(), Some("journald"));
        assert_eq!(svc.container.log_options, vec!["tag=app"]);
        assert_eq!(svc.container.ulimits, vec!["nproc=65535", "nofile=20000:40000"]);
    }

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("10s"), Some(10));
        assert_eq!(parse_duration_secs("1m30s"), Some(90));
        assert_eq!(parse_duration_secs("1h"), Some(3600));
        assert_eq!(parse_duration_secs("1500ms"), Some(1));
        assert_eq!(parse_duration_secs("45"), Some(45));
        assert_eq!(parse_duration_secs("soon"), None);
        assert_eq!(parse_duration_secs("5x"), None);
    }

    #[test]
    fn test_parse_duration_secs_rejects_overflow() {
        assert_eq!(parse_duration_secs("18446744073709552s"), None);
        assert_eq!(parse_duration_secs("9223372036854775807h"), None);
        assert_eq!(parse_duration_secs("18446744073709551615ms1ms"), None);
    }

    #[test]
    fn test_oversized_stop_grace_period_is_ignored() {
        let svc = single(
            "services:\n  a:\n    image: a\n    stop_grace_period: 18446744073709552s\n",
        );
        assert_eq!(svc.container.stop_timeout, None);
    }
}
