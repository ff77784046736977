use super::error::ValidationError;
use crate::parser::escape::shell_escape;

/// How the container reports readiness to systemd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyMode {
    /// Leave the decision to Quadlet (key omitted).
    #[default]
    Default,
    /// The container itself sends sd_notify (`Notify=true`).
    Container,
    /// Ready once the health check passes (`Notify=healthy`).
    Healthy,
}

/// Health check settings, both the regular and the startup check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCheck {
    pub cmd: Option<String>,
    pub interval: Option<String>,
    pub timeout: Option<String>,
    pub retries: Option<u32>,
    pub start_period: Option<String>,
    pub startup_cmd: Option<String>,
    pub startup_interval: Option<String>,
    pub startup_retries: Option<u32>,
    pub startup_success: Option<u32>,
    pub startup_timeout: Option<String>,
    pub on_failure: Option<String>,
}

/// Normalized description of one container, filled by either the run-command
/// parser or the compose parser and consumed by the unit generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    pub image: String,
    pub container_name: Option<String>,
    /// Command override, already joined into one command line.
    pub exec: Option<String>,
    pub working_dir: Option<String>,
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub group: Option<String>,
    pub entrypoint: Option<String>,
    pub pod: Option<String>,
    pub ip: Option<String>,
    pub pull: Option<String>,
    pub stop_signal: Option<String>,
    pub stop_timeout: Option<u32>,
    pub timezone: Option<String>,
    pub shm_size: Option<String>,
    pub userns: Option<String>,
    pub log_driver: Option<String>,
    pub seccomp_profile: Option<String>,
    pub health: HealthCheck,
    pub notify: NotifyMode,
    /// Restart policy as written in a manifest; translated by the orchestrator.
    pub restart: Option<String>,

    pub ports: Vec<String>,
    pub expose_host_ports: Vec<String>,
    pub volumes: Vec<String>,
    pub mounts: Vec<String>,
    pub environment: Vec<String>,
    pub environment_files: Vec<String>,
    pub labels: Vec<String>,
    pub annotations: Vec<String>,
    pub add_capabilities: Vec<String>,
    pub drop_capabilities: Vec<String>,
    pub devices: Vec<String>,
    pub networks: Vec<String>,
    pub network_aliases: Vec<String>,
    pub dns: Vec<String>,
    pub dns_options: Vec<String>,
    pub dns_search: Vec<String>,
    pub add_hosts: Vec<String>,
    pub tmpfs: Vec<String>,
    pub log_options: Vec<String>,
    pub secrets: Vec<String>,
    pub ulimits: Vec<String>,
    pub sysctls: Vec<String>,

    pub read_only: bool,
    /// Quadlet mounts tmpfs read-only by default; only `false` is rendered.
    pub read_only_tmpfs: bool,
    pub no_new_privileges: bool,
    pub security_label_disable: bool,
    pub init: bool,
    pub environment_host: bool,

    /// Extra podman arguments with no dedicated key, each token shell-escaped.
    pub podman_args: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            image: String::new(),
            container_name: None,
            exec: None,
            working_dir: None,
            hostname: None,
            user: None,
            group: None,
            entrypoint: None,
            pod: None,
            ip: None,
            pull: None,
            stop_signal: None,
            stop_timeout: None,
            timezone: None,
            shm_size: None,
            userns: None,
            log_driver: None,
            seccomp_profile: None,
            health: HealthCheck::default(),
            notify: NotifyMode::Default,
            restart: None,
            ports: Vec::new(),
            expose_host_ports: Vec::new(),
            volumes: Vec::new(),
            mounts: Vec::new(),
            environment: Vec::new(),
            environment_files: Vec::new(),
            labels: Vec::new(),
            annotations: Vec::new(),
            add_capabilities: Vec::new(),
            drop_capabilities: Vec::new(),
            devices: Vec::new(),
            networks: Vec::new(),
            network_aliases: Vec::new(),
            dns: Vec::new(),
            dns_options: Vec::new(),
            dns_search: Vec::new(),
            add_hosts: Vec::new(),
            tmpfs: Vec::new(),
            log_options: Vec::new(),
            secrets: Vec::new(),
            ulimits: Vec::new(),
            sysctls: Vec::new(),
            read_only: false,
            read_only_tmpfs: true,
            no_new_privileges: false,
            security_label_disable: false,
            init: false,
            environment_host: false,
            podman_args: String::new(),
        }
    }
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    pub fn set_image(&mut self, image: impl Into<String>) -> &mut Self {
        self.image = image.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = Some(name.into());
        self
    }

    pub fn add_port(&mut self, port: impl Into<String>) -> &mut Self {
        self.ports.push(port.into());
        self
    }

    pub fn add_volume(&mut self, volume: impl Into<String>) -> &mut Self {
        self.volumes.push(volume.into());
        self
    }

    pub fn add_environment(&mut self, env: impl Into<String>) -> &mut Self {
        self.environment.push(env.into());
        self
    }

    pub fn add_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.labels.push(label.into());
        self
    }

    /// Appends one token to `podman_args`, shell-escaping it first.
    pub fn add_podman_arg(&mut self, token: &str) -> &mut Self {
        if !self.podman_args.is_empty() {
            self.podman_args.push(' ');
        }
        self.podman_args.push_str(&shell_escape(token));
        self
    }

    /// Appends `flag` and, when present, its value as a separate escaped token.
    pub fn push_podman_flag(&mut self, flag: &str, value: Option<&str>) -> &mut Self {
        self.add_podman_arg(flag);
        if let Some(value) = value {
            self.add_podman_arg(value);
        }
        self
    }

    /// Applies a `user[:group]` specification.
    pub fn apply_user_spec(&mut self, spec: &str) {
        match spec.split_once(':') {
            Some((user, group)) => {
                self.user = Some(user.to_string());
                if !group.is_empty() {
                    self.group = Some(group.to_string());
                }
            }
            None => self.user = Some(spec.to_string()),
        }
    }

    /// Maps a `--security-opt` value onto dedicated fields, falling back to
    /// `podman_args` for anything Quadlet has no key for.
    pub fn apply_security_opt(&mut self, opt: &str) {
        let (key, value) = match opt.split_once(['=', ':']) {
            Some((key, value)) => (key, Some(value)),
            None => (opt, None),
        };

        match (key, value) {
            ("no-new-privileges", None | Some("true")) => self.no_new_privileges = true,
            ("no-new-privileges", Some("false")) => self.no_new_privileges = false,
            ("label", Some("disable")) => self.security_label_disable = true,
            ("seccomp", Some(profile)) if !profile.is_empty() => {
                self.seccomp_profile = Some(profile.to_string())
            }
            _ => {
                self.push_podman_flag("--security-opt", Some(opt));
            }
        }
    }

    /// Name used for the container and its unit file: the explicit container
    /// name, or the image's repository name without registry path and tag.
    pub fn default_name(&self) -> String {
        if let Some(name) = self.container_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        image_base_name(&self.image)
    }

    pub fn unit_file_name(&self) -> String {
        format!("{}.container", self.default_name())
    }

    /// Checks everything the generator relies on and reports all problems at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.image.trim().is_empty() {
            errors.push("image is required".to_string());
        }

        for port in &self.ports {
            if let Err(e) = validate_port_mapping(port) {
                errors.push(e);
            }
        }

        for port in &self.expose_host_ports {
            let (number, protocol) = split_protocol(port);
            if let Err(e) = check_protocol(port, protocol) {
                errors.push(e);
            } else if !is_valid_port(number) {
                errors.push(format!(
                    "invalid exposed port '{port}': must be a number between 1 and 65535"
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }
}

/// `registry.example.com/ns/name:tag` -> `name`.
pub fn image_base_name(image: &str) -> String {
    let without_digest = image.split('@').next().unwrap_or(image);
    let last_segment = without_digest.rsplit('/').next().unwrap_or(without_digest);
    let name = match last_segment.split_once(':') {
        Some((name, _tag)) => name,
        None => last_segment,
    };
    name.to_string()
}

/// Validates `[ip:][host:]container[/protocol]`.
pub fn validate_port_mapping(spec: &str) -> Result<(), String> {
    let (mapping, protocol) = split_protocol(spec);
    check_protocol(spec, protocol)?;

    let (host, container) = match mapping.rsplit_once(':') {
        Some((rest, container)) => match rest.rsplit_once(':') {
            // ip:host:container, an empty host lets podman pick one
            Some((_ip, host)) => ((!host.is_empty()).then_some(host), container),
            None => (Some(rest), container),
        },
        None => (None, mapping),
    };

    if let Some(host) = host {
        if !is_valid_port(host) {
            return Err(format!(
                "invalid port mapping '{spec}': host port '{host}' must be a number between 1 and 65535"
            ));
        }
    }

    if !is_valid_port(container) {
        return Err(format!(
            "invalid port mapping '{spec}': container port '{container}' must be a number between 1 and 65535"
        ));
    }

    Ok(())
}

fn split_protocol(spec: &str) -> (&str, Option<&str>) {
    match spec.rsplit_once('/') {
        Some((mapping, protocol)) => (mapping, Some(protocol)),
        None => (spec, None),
    }
}

fn check_protocol(spec: &str, protocol: Option<&str>) -> Result<(), String> {
    match protocol {
        None | Some("tcp") | Some("udp") => Ok(()),
        Some(other) => Err(format!(
            "invalid port mapping '{spec}': unsupported protocol '{other}'"
        )),
    }
}

fn is_valid_port(value: &str) -> bool {
    value.parse::<u32>().is_ok_and(|port| (1..=65535).contains(&port))
}
