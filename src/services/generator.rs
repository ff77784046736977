//! Renders a [`ContainerConfig`] plus option bags as Quadlet unit text.

use crate::domain::{ContainerConfig, NotifyMode, UnitFileOptions};
use std::borrow::Cow;

/// How a single value is written after `Key=`.
#[derive(Debug, Clone, Copy)]
enum UnitValue<'a> {
    /// Free text, quoted when it contains whitespace.
    Text(&'a str),
    Int(u32),
    Bool(bool),
}

struct Section {
    header: &'static str,
    lines: Vec<String>,
}

impl Section {
    fn new(header: &'static str) -> Self {
        Self {
            header,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, key: &str, value: UnitValue<'_>) {
        let rendered = match value {
            UnitValue::Text(text) => escape_value(text),
            UnitValue::Int(n) => Cow::Owned(n.to_string()),
            UnitValue::Bool(b) => Cow::Owned(b.to_string()),
        };
        self.lines.push(format!("{key}={rendered}"));
    }

    fn text(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.push(key, UnitValue::Text(value));
        }
    }

    fn int(&mut self, key: &str, value: Option<u32>) {
        if let Some(value) = value {
            self.push(key, UnitValue::Int(value));
        }
    }

    /// Emits `Key=true` only when set.
    fn flag(&mut self, key: &str, enabled: bool) {
        if enabled {
            self.push(key, UnitValue::Bool(true));
        }
    }

    fn each(&mut self, key: &str, values: &[String]) {
        for value in values {
            self.push(key, UnitValue::Text(value));
        }
    }

    fn joined(&mut self, key: &str, values: &[String]) {
        if !values.is_empty() {
            self.push(key, UnitValue::Text(&values.join(" ")));
        }
    }

    fn write_to(&self, out: &mut String) {
        if self.lines.is_empty() {
            return;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push('[');
        out.push_str(self.header);
        out.push_str("]\n");
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Quotes a value containing whitespace, escaping embedded `"`.
pub fn escape_value(value: &str) -> Cow<'_, str> {
    if value.contains(char::is_whitespace) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\\\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Produces the full `.container` file. Empty sections are left out and the
/// result always ends with a newline (or is empty).
pub fn generate(config: &ContainerConfig, options: &UnitFileOptions) -> String {
    let mut out = String::new();

    unit_section(options).write_to(&mut out);
    container_section(config).write_to(&mut out);
    global_args_section(options).write_to(&mut out);
    service_section(options).write_to(&mut out);
    install_section(options).write_to(&mut out);

    out
}

fn unit_section(options: &UnitFileOptions) -> Section {
    let unit = &options.unit;
    let mut section = Section::new("Unit");
    section.text("Description", unit.description.as_deref());
    section.each("Documentation", &unit.documentation);
    section.each("After", &unit.after);
    section.each("Before", &unit.before);
    section.each("Wants", &unit.wants);
    section.each("Requires", &unit.requires);
    section
}

fn container_section(c: &ContainerConfig) -> Section {
    let mut s = Section::new("Container");

    s.push("Image", UnitValue::Text(&c.image));
    s.text("ContainerName", c.container_name.as_deref());
    s.text("Pod", c.pod.as_deref());
    s.text("Entrypoint", c.entrypoint.as_deref());
    s.text("Exec", c.exec.as_deref());
    s.text("WorkingDir", c.working_dir.as_deref());

    s.text("HostName", c.hostname.as_deref());
    s.each("Network", &c.networks);
    s.each("NetworkAlias", &c.network_aliases);
    s.text("IP", c.ip.as_deref());
    s.each("PublishPort", &c.ports);
    s.each("ExposeHostPort", &c.expose_host_ports);
    if c.dns.iter().any(|d| d == "none") {
        s.push("DNS", UnitValue::Text("none"));
    } else {
        s.each("DNS", &c.dns);
        s.each("DNSOption", &c.dns_options);
        s.each("DNSSearch", &c.dns_search);
    }
    s.each("AddHost", &c.add_hosts);

    s.each("Volume", &c.volumes);
    s.each("Mount", &c.mounts);
    s.each("Tmpfs", &c.tmpfs);

    s.each("Environment", &c.environment);
    s.each("EnvironmentFile", &c.environment_files);
    s.flag("EnvironmentHost", c.environment_host);

    s.each("Label", &c.labels);
    s.each("Annotation", &c.annotations);

    s.joined("AddCapability", &c.add_capabilities);
    s.joined("DropCapability", &c.drop_capabilities);
    s.flag("NoNewPrivileges", c.no_new_privileges);
    s.flag("SecurityLabelDisable", c.security_label_disable);
    s.text("SeccompProfile", c.seccomp_profile.as_deref());
    s.flag("ReadOnly", c.read_only);
    if !c.read_only_tmpfs {
        s.push("ReadOnlyTmpfs", UnitValue::Bool(false));
    }
    s.each("AddDevice", &c.devices);
    s.each("Secret", &c.secrets);

    s.text("User", c.user.as_deref());
    s.text("Group", c.group.as_deref());
    s.text("UserNS", c.userns.as_deref());

    s.flag("RunInit", c.init);
    s.text("Pull", c.pull.as_deref());
    s.text("StopSignal", c.stop_signal.as_deref());
    s.int("StopTimeout", c.stop_timeout);
    s.text("Timezone", c.timezone.as_deref());

    let h = &c.health;
    s.text("HealthCmd", h.cmd.as_deref());
    s.text("HealthInterval", h.interval.as_deref());
    s.text("HealthTimeout", h.timeout.as_deref());
    s.int("HealthRetries", h.retries);
    s.text("HealthStartPeriod", h.start_period.as_deref());
    s.text("HealthStartupCmd", h.startup_cmd.as_deref());
    s.text("HealthStartupInterval", h.startup_interval.as_deref());
    s.int("HealthStartupRetries", h.startup_retries);
    s.int("HealthStartupSuccess", h.startup_success);
    s.text("HealthStartupTimeout", h.startup_timeout.as_deref());
    s.text("HealthOnFailure", h.on_failure.as_deref());

    match c.notify {
        NotifyMode::Default => {}
        NotifyMode::Container => s.push("Notify", UnitValue::Bool(true)),
        NotifyMode::Healthy => s.push("Notify", UnitValue::Text("healthy")),
    }

    s.text("LogDriver", c.log_driver.as_deref());
    s.each("LogOpt", &c.log_options);

    s.each("Ulimit", &c.ulimits);
    s.each("Sysctl", &c.sysctls);
    s.text("ShmSize", c.shm_size.as_deref());

    if !c.podman_args.is_empty() {
        s.push("PodmanArgs", UnitValue::Text(&c.podman_args));
    }

    s
}

fn global_args_section(options: &UnitFileOptions) -> Section {
    let mut section = Section::new("GlobalArgs");
    for (key, value) in options.global_args.iter() {
        section.push(key, UnitValue::Text(value));
    }
    section
}

fn service_section(options: &UnitFileOptions) -> Section {
    let service = &options.service;
    let mut section = Section::new("Service");
    section.text("Restart", service.restart.as_deref());
    section.text("RestartSec", service.restart_sec.as_deref());
    section.text("TimeoutStartSec", service.timeout_start_sec.as_deref());
    section.text("TimeoutStopSec", service.timeout_stop_sec.as_deref());
    section
}

fn install_section(options: &UnitFileOptions) -> Section {
    let install = &options.install;
    let mut section = Section::new("Install");
    section.each("WantedBy", &install.wanted_by);
    section.each("RequiredBy", &install.required_by);
    section
}
