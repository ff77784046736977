//! Turns a `docker run` / `podman run` invocation into a [`ContainerConfig`].

use super::heuristics::{ArgumentRole, classify_flag_argument};
use super::tokenizer::{CommandInput, tokenize};
use crate::domain::{ContainerConfig, NotifyMode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

type SwitchHandler = fn(&mut ContainerConfig, Option<&str>);
type ValueHandler = fn(&mut ContainerConfig, &str);

/// How a known flag is applied to the model.
#[derive(Clone, Copy)]
enum FlagSpec {
    /// Takes no following token; receives the inline `=value` if one was given.
    Switch(SwitchHandler),
    /// Takes a value, inline or as the next token.
    Value(ValueHandler),
}

/// Parses a run command. Never fails: anything it cannot map lands in
/// `podman_args`, and a missing image is left for validation to report.
pub fn parse_run_command(input: impl Into<CommandInput>) -> ContainerConfig {
    let tokens = tokenize(input);
    RunCommandParser::new(&tokens).parse()
}

struct RunCommandParser<'a> {
    tokens: &'a [String],
    cursor: usize,
    config: ContainerConfig,
}

impl<'a> RunCommandParser<'a> {
    fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            cursor: 0,
            config: ContainerConfig::default(),
        }
    }

    fn parse(mut self) -> ContainerConfig {
        self.skip_preamble();
        let tokens = self.tokens;

        while let Some(token) = tokens.get(self.cursor) {
            if token == "--" {
                self.cursor += 1;
                self.take_image();
                break;
            }

            if !token.starts_with('-') {
                self.take_image();
                break;
            }

            self.cursor += self.resolve_flag(token);
        }

        self.config
    }

    /// Skips `docker`/`podman` and `run` (or `container run`) when present.
    fn skip_preamble(&mut self) {
        let tokens = self.tokens;

        if let Some(first) = tokens.first() {
            let program = Path::new(first)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            if matches!(program, "docker" | "podman") {
                self.cursor += 1;
            }
        }

        match tokens.get(self.cursor).map(String::as_str) {
            Some("run" | "create") => self.cursor += 1,
            Some("container")
                if matches!(
                    tokens.get(self.cursor + 1).map(String::as_str),
                    Some("run" | "create")
                ) =>
            {
                self.cursor += 2
            }
            _ => {}
        }
    }

    /// The current token is the image; everything after it is the command.
    fn take_image(&mut self) {
        let Some(image) = self.tokens.get(self.cursor) else {
            return;
        };
        self.config.set_image(image.as_str());

        let command = &self.tokens[self.cursor + 1..];
        if !command.is_empty() {
            self.config.exec = Some(command.join(" "));
        }
        self.cursor = self.tokens.len();
    }

    /// Applies the flag at the cursor and returns how many tokens it used.
    fn resolve_flag(&mut self, token: &'a str) -> usize {
        let stripped = token.trim_start_matches('-');
        let (name, inline) = match stripped.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (stripped, None),
        };

        if let Some(spec) = dispatch_table().get(name).copied() {
            return self.apply(spec, inline);
        }

        if let Some(consumed) = self.resolve_cluster(token) {
            return consumed;
        }

        self.pass_through_unknown(token, inline.is_some())
    }

    fn apply(&mut self, spec: FlagSpec, inline: Option<&str>) -> usize {
        let tokens = self.tokens;

        match spec {
            FlagSpec::Switch(handler) => {
                handler(&mut self.config, inline);
                1
            }
            FlagSpec::Value(handler) => match inline {
                Some(value) => {
                    handler(&mut self.config, value);
                    1
                }
                None => match tokens.get(self.cursor + 1) {
                    Some(value) => {
                        handler(&mut self.config, value);
                        2
                    }
                    None => {
                        debug!("flag {} has no value, ignoring", tokens[self.cursor]);
                        1
                    }
                },
            },
        }
    }

    /// Expands clusters of short flags such as `-it`, `-dp 8080:80` or
    /// `-p8080:80`. Letters up to the first value flag must be switches; any
    /// characters after a value flag's letter are its value.
    fn resolve_cluster(&mut self, token: &str) -> Option<usize> {
        let letters = token
            .strip_prefix('-')
            .filter(|l| l.len() > 1 && !l.starts_with('-'))?;

        let table = dispatch_table();
        let mut switches = Vec::new();

        for (index, letter) in letters.char_indices() {
            let mut buf = [0u8; 4];
            match table.get(&*letter.encode_utf8(&mut buf)).copied()? {
                FlagSpec::Switch(handler) => switches.push(handler),
                FlagSpec::Value(handler) => {
                    let attached = &letters[index + letter.len_utf8()..];
                    for switch in switches {
                        switch(&mut self.config, None);
                    }
                    if attached.is_empty() {
                        return Some(self.apply(FlagSpec::Value(handler), None));
                    }
                    handler(&mut self.config, attached);
                    return Some(1);
                }
            }
        }

        for switch in switches {
            switch(&mut self.config, None);
        }
        Some(1)
    }

    fn pass_through_unknown(&mut self, token: &str, has_inline_value: bool) -> usize {
        debug!("unknown flag {} passed through to PodmanArgs", token);
        self.config.add_podman_arg(token);

        if has_inline_value {
            return 1;
        }

        let tokens = self.tokens;
        let Some(next) = tokens.get(self.cursor + 1) else {
            return 1;
        };
        if next.starts_with('-') {
            return 1;
        }

        match classify_flag_argument(next, &tokens[self.cursor + 2..]) {
            ArgumentRole::FlagValue => {
                self.config.add_podman_arg(next);
                2
            }
            ArgumentRole::Image => 1,
        }
    }
}

fn enabled(value: Option<&str>) -> bool {
    !matches!(value, Some("false") | Some("0"))
}

fn dispatch_table() -> &'static HashMap<&'static str, FlagSpec> {
    static TABLE: OnceLock<HashMap<&'static str, FlagSpec>> = OnceLock::new();
    TABLE.get_or_init(build_dispatch_table)
}

fn build_dispatch_table() -> HashMap<&'static str, FlagSpec> {
    use FlagSpec::{Switch, Value};

    let mut table = HashMap::new();
    let mut add = |names: &[&'static str], spec: FlagSpec| {
        for name in names {
            table.insert(*name, spec);
        }
    };

    // identity
    add(&["name"], Value(|c, v| c.container_name = Some(v.to_string())));
    add(&["entrypoint"], Value(|c, v| c.entrypoint = Some(v.to_string())));
    add(&["w", "workdir"], Value(|c, v| c.working_dir = Some(v.to_string())));
    add(&["pod"], Value(|c, v| c.pod = Some(v.to_string())));

    // networking
    add(&["h", "hostname"], Value(|c, v| c.hostname = Some(v.to_string())));
    add(&["p", "publish"], Value(|c, v| c.ports.push(v.to_string())));
    add(&["network", "net"], Value(|c, v| c.networks.push(v.to_string())));
    add(&["network-alias"], Value(|c, v| c.network_aliases.push(v.to_string())));
    add(&["ip"], Value(|c, v| c.ip = Some(v.to_string())));
    add(&["dns"], Value(|c, v| c.dns.push(v.to_string())));
    add(&["dns-option", "dns-opt"], Value(|c, v| c.dns_options.push(v.to_string())));
    add(&["dns-search"], Value(|c, v| c.dns_search.push(v.to_string())));
    add(&["add-host"], Value(|c, v| c.add_hosts.push(v.to_string())));

    // storage
    add(&["v", "volume"], Value(|c, v| c.volumes.push(v.to_string())));
    add(&["mount"], Value(|c, v| c.mounts.push(v.to_string())));
    add(&["tmpfs"], Value(|c, v| c.tmpfs.push(v.to_string())));

    // environment and metadata
    add(&["e", "env"], Value(|c, v| c.environment.push(v.to_string())));
    add(&["env-file"], Value(|c, v| c.environment_files.push(v.to_string())));
    add(&["env-host"], Switch(|c, v| c.environment_host = enabled(v)));
    add(&["l", "label"], Value(|c, v| c.labels.push(v.to_string())));
    add(&["annotation"], Value(|c, v| c.annotations.push(v.to_string())));

    // security
    add(&["cap-add"], Value(|c, v| c.add_capabilities.push(v.to_string())));
    add(&["cap-drop"], Value(|c, v| c.drop_capabilities.push(v.to_string())));
    add(&["security-opt"], Value(|c, v| c.apply_security_opt(v)));
    add(&["read-only"], Switch(|c, v| c.read_only = enabled(v)));
    add(&["read-only-tmpfs"], Switch(|c, v| c.read_only_tmpfs = enabled(v)));
    add(&["device"], Value(|c, v| c.devices.push(v.to_string())));
    add(&["secret"], Value(|c, v| c.secrets.push(v.to_string())));
    add(&["u", "user"], Value(|c, v| c.apply_user_spec(v)));
    add(&["userns"], Value(|c, v| c.userns = Some(v.to_string())));

    // runtime
    add(&["init"], Switch(|c, v| c.init = enabled(v)));
    add(&["pull"], Value(|c, v| c.pull = Some(v.to_string())));
    add(&["stop-signal"], Value(|c, v| c.stop_signal = Some(v.to_string())));
    add(
        &["stop-timeout"],
        Value(|c, v| match v.parse::<u32>() {
            Ok(seconds) => c.stop_timeout = Some(seconds),
            Err(_) => {
                c.push_podman_flag("--stop-timeout", Some(v));
            }
        }),
    );
    add(&["tz"], Value(|c, v| c.timezone = Some(v.to_string())));
    add(
        &["sdnotify"],
        Value(|c, v| match v {
            "container" => c.notify = NotifyMode::Container,
            "healthy" => c.notify = NotifyMode::Healthy,
            other => debug!("sdnotify mode {} has no Quadlet equivalent, ignoring", other),
        }),
    );

    // health
    add(&["health-cmd"], Value(|c, v| c.health.cmd = Some(v.to_string())));
    add(&["health-interval"], Value(|c, v| c.health.interval = Some(v.to_string())));
    add(&["health-timeout"], Value(|c, v| c.health.timeout = Some(v.to_string())));
    add(&["health-retries"], Value(|c, v| c.health.retries = v.parse().ok()));
    add(&["health-start-period"], Value(|c, v| c.health.start_period = Some(v.to_string())));
    add(&["health-startup-cmd"], Value(|c, v| c.health.startup_cmd = Some(v.to_string())));
    add(
        &["health-startup-interval"],
        Value(|c, v| c.health.startup_interval = Some(v.to_string())),
    );
    add(&["health-startup-retries"], Value(|c, v| c.health.startup_retries = v.parse().ok()));
    add(&["health-startup-success"], Value(|c, v| c.health.startup_success = v.parse().ok()));
    add(
        &["health-startup-timeout"],
        Value(|c, v| c.health.startup_timeout = Some(v.to_string())),
    );
    add(&["health-on-failure"], Value(|c, v| c.health.on_failure = Some(v.to_string())));
    add(&["no-healthcheck"], Switch(|c, _| c.health.cmd = Some("none".to_string())));

    // logging and limits
    add(&["log-driver"], Value(|c, v| c.log_driver = Some(v.to_string())));
    add(&["log-opt"], Value(|c, v| c.log_options.push(v.to_string())));
    add(&["ulimit"], Value(|c, v| c.ulimits.push(v.to_string())));
    add(&["sysctl"], Value(|c, v| c.sysctls.push(v.to_string())));
    add(&["shm-size"], Value(|c, v| c.shm_size = Some(v.to_string())));

    // interactive use only, kept verbatim
    add(
        &["t", "tty"],
        Switch(|c, v| {
            if enabled(v) {
                c.push_podman_flag("--tty", None);
            }
        }),
    );
    add(
        &["i", "interactive"],
        Switch(|c, v| {
            if enabled(v) {
                c.push_podman_flag("--interactive", None);
            }
        }),
    );
    add(
        &["privileged"],
        Switch(|c, v| {
            if enabled(v) {
                c.push_podman_flag("--privileged", None);
            }
        }),
    );

    // no Quadlet key, kept verbatim
    add(
        &["m", "memory"],
        Value(|c, v| {
            c.push_podman_flag("--memory", Some(v));
        }),
    );
    add(
        &["cpus"],
        Value(|c, v| {
            c.push_podman_flag("--cpus", Some(v));
        }),
    );
    add(
        &["cpu-shares"],
        Value(|c, v| {
            c.push_podman_flag("--cpu-shares", Some(v));
        }),
    );
    add(
        &["pids-limit"],
        Value(|c, v| {
            c.push_podman_flag("--pids-limit", Some(v));
        }),
    );
    add(
        &["group-add"],
        Value(|c, v| {
            c.push_podman_flag("--group-add", Some(v));
        }),
    );
    add(
        &["expose"],
        Value(|c, v| {
            c.push_podman_flag("--expose", Some(v));
        }),
    );

    // systemd owns the lifecycle
    add(&["d", "detach"], Switch(|_, _| {}));
    add(&["rm"], Switch(|_, _| {}));
    add(&["restart"], Value(|_, _| {}));

    table
}
