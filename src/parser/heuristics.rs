//! Guesswork for flags the run-command parser does not know.
//!
//! For an unknown `--flag` without an inline `=value` we cannot tell whether
//! the next token is its value or the image. [`classify_flag_argument`] makes
//! that call. It is best-effort; the tests below pin its behavior.

/// What the token after an unknown flag turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentRole {
    FlagValue,
    Image,
}

const COMMON_IMAGES: &[&str] = &[
    "alpine",
    "busybox",
    "caddy",
    "centos",
    "debian",
    "elasticsearch",
    "fedora",
    "golang",
    "httpd",
    "mariadb",
    "memcached",
    "mongo",
    "mysql",
    "nginx",
    "node",
    "postgres",
    "python",
    "rabbitmq",
    "redis",
    "registry",
    "rockylinux",
    "traefik",
    "ubuntu",
];

/// Decides whether `candidate` (the token following an unknown flag) is that
/// flag's value or the image. `following` holds every token after `candidate`.
///
/// First match wins:
/// 1. `candidate` has `=`, is a number with an optional size suffix, or is a
///    bare `key:`: value.
/// 2. some later non-flag token looks like an image while `candidate` does
///    not: value.
/// 3. otherwise value, unless `candidate` itself looks like an image.
pub fn classify_flag_argument(candidate: &str, following: &[String]) -> ArgumentRole {
    if candidate.contains('=') || is_size_literal(candidate) || is_bare_key(candidate) {
        return ArgumentRole::FlagValue;
    }

    let candidate_is_image = looks_like_image(candidate);

    let later_image = following
        .iter()
        .filter(|token| !token.starts_with('-'))
        .any(|token| looks_like_image(token));

    if later_image && !candidate_is_image {
        return ArgumentRole::FlagValue;
    }

    if candidate_is_image {
        ArgumentRole::Image
    } else {
        ArgumentRole::FlagValue
    }
}

/// Rough test for an image reference such as `nginx`, `nginx:1.25`,
/// `ghcr.io/org/app` or `my-app`.
pub fn looks_like_image(token: &str) -> bool {
    if token.is_empty()
        || token.starts_with(['-', '/', '.', '~'])
        || token.contains('=')
        || token.contains(char::is_whitespace)
    {
        return false;
    }

    if token.contains('/') || has_tag_suffix(token) {
        return true;
    }

    COMMON_IMAGES.contains(&repository_name(token)) || is_dotted_name(token)
}

/// `128m`, `2`, `1.5g`, `512MB`
fn is_size_literal(token: &str) -> bool {
    let digits_end = token
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(token.len());
    let (number, suffix) = token.split_at(digits_end);

    let valid_number = match number.split_once('.') {
        Some((whole, fraction)) => {
            !whole.is_empty()
                && !fraction.is_empty()
                && whole.chars().all(|c| c.is_ascii_digit())
                && fraction.chars().all(|c| c.is_ascii_digit())
        }
        None => !number.is_empty(),
    };

    let valid_suffix = matches!(
        suffix.to_ascii_lowercase().as_str(),
        "" | "b" | "k" | "m" | "g" | "t" | "kb" | "mb" | "gb" | "tb"
    );

    valid_number && valid_suffix
}

/// An identifier followed by a single trailing colon, e.g. `type:`.
fn is_bare_key(token: &str) -> bool {
    let Some(key) = token.strip_suffix(':') else {
        return false;
    };
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
}

fn has_tag_suffix(token: &str) -> bool {
    let last_segment = token.rsplit('/').next().unwrap_or(token);
    match last_segment.split_once(':') {
        Some((name, tag)) => {
            !name.is_empty()
                && !tag.is_empty()
                && tag.len() <= 128
                && !tag.starts_with(['.', '-'])
                && tag
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        }
        None => false,
    }
}

fn repository_name(token: &str) -> &str {
    let last_segment = token.rsplit('/').next().unwrap_or(token);
    last_segment.split(':').next().unwrap_or(last_segment)
}

/// `^[a-z0-9]+([.-][a-z0-9]+)+$`
fn is_dotted_name(token: &str) -> bool {
    let mut parts = 0;
    for part in token.split(['.', '-']) {
        if part.is_empty()
            || !part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return false;
        }
        parts += 1;
    }
    parts > 1
}
