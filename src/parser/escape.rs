use std::borrow::Cow;

/// Quotes `token` for a POSIX shell when it contains anything beyond a
/// conservative set of safe characters.
pub fn shell_escape(token: &str) -> Cow<'_, str> {
    if !token.is_empty() && token.chars().all(is_shell_safe) {
        return Cow::Borrowed(token);
    }

    Cow::Owned(format!("'{}'", token.replace('\'', r"'\''")))
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_tokens_are_untouched() {
        assert_eq!(shell_escape("--memory"), "--memory");
        assert_eq!(shell_escape("512m"), "512m");
        assert_eq!(shell_escape("key=value,other=1"), "key=value,other=1");
        assert_eq!(shell_escape("/var/lib/data:ro"), "/var/lib/data:ro");
    }

    #[test]
    fn test_special_characters_are_quoted() {
        assert_eq!(shell_escape("hello world"), "'hello world'");
        assert_eq!(shell_escape("$HOME"), "'$HOME'");
        assert_eq!(shell_escape("a;b"), "'a;b'");
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn test_single_quotes_are_escaped() {
        assert_eq!(shell_escape("it's"), r"'it'\''s'");
    }
}
