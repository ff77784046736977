use std::mem;

/// A command either as one line of text or already split into arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    Line(String),
    Args(Vec<String>),
}

impl From<&str> for CommandInput {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for CommandInput {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl From<&String> for CommandInput {
    fn from(line: &String) -> Self {
        Self::Line(line.clone())
    }
}

impl From<Vec<String>> for CommandInput {
    fn from(args: Vec<String>) -> Self {
        Self::Args(args)
    }
}

impl From<&[&str]> for CommandInput {
    fn from(args: &[&str]) -> Self {
        Self::Args(args.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CommandInput {
    fn from(args: [&str; N]) -> Self {
        Self::Args(args.iter().map(|s| s.to_string()).collect())
    }
}

/// Splits a command into tokens.
///
/// Whitespace separates tokens unless quoted. `"` and `'` open a literal span
/// closed only by the same character, and `\` escapes the next character
/// anywhere. An unterminated quote swallows the rest of the input. Pre-split
/// input is returned as is, minus empty entries.
pub fn tokenize(input: impl Into<CommandInput>) -> Vec<String> {
    match input.into() {
        CommandInput::Args(args) => args.into_iter().filter(|a| !a.is_empty()).collect(),
        CommandInput::Line(line) => split_line(&line),
    }
}

fn split_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (c, quote) {
            ('\\', _) => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            ('"' | '\'', None) => quote = Some(c),
            (c, Some(open)) if c == open => quote = None,
            (c, Some(_)) => current.push(c),
            (c, None) if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(mem::take(&mut current));
                }
            }
            (c, None) => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
