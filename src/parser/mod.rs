pub mod compose;
pub mod escape;
pub mod heuristics;
pub mod run_command;
pub mod tokenizer;

pub use compose::{ComposeProject, ComposeService, parse_compose};
pub use escape::shell_escape;
pub use heuristics::{ArgumentRole, classify_flag_argument, looks_like_image};
pub use run_command::parse_run_command;
pub use tokenizer::{CommandInput, tokenize};
