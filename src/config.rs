//! Version and banner constants for the REPL.

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "Monkey Interpreter";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for the Monkey language";

pub const HELP_TEXT: &str = r#"
Type any Monkey expression and press Enter to evaluate it.
Press Ctrl-D to exit.
"#;
