/// Token that marks a command for background execution.
pub const BACKGROUND_MARKER: &str = "&";
/// Redirects standard input from the following token.
pub const INPUT_REDIRECT: &str = "<";
/// Redirects standard output to the following token.
pub const OUTPUT_REDIRECT: &str = ">";
/// A first token starting with this character turns the line into a comment.
pub const COMMENT_MARKER: char = '#';
/// Replaced by the interpreter's pid in every plain token.
pub const PID_PLACEHOLDER: &str = "$$";

/// One parsed input line.
///
/// `arguments` always starts with `program` when the line holds a command.
/// A dangling `<` or `>` leaves an empty path behind, which the launcher
/// reports as a redirection failure when it tries to open it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub program: String,
    pub arguments: Vec<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub background: bool,
    pub comment: bool,
}

impl Command {
    /// Blank lines and comments never reach a built-in or the launcher.
    pub fn is_noop(&self) -> bool {
        self.comment || self.program.is_empty()
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        self.arguments.get(1..).unwrap_or(&[])
    }
}

/// Tokenizes `line` on whitespace and builds a [`Command`].
///
/// Operators are recognized only as whole tokens. Later `<`/`>` occurrences
/// overwrite earlier ones.
pub fn parse(line: &str, invoking_pid: &str) -> Command {
    let mut command = Command::default();
    let mut tokens = line.split_whitespace();

    match tokens.clone().next() {
        None => return command,
        Some(first) if first.starts_with(COMMENT_MARKER) => {
            command.comment = true;
            return command;
        }
        Some(_) => {}
    }

    while let Some(token) = tokens.next() {
        match token {
            BACKGROUND_MARKER => command.background = true,
            INPUT_REDIRECT => {
                command.input_path = Some(tokens.next().unwrap_or_default().to_string());
            }
            OUTPUT_REDIRECT => {
                command.output_path = Some(tokens.next().unwrap_or_default().to_string());
            }
            word => command.arguments.push(expand_pid(word, invoking_pid)),
        }
    }

    if let Some(program) = command.arguments.first() {
        command.program = program.clone();
    }
    command
}

/// Replaces each `$$` with `pid`, scanning left to right without revisiting
/// substituted text.
pub fn expand_pid(token: &str, pid: &str) -> String {
    if token.contains(PID_PLACEHOLDER) {
        token.replace(PID_PLACEHOLDER, pid)
    } else {
        token.to_string()
    }
}
