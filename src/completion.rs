//! Shell completion glue for bash's `complete -C`.
//!
//! Bash runs the binary with `COMP_LINE` (the whole line) and `COMP_POINT`
//! (cursor byte offset) set, and reads one candidate per line from stdout.

use gcal_core::completion;

const LINE_ENV: &str = "COMP_LINE";
const POINT_ENV: &str = "COMP_POINT";
const INSTALL_ENV: &str = "COMP_INSTALL";

/// What the environment asks of this invocation.
#[derive(Debug, PartialEq, Eq)]
pub enum CompletionRequest {
    /// Print candidates for the word under the cursor.
    Complete(Vec<String>),
    /// Print the line that registers the binary with bash.
    Install(String),
}

/// `None` for an ordinary command-line invocation.
pub fn from_env(program: &str) -> Option<CompletionRequest> {
    detect(
        program,
        std::env::var(LINE_ENV).ok(),
        std::env::var(POINT_ENV).ok(),
        std::env::var(INSTALL_ENV).ok(),
    )
}

fn detect(
    program: &str,
    line: Option<String>,
    point: Option<String>,
    install: Option<String>,
) -> Option<CompletionRequest> {
    if let Some(line) = line {
        let line = cut_at_cursor(&line, point.as_deref());
        let candidates = completion::build(program).complete_line(line);
        return Some(CompletionRequest::Complete(candidates));
    }

    if install.as_deref() == Some("1") {
        let bin = std::env::current_exe()
            .ok()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| program.to_string());
        return Some(CompletionRequest::Install(format!("complete -C {} {}", bin, program)));
    }

    None
}

/// The part of the line before the cursor. A missing or bogus point means
/// the cursor is at the end.
fn cut_at_cursor<'a>(line: &'a str, point: Option<&str>) -> &'a str {
    let Some(mut point) = point.and_then(|p| p.parse::<usize>().ok()) else {
        return line;
    };

    if point >= line.len() {
        return line;
    }
    while !line.is_char_boundary(point) {
        point -= 1;
    }
    &line[..point]
}
