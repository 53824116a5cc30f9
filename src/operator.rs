//! The person at the terminal during authorization.

use std::io::{self, BufRead, Write};

use gcal_core::Operator;
use url::Url;

/// Prompts on stderr, opens the browser, reads the code from stdin.
pub struct ConsoleOperator;

impl Operator for ConsoleOperator {
    fn present(&mut self, authorization_url: &Url) {
        eprintln!("\nOpen this URL in your browser to authenticate:\n");
        eprintln!("{}\n", authorization_url);

        if open::that(authorization_url.as_str()).is_err() {
            eprintln!("(Could not open browser automatically, please copy the URL above)");
        }

        eprint!("Paste the authorization code (or the whole redirect URL): ");
        let _ = io::stderr().flush();
    }

    fn read_code(&mut self) -> io::Result<Option<String>> {
        read_line(&mut io::stdin().lock())
    }
}

/// One line from `input`, `None` at end of input.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
