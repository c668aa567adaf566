use std::io::{self, BufRead, Write};
use tracing::error;

/// Checkpoint between retrieving a block and committing it.
pub trait ConfirmationProvider {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Accepts every block without asking.
pub struct AutoConfirm;

impl ConfirmationProvider for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Asks the operator on stdin. Only `y` (any case) confirms.
pub struct StdinPrompt;

impl ConfirmationProvider for StdinPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        let stdin = io::stdin();
        let stdout = io::stdout();
        ask(prompt, &mut stdin.lock(), &mut stdout.lock())
    }
}

fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if let Err(e) = write!(output, "{prompt} (y/n): ").and_then(|()| output.flush()) {
        error!("Failed to write prompt: {}", e);
        return false;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
        Err(e) => {
            error!("Failed to read answer: {}", e);
            false
        }
    }
}
