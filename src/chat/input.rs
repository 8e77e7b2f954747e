//! Prompt input classification

pub const QUIT_INPUT: &str = "q";

#[derive(Debug, PartialEq)]
pub enum InputAction<'a> {
    Skip,
    Quit,
    Send(&'a str),
}

/// Decide what a line typed at the prompt means.
pub fn classify(line: &str) -> InputAction<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        InputAction::Skip
    } else if line == QUIT_INPUT {
        InputAction::Quit
    } else {
        InputAction::Send(line)
    }
}
