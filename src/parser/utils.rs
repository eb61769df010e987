//! Input clean-up shared by the command parser and the batch applier.

/// Filter out control characters and turn non-breaking spaces into plain ones.
pub fn sanitize_user_input(input: &str) -> String {
    input
        .chars()
        .map(|c| if c == '\u{a0}' { ' ' } else { c })
        .filter(|&c| !c.is_control() || c == '\t')
        .collect::<String>()
}

/// Split pasted text into trimmed, non-empty command lines.
pub fn command_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
