//! Lexical stage: `$$` expansion and whitespace tokenization.

/// The two-character marker that expands to the shell's process id.
pub const EXPANSION_MARKER: &str = "$$";

/// Marker that turns a whole line into a comment when it is the first character.
pub const COMMENT_MARKER: char = '#';

/// Replace every occurrence of [`EXPANSION_MARKER`] with the decimal form of `pid`.
///
/// Text adjacent to a marker is preserved as-is, and a line without any
/// marker is returned unchanged.
pub fn expand_pid(line: &str, pid: u32) -> String {
    line.replace(EXPANSION_MARKER, &pid.to_string())
}

/// Split an (already expanded) line into whitespace-and-newline-delimited tokens.
///
/// The returned iterator is lazy; the parser consumes it in order and may
/// look ahead one token at a time.
pub fn split_into_tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}

/// True for lines the loop ignores entirely: whitespace-only lines and lines
/// whose first character is [`COMMENT_MARKER`].
pub fn is_blank_or_comment(line: &str) -> bool {
    line.starts_with(COMMENT_MARKER) || line.trim().is_empty()
}
