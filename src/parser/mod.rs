//! G-code parser
//!
//! Lexing and classification of single lines. This is the sole entry
//! point into the interpreted command vocabulary; everything downstream
//! works on [`LineEvent`] values.

pub mod events;
pub mod lexer;

pub use events::{CoordMode, LineEvent, MoveArgs};
pub use lexer::{LexedLine, ParamWord, lex_line};

/// Parse a single line of G-code into the event the estimator acts on.
pub fn parse_line(line: &str) -> LineEvent {
    events::classify_line(line)
}
