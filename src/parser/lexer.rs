//! G-code line lexer.
//!
//! Fast single-pass scan of one line into a command word, parameter
//! words, and an optional trailing comment. No position tracking and no
//! whole-file state; callers feed lines one at a time.

/// A parameter word like `X10.5`.
///
/// `value` is `None` when the digits after the letter do not parse as a
/// number; this keeps malformed input out of the kinematic math (absent
/// beats NaN).
#[derive(Debug, Clone, PartialEq)]
pub struct ParamWord {
    pub letter: char,
    pub value: Option<f64>,
}

/// One lexed line of G-code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexedLine {
    /// First command word on the line (uppercased), e.g. `G1`, `M83`.
    pub command: Option<String>,
    /// Parameter words in source order.
    pub params: Vec<ParamWord>,
    /// Comment text, delimiters stripped.
    pub comment: Option<String>,
}

impl LexedLine {
    /// Numeric value of the first parameter with the given letter.
    pub fn value(&self, letter: char) -> Option<f64> {
        self.params
            .iter()
            .find(|p| p.letter == letter)
            .and_then(|p| p.value)
    }
}

/// Lex a line into command, parameters, and comment.
pub fn lex_line(line: &str) -> LexedLine {
    let mut lexed = LexedLine::default();
    let mut chars = line.char_indices().peekable();

    while let Some((start_idx, ch)) = chars.next() {
        match ch {
            // Skip whitespace
            ' ' | '\t' | '\r' | '\n' => continue,

            // Semicolon comment: rest of line
            ';' => {
                lexed.comment = Some(line[start_idx + 1..].to_string());
                break;
            }

            // Parenthetical comment
            '(' => {
                let mut end_idx = line.len();
                for (idx, ch) in chars.by_ref() {
                    if ch == ')' {
                        end_idx = idx;
                        break;
                    }
                }
                lexed.comment = Some(line[start_idx + 1..end_idx].to_string());
            }

            // Letter starts a command or parameter word
            c if c.is_ascii_alphabetic() => {
                let mut end_idx = start_idx + ch.len_utf8();

                // Consume alphanumeric, dots, minus, plus
                while let Some(&(idx, next_ch)) = chars.peek() {
                    if next_ch.is_ascii_alphanumeric()
                        || next_ch == '.'
                        || next_ch == '-'
                        || next_ch == '+'
                    {
                        end_idx = idx + next_ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }

                let word = &line[start_idx..end_idx];

                // G/M/T codes are commands, everything else is a parameter
                if lexed.command.is_none() && is_command_word(word) {
                    lexed.command = Some(word.to_ascii_uppercase());
                } else {
                    lexed.params.push(ParamWord {
                        letter: c.to_ascii_uppercase(),
                        value: word[c.len_utf8()..].parse::<f64>().ok(),
                    });
                }
            }

            // Skip other characters (malformed input)
            _ => continue,
        }
    }

    lexed
}

fn is_command_word(word: &str) -> bool {
    match word.chars().next() {
        Some(c) => matches!(c.to_ascii_uppercase(), 'G' | 'M' | 'T'),
        None => false,
    }
}
