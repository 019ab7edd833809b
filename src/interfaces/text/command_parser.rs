use crate::application::command::{Command, CommandKind};
use crate::error::{PaymentError, Result};

/// Number of tokens (command included) that must precede a `#` for it to
/// start a comment.
const MIN_TOKENS_BEFORE_COMMENT: usize = 3;

/// Parses one input line into a [`Command`].
///
/// Tokens are whitespace-delimited. A token starting with `#` opens a
/// trailing comment only once every required argument has been read and at
/// least three tokens precede it; anywhere earlier the line is malformed. A
/// `#` inside a token is kept as part of the value.
pub fn parse_line(line: &str) -> Result<Command> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().ok_or_else(|| PaymentError::MalformedCommand {
        reason: "empty input".to_string(),
    })?;
    if name.starts_with('#') {
        return Err(PaymentError::MalformedCommand {
            reason: "'#' comment cannot start a line".to_string(),
        });
    }

    let kind = CommandKind::from_name(name)?;
    let required = kind.required_args();
    let mut args = Vec::with_capacity(required);

    for (index, token) in tokens.enumerate() {
        // 1-based position of this token on the line, command included.
        let position = index + 2;

        if token.starts_with('#') {
            if args.len() >= required && position > MIN_TOKENS_BEFORE_COMMENT {
                break;
            }
            return Err(PaymentError::MalformedCommand {
                reason: format!(
                    "'#' comment only allowed after the required arguments and the third token (found at position {position} in {name})"
                ),
            });
        }
        args.push(token.to_string());
    }

    kind.check_args(args.len())?;
    Ok(Command {
        name: name.to_string(),
        args,
    })
}
