//! Chat-log line matching.
//!
//! Log lines look like `[2024-01-01 12:34:56] #channel user: message`. The
//! matcher extracts the leading date and the message text and rejects
//! everything else.

/// Date and message extracted from one chat-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch<'a> {
    /// `YYYY-MM-DD` as written in the line, not yet validated as a calendar date
    pub date: &'a str,
    /// Everything after the first `: ` that follows the channel marker
    pub message: &'a str,
}

const DATE_LEN: usize = 10;
const CHANNEL_MARKER: &str = "] #";
const MESSAGE_SEPARATOR: &str = ": ";

/// Match a raw chat-log line.
///
/// The line must start with `[`, a `YYYY-MM-DD` date, then anything up to the
/// first `] #`, a non-empty channel segment up to the first `: `, and the
/// message. Returns `None` for any other shape.
pub fn match_line(line: &str) -> Option<LineMatch<'_>> {
    let rest = line.strip_prefix('[')?;
    let date = rest.get(..DATE_LEN)?;
    if !has_date_shape(date) {
        return None;
    }

    let after_date = &rest[DATE_LEN..];
    let marker = after_date.find(CHANNEL_MARKER)?;
    let channel_and_message = &after_date[marker + CHANNEL_MARKER.len()..];

    // The channel segment holds at least one character.
    let first = channel_and_message.chars().next()?.len_utf8();
    let separator = channel_and_message[first..].find(MESSAGE_SEPARATOR)? + first;
    let message = &channel_and_message[separator + MESSAGE_SEPARATOR.len()..];

    Some(LineMatch { date, message })
}

fn has_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == DATE_LEN
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
