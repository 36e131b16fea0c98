//! Member codec
//!
//! A stored value is its members joined with a single reserved delimiter:
//! ```text
//! member1|member2|member3
//! ```
//! Empty fragments are skipped on read, so a trailing or doubled delimiter
//! never yields an empty member.

use std::collections::HashSet;

use crate::error::{Result, StoreError};

/// Reserved character separating members inside one stored value
pub const DELIMITER: char = '|';

/// Panic unless `member` can be stored without breaking the value format
pub(crate) fn assert_member(member: &str) {
    assert!(
        !member.contains(DELIMITER),
        "set member {:?} contains the reserved delimiter {:?}",
        member,
        DELIMITER
    );
}

/// Panic unless `member` is a decimal integer
pub(crate) fn assert_integer_member(member: &str) {
    assert!(
        member.parse::<i64>().is_ok(),
        "set member {:?} is not a decimal integer",
        member
    );
}

/// Join members into one stored value
pub(crate) fn join_members<'m, I>(members: I) -> String
where
    I: IntoIterator<Item = &'m String>,
{
    let mut value = String::new();
    for member in members {
        if !value.is_empty() {
            value.push(DELIMITER);
        }
        value.push_str(member);
    }
    value
}

/// Decode a raw stored value into its text form
pub(crate) fn value_to_string(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| StoreError::corrupt(format!("value is not UTF-8: {}", e)))
}

/// Split a stored value into a member set
pub(crate) fn split_members(value: String) -> HashSet<String> {
    Members::new(value).collect()
}

/// Parse one member as an integer identifier
pub(crate) fn parse_integer(member: &str) -> Result<i64> {
    member
        .parse()
        .map_err(|_| StoreError::corrupt(format!("member {:?} is not an integer", member)))
}

/// Lazy member sequence over one stored value
///
/// Members are split off one at a time, so a caller that stops early never
/// pays for the rest of the value.
#[derive(Debug, Clone)]
pub struct Members {
    raw: String,
    offset: usize,
}

impl Members {
    pub(crate) fn new(raw: String) -> Self {
        Self { raw, offset: 0 }
    }

    /// The undecoded value
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Iterator for Members {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.offset < self.raw.len() {
            let rest = &self.raw[self.offset..];
            let (member, consumed) = match rest.find(DELIMITER) {
                Some(idx) => (&rest[..idx], idx + DELIMITER.len_utf8()),
                None => (rest, rest.len()),
            };
            self.offset += consumed;
            if !member.is_empty() {
                return Some(member.to_string());
            }
        }
        None
    }
}
