//! SNV lookup keys
//!
//! ```text
//! <chromosome>:<hex position><lowercase ref><lowercase alt>
//! "17", 7572934, 'G', 'A'  ──►  "17:738dc6ga"
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the chromosome and the rest of a key
pub const KEY_SEPARATOR: char = ':';

/// A genomic single-nucleotide variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snv {
    pub chromosome: String,
    pub position: u64,
    pub ref_base: char,
    pub alt_base: char,
}

impl Snv {
    pub fn new(chromosome: impl Into<String>, position: u64, ref_base: char, alt_base: char) -> Self {
        Self {
            chromosome: chromosome.into(),
            position,
            ref_base,
            alt_base,
        }
    }

    /// The store key for this variant
    pub fn key(&self) -> String {
        make_key(&self.chromosome, self.position, self.ref_base, self.alt_base)
    }
}

impl fmt::Display for Snv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chromosome, self.position, self.ref_base, self.alt_base
        )
    }
}

/// Build the store key for an SNV
///
/// Bases are compared case-insensitively: `G`/`g` produce the same key.
pub fn make_key(chromosome: &str, position: u64, ref_base: char, alt_base: char) -> String {
    let mut key = String::with_capacity(chromosome.len() + 20);
    key.push_str(chromosome);
    key.push(KEY_SEPARATOR);
    key.push_str(&format!("{:x}", position));
    key.push(ref_base.to_ascii_lowercase());
    key.push(alt_base.to_ascii_lowercase());
    key
}
