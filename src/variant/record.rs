//! Variant record codec
//!
//! ## Record Format
//! ```text
//! ┌────────┬─────┬─────┬─────┬───┬───────────┬───┬─────────┬───┬──────────────┐
//! │ Strand │ Ref │ Alt │ PTM │ : │ cDNA (hex)│ : │ Exon id │ : │ Protein (hex)│
//! │  +/-   │  1  │  1  │ 0/1 │   │           │   │         │   │              │
//! └────────┴─────┴─────┴─────┴───┴───────────┴───┴─────────┴───┴──────────────┘
//! ```
//! `+RH0:cc:exon1:7b` is strand `+`, R>H, not PTM-proximal, cDNA 204,
//! exon `exon1`, protein 123 (amino-acid position 68).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::hashset::DELIMITER;

/// Separator between record fields
pub const FIELD_SEPARATOR: char = ':';

/// Bytes before the first field separator
pub const PREFIX_LEN: usize = 4;

/// Transcript strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One coding-sequence consequence of an SNV in one isoform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantRecord {
    pub strand: Strand,
    pub ref_residue: char,
    pub alt_residue: char,
    pub is_ptm_proximal: bool,
    pub cdna_position: u64,
    pub exon_id: String,
    pub protein_id: u64,
}

impl VariantRecord {
    /// Build a record from an amino-acid position
    ///
    /// The cDNA position is set to the first base of the codon, so the
    /// reading-frame offset of the real variant is not preserved.
    pub fn with_aa_position(
        strand: Strand,
        ref_residue: char,
        alt_residue: char,
        aa_position: u64,
        exon_id: impl Into<String>,
        protein_id: u64,
        is_ptm_proximal: bool,
    ) -> Self {
        Self {
            strand,
            ref_residue,
            alt_residue,
            is_ptm_proximal,
            cdna_position: aa_to_cdna_position(aa_position),
            exon_id: exon_id.into(),
            protein_id,
        }
    }

    /// 1-based amino-acid position of the affected residue
    pub fn aa_position(&self) -> u64 {
        cdna_to_aa_position(self.cdna_position)
    }

    pub fn encode(&self) -> String {
        encode_record(
            self.strand,
            self.ref_residue,
            self.alt_residue,
            self.cdna_position,
            &self.exon_id,
            self.protein_id,
            self.is_ptm_proximal,
        )
    }

    pub fn decode(encoded: &str) -> Result<Self> {
        decode_record(encoded)
    }
}

/// `(cdna - 1) / 3 + 1`
pub fn cdna_to_aa_position(cdna_position: u64) -> u64 {
    cdna_position.saturating_sub(1) / 3 + 1
}

/// `(aa - 1) * 3 + 1`; exact only at codon boundaries
///
/// Saturates at `u64::MAX` for positions beyond any real protein.
pub fn aa_to_cdna_position(aa_position: u64) -> u64 {
    aa_position
        .saturating_sub(1)
        .saturating_mul(3)
        .saturating_add(1)
}

fn assert_residue(residue: char) {
    assert!(
        residue.is_ascii() && residue != FIELD_SEPARATOR && residue != DELIMITER,
        "residue {:?} cannot be encoded",
        residue
    );
}

/// Encode one record
///
/// # Panics
/// If `exon_id` contains `:` or `|`, or a residue is not a single ASCII
/// character other than those two.
pub fn encode_record(
    strand: Strand,
    ref_residue: char,
    alt_residue: char,
    cdna_position: u64,
    exon_id: &str,
    protein_id: u64,
    is_ptm_proximal: bool,
) -> String {
    assert!(
        !exon_id.contains(FIELD_SEPARATOR) && !exon_id.contains(DELIMITER),
        "exon id {:?} contains a reserved separator",
        exon_id
    );
    assert_residue(ref_residue);
    assert_residue(alt_residue);

    format!(
        "{}{}{}{}{sep}{:x}{sep}{}{sep}{:x}",
        strand.as_char(),
        ref_residue,
        alt_residue,
        if is_ptm_proximal { '1' } else { '0' },
        cdna_position,
        exon_id,
        protein_id,
        sep = FIELD_SEPARATOR,
    )
}

/// Decode one record produced by [`encode_record`]
pub fn decode_record(encoded: &str) -> Result<VariantRecord> {
    let corrupt = |what: &str| StoreError::corrupt(format!("{} in record {:?}", what, encoded));

    let prefix = encoded
        .get(..PREFIX_LEN)
        .filter(|p| p.is_ascii())
        .ok_or_else(|| corrupt("short prefix"))?;
    let fields = encoded[PREFIX_LEN..]
        .strip_prefix(FIELD_SEPARATOR)
        .ok_or_else(|| corrupt("missing separator"))?;

    let prefix = prefix.as_bytes();
    let strand = Strand::from_char(prefix[0] as char).ok_or_else(|| corrupt("bad strand"))?;
    let ref_residue = prefix[1] as char;
    let alt_residue = prefix[2] as char;
    let is_ptm_proximal = match prefix[3] {
        b'0' => false,
        b'1' => true,
        _ => return Err(corrupt("bad PTM flag")),
    };

    let mut parts = fields.split(FIELD_SEPARATOR);
    let (Some(cdna), Some(exon_id), Some(protein), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(corrupt("wrong field count"));
    };

    let cdna_position = u64::from_str_radix(cdna, 16).map_err(|_| corrupt("bad cDNA position"))?;
    let protein_id = u64::from_str_radix(protein, 16).map_err(|_| corrupt("bad protein id"))?;

    Ok(VariantRecord {
        strand,
        ref_residue,
        alt_residue,
        is_ptm_proximal,
        cdna_position,
        exon_id: exon_id.to_string(),
        protein_id,
    })
}
