//! Variant Codec Module
//!
//! Pure text encodings for the mapping store: SNV lookup keys and the
//! compact per-isoform record stored as a set member. No I/O.

mod key;
mod record;

pub use key::{make_key, Snv, KEY_SEPARATOR};
pub use record::{
    aa_to_cdna_position, cdna_to_aa_position, decode_record, encode_record, Strand,
    VariantRecord, FIELD_SEPARATOR, PREFIX_LEN,
};
