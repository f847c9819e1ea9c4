//! Property test strategies for evidence inputs

use proptest::prelude::*;

pub use proptest;

/// File names as officers type them: letters, digits, spaces, dots and the odd slash
pub fn arb_file_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ._/-]{1,40}"
}

/// Evidence payloads, empty included
pub fn arb_evidence_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..4096)
}
