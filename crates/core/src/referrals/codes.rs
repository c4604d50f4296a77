//! Public code generation for share links and redemptions.

use rand::rngs::OsRng;
use rand::Rng;

use crate::constants::CODE_ALPHABET;

/// Generates a cryptographically random code of `len` characters drawn from
/// the unambiguous alphabet.
///
/// Uniqueness is not guaranteed here; callers rely on the storage layer's
/// unique constraint and retry on collision.
pub fn generate_code(len: usize) -> String {
    let mut rng = OsRng;
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}
