//! Zeroizing holder for derived vault keys.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A wrapper around a 32-byte key that automatically zeroes its memory
/// when dropped.
///
/// Keys are re-derived for every load and save, so a `MasterKey` only
/// lives for the duration of one seal or open.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_print_key_material() {
        let key = MasterKey::new([0x41; KEY_LEN]);
        let shown = format!("{key:?}");
        assert_eq!(shown, "MasterKey(..)");
    }

    #[test]
    fn zeroize_clears_bytes() {
        let mut key = MasterKey::new([0xFF; KEY_LEN]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LEN]);
    }
}
