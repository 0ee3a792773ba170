//! Misc helpers shared by the primitive types

use ethers::{types::Address, utils::to_checksum};

/// Serializes an address as its EIP-55 checksum string
pub fn as_checksum<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}

/// Parses the paymaster address from the leading word of `paymasterAndData`.
///
/// The canonical sponsorship layout zero-pads the address to a full 32-byte
/// word, so anything shorter than a word, or with a dirty pad, is not an
/// address.
pub fn paymaster_address(buf: &[u8]) -> Option<Address> {
    if buf.len() >= 32 && buf[0..12].iter().all(|b| *b == 0) {
        Some(Address::from_slice(&buf[12..32]))
    } else {
        None
    }
}
