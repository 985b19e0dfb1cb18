//! Random payload generation

use rand::RngCore;

/// Payload length used when none is configured
pub const DEFAULT_PAYLOAD_SIZE: usize = 512;

/// Produce exactly `size` lowercase hex characters from a CSPRNG.
///
/// `ceil(size / 2)` random bytes are hex-encoded and the result truncated,
/// so odd sizes still come out exact.
pub fn random_payload(size: usize) -> String {
    let mut bytes = vec![0u8; size.div_ceil(2)];
    rand::rng().fill_bytes(&mut bytes);

    let mut payload = hex::encode(bytes);
    payload.truncate(size);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn test_default_size() {
        let payload = random_payload(DEFAULT_PAYLOAD_SIZE);
        assert_eq!(payload.len(), 512);
        assert!(is_hex(&payload));
    }

    #[test]
    fn test_odd_size_is_exact() {
        let payload = random_payload(7);
        assert_eq!(payload.len(), 7);
        assert!(is_hex(&payload));
    }

    #[test]
    fn test_edge_sizes() {
        assert_eq!(random_payload(0), "");
        assert_eq!(random_payload(1).len(), 1);
        assert_eq!(random_payload(2).len(), 2);
    }

    #[test]
    fn test_payloads_differ() {
        assert_ne!(random_payload(64), random_payload(64));
    }
}
