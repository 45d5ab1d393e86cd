//! Room codes shared between devices in online play.
//! Code format: six characters from an unambiguous alphabet, e.g. `K7PQ2M`.

use crate::constants::ROOM_CODE_LEN;

/// Upper-case letters and digits without the look-alikes `0 O 1 I`.
const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Derive a room code from caller-supplied entropy.
#[must_use]
pub fn generate_room_code(entropy: u64) -> String {
    let mut buf = [0_u8; 13];
    buf[..5].copy_from_slice(b"EXITO");
    buf[5..].copy_from_slice(&entropy.to_le_bytes());
    let mut hash = fnv1a64(&buf);
    let mut code = String::with_capacity(ROOM_CODE_LEN);
    for _ in 0..ROOM_CODE_LEN {
        let index = usize::try_from(hash % ALPHABET.len() as u64).unwrap_or(0);
        code.push(char::from(ALPHABET[index]));
        hash /= ALPHABET.len() as u64;
    }
    code
}

/// Clean up a code typed by a player; `None` if it cannot be a room code.
#[must_use]
pub fn normalize_room_code(input: &str) -> Option<String> {
    let code: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let valid = code.chars().count() == ROOM_CODE_LEN
        && code.bytes().all(|b| ALPHABET.contains(&b));
    valid.then_some(code)
}

/// Seed for the deterministic random source shared by a room.
#[must_use]
pub fn room_seed(code: &str) -> u64 {
    fnv1a64(code.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_valid() {
        for entropy in [0_u64, 1, 42, u64::MAX, 0xDEAD_BEEF] {
            let code = generate_room_code(entropy);
            assert_eq!(code.len(), ROOM_CODE_LEN);
            assert_eq!(normalize_room_code(&code), Some(code.clone()));
        }
        assert_ne!(generate_room_code(1), generate_room_code(2));
    }

    #[test]
    fn typed_codes_are_cleaned() {
        assert_eq!(normalize_room_code(" k7p-q2m "), Some("K7PQ2M".to_string()));
        assert_eq!(normalize_room_code("K7PQ2"), None);
        assert_eq!(normalize_room_code("K7PQ0M"), None);
        assert_eq!(normalize_room_code("K7PQ2MX"), None);
    }

    #[test]
    fn room_seed_is_stable() {
        assert_eq!(room_seed("K7PQ2M"), room_seed("K7PQ2M"));
        assert_ne!(room_seed("K7PQ2M"), room_seed("K7PQ2N"));
    }
}
