//! Identity allocation: random player plates.
//!
//! A plate is 3 ASCII digits followed by 3 ASCII uppercase letters, like a
//! licence plate: `042QZT`. Clients and tests rely on that exact shape, so
//! the length and alphabet are fixed.

use cabforge_protocol::PlayerId;
use rand::Rng;

const DIGITS: &[u8; 10] = b"0123456789";
const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of characters in a plate.
pub const PLATE_LEN: usize = 6;

/// Generates a random plate.
///
/// No uniqueness check happens here. The registry decides what to do
/// about collisions (see [`SessionConfig::plate_attempts`]).
///
/// [`SessionConfig::plate_attempts`]: crate::SessionConfig::plate_attempts
pub fn generate_plate() -> PlayerId {
    let mut rng = rand::rng();
    let mut plate = String::with_capacity(PLATE_LEN);
    for _ in 0..3 {
        plate.push(DIGITS[rng.random_range(0..DIGITS.len())] as char);
    }
    for _ in 0..3 {
        plate.push(LETTERS[rng.random_range(0..LETTERS.len())] as char);
    }
    PlayerId::new(plate)
}

/// Returns `true` if `candidate` has the plate shape `^[0-9]{3}[A-Z]{3}$`.
pub fn is_plate(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    bytes.len() == PLATE_LEN
        && bytes[..3].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_uppercase)
}
