//! Verification code generation.

use rand::Rng;

/// Generate a 6-digit verification code.
///
/// Returns a string of exactly 6 digits (000000-999999). Each digit is drawn
/// from the full space, so codes with a leading zero are possible; the code
/// must always be handled as a string to preserve them.
pub fn generate_verification_code() -> String {
    let mut rng = rand::rng();
    let code: u32 = rng.random_range(0..1_000_000);
    format!("{:06}", code)
}
