// ── PINs ──
//
// The lock stores only the generated digits. Some keypads expect a fixed
// per-lock prefix typed first; guests are told the prefixed PIN.

use rand::Rng;

/// Length of a generated PIN.
pub const PIN_LENGTH: usize = 4;

/// A fresh uniformly random PIN of [`PIN_LENGTH`] decimal digits.
pub fn generate_pin() -> String {
    let mut rng = rand::thread_rng();
    (0..PIN_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// The PIN as the guest types it.
pub fn full_pin(prefix: &str, pin: &str) -> String {
    format!("{prefix}{pin}")
}
