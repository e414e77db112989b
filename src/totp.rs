/**
 * Time-based one-time passwords (RFC 6238)
 * HMAC-SHA1, 30-second step, 6 digits, one step of clock-skew tolerance
 */
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Code length in digits.
pub const DIGITS: usize = 6;

/// Time-step size in seconds.
pub const STEP_SECS: i64 = 30;

/// Steps accepted either side of the current one.
pub const SKEW_STEPS: i64 = 1;

/// Why a code was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotpError {
    /// Not a 6-digit numeric string. Checked before any code comparison.
    BadFormat,
    /// The shared secret is not valid base32.
    BadSecret,
    /// Well-formed code that matches no step in the tolerance window.
    Mismatch,
}

impl std::fmt::Display for TotpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TotpError::BadFormat => write!(f, "code must be 6 digits"),
            TotpError::BadSecret => write!(f, "shared secret is not valid base32"),
            TotpError::Mismatch => write!(f, "code does not match"),
        }
    }
}

impl std::error::Error for TotpError {}

/// Decode a base32 (RFC 4648) shared secret. Tolerates lowercase, spaces,
/// and trailing padding, which authenticator apps routinely emit.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, TotpError> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|_| TotpError::BadSecret)
}

/// HOTP value for one counter (RFC 4226 dynamic truncation).
fn hotp(key: &[u8], counter: u64) -> Result<String, TotpError> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|_| TotpError::BadSecret)?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // SHA-1 digests are 20 bytes; the low nibble of the last byte picks the
    // 4-byte window, high bit masked off.
    let offset = (digest[19] & 0x0f) as usize;
    let code = ((u32::from(digest[offset]) & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);

    Ok(format!("{:0width$}", code % 1_000_000, width = DIGITS))
}

/// The code valid for `unix_time` with the given raw key.
pub fn generate(key: &[u8], unix_time: i64) -> Result<String, TotpError> {
    hotp(key, (unix_time / STEP_SECS) as u64)
}

/// Verify a submitted code against the base32 `secret` at `unix_time`.
///
/// The format check runs before the secret is even decoded, so malformed
/// input never reaches the comparison. A code is accepted if it matches the
/// current step or the step on either side of it.
pub fn verify(secret: &str, code: &str, unix_time: i64) -> Result<(), TotpError> {
    if code.len() != DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TotpError::BadFormat);
    }

    let key = decode_secret(secret)?;
    let current_step = unix_time / STEP_SECS;

    for delta in -SKEW_STEPS..=SKEW_STEPS {
        let step = current_step + delta;
        if step < 0 {
            continue;
        }
        if hotp(&key, step as u64)? == code {
            return Ok(());
        }
    }

    Err(TotpError::Mismatch)
}
