use data_encoding::BASE32_NOPAD;
use portfolio_api::totp;
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let mut secret = [0u8; 20];
    rand::rng().fill_bytes(&mut secret);
    let encoded = BASE32_NOPAD.encode(&secret);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    let current_code = match totp::generate(&secret, now) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error generating code: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n=== TOTP Setup ===\n");
    println!("Secret (base32): {}", encoded);
    println!("\n# Paste this into your .env:");
    println!("TOTP_SECRET={}", encoded);
    println!("\nAuthenticator provisioning URI:");
    println!(
        "otpauth://totp/Portfolio:Admin?secret={}&issuer=Portfolio&algorithm=SHA1&digits=6&period=30",
        encoded
    );
    println!("\nCurrently valid code: {}\n", current_code);
}
