//! Print an Argon2 PHC hash for `SYNC_API_PASSWORD_HASH`
//!
//! Usage: `cargo run --bin hash-password -- <password>`

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("usage: hash-password <password>");
        std::process::exit(2);
    };
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    println!("{hash}");
    Ok(())
}
