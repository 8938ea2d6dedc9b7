//! RSA keypair generation for output sealing
//!
//! Writes `private_key.pem` (PKCS#1) and `public_key.pem`
//! (SubjectPublicKeyInfo), the formats the positioning service consumes.

use anyhow::Context;
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;

const DEFAULT_BITS: usize = 8192;

fn main() -> anyhow::Result<()> {
    let bits = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("key size must be a number of bits, got {}", arg))?,
        None => DEFAULT_BITS,
    };

    println!("Generating {}-bit RSA keypair, this can take a while...", bits);
    let private_key =
        RsaPrivateKey::new(&mut OsRng, bits).context("generating RSA private key")?;
    let public_key = private_key.to_public_key();

    private_key
        .write_pkcs1_pem_file("private_key.pem", LineEnding::LF)
        .context("writing private_key.pem")?;
    public_key
        .write_public_key_pem_file("public_key.pem", LineEnding::LF)
        .context("writing public_key.pem")?;

    println!("Keys generated and saved to 'private_key.pem' and 'public_key.pem'");
    Ok(())
}
