//! Throwaway RSA key shared by signing tests.

use std::sync::OnceLock;

use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

fn key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("generate test RSA key")
    })
}

/// `BEGIN RSA PRIVATE KEY` document.
pub(crate) fn private_key_pkcs1_pem() -> String {
    key().to_pkcs1_pem(LineEnding::LF).expect("encode PKCS#1 PEM").to_string()
}

/// `BEGIN PRIVATE KEY` document.
pub(crate) fn private_key_pkcs8_pem() -> String {
    key().to_pkcs8_pem(LineEnding::LF).expect("encode PKCS#8 PEM").to_string()
}

pub(crate) fn private_key_der() -> Vec<u8> {
    key().to_pkcs1_der().expect("encode PKCS#1 DER").as_bytes().to_vec()
}

/// `BEGIN PUBLIC KEY` document for [`private_key_pkcs1_pem`].
pub(crate) fn public_key_pem() -> String {
    RsaPublicKey::from(key()).to_public_key_pem(LineEnding::LF).expect("encode public key PEM")
}
