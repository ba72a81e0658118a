//! Content hashing and signature verification collaborators

use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey, VerifyOnly};
use sha2::{Digest, Sha256};

use crate::types::{ByteString, Hash};

/// Signature oracle used by transaction validation
///
/// Implementations must be deterministic and side-effect free.
pub trait SignatureVerifier {
    /// Check `signature` over `message` against the public key encoded in `address`
    fn verify(&self, address: &[u8], message: &[u8], signature: &[u8]) -> bool;
}

/// ECDSA over secp256k1 with DER-encoded signatures
///
/// The signed digest is SHA-256 of the message bytes.
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, address: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let pubkey = match PublicKey::from_slice(address) {
            Ok(pk) => pk,
            Err(_) => return false,
        };

        let signature = match Signature::from_der(signature) {
            Ok(sig) => sig,
            Err(_) => return false,
        };

        let message = match Message::from_digest_slice(&sha256_hash(message)) {
            Ok(msg) => msg,
            Err(_) => return false,
        };

        self.secp.verify_ecdsa(&message, &signature, &pubkey).is_ok()
    }
}

/// Sign `message` with `secret_key`, producing a DER signature accepted by [`Secp256k1Verifier`]
pub fn sign(secret_key: &SecretKey, message: &[u8]) -> ByteString {
    let secp = Secp256k1::signing_only();
    let digest = sha256_hash(message);
    // A 32-byte digest is always a valid message
    let message = Message::from_digest(digest);
    secp.sign_ecdsa(&message, secret_key).serialize_der().to_vec()
}

/// Compressed public key bytes for `secret_key`, usable as an output address
pub fn address_of(secret_key: &SecretKey) -> ByteString {
    let secp = Secp256k1::signing_only();
    PublicKey::from_secret_key(&secp, secret_key).serialize().to_vec()
}

/// Simple SHA256 hash function
pub fn sha256_hash(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
