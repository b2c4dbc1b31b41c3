use aes::Aes128;
use cmac::Cmac;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use smb_core::error::SMBError;
use smb_core::SMBResult;

use crate::protocol::body::SMBDialect;
use crate::protocol::header::SMBFlags;
use crate::util::crypto::sp800_108;

const SIGNATURE_RANGE: std::ops::Range<usize> = 48..64;
const FLAGS_OFFSET: usize = 16;
const KEY_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    HmacSha256,
    AesCmac,
}

/// The key a session signs its messages with.
#[derive(Clone, PartialEq, Eq)]
pub struct SMBSigningKey {
    algorithm: SigningAlgorithm,
    key: Vec<u8>,
}

impl std::fmt::Debug for SMBSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SMBSigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SMBSigningKey {
    /// Builds the signing key for `dialect` from the authentication
    /// session key [MS-SMB2 3.2.5.3.1]. The session key is cut or zero-padded
    /// to 16 bytes first.
    pub fn derive(session_key: &[u8], dialect: SMBDialect) -> SMBResult<Self> {
        let mut session_key = session_key.to_vec();
        session_key.resize(KEY_LENGTH, 0);
        match dialect {
            SMBDialect::V2_0_2 | SMBDialect::V2_1_0 => Ok(Self {
                algorithm: SigningAlgorithm::HmacSha256,
                key: session_key,
            }),
            SMBDialect::V3_0_0 | SMBDialect::V3_0_2 => {
                let hmac = new_sha256_from_slice(&session_key)?;
                Ok(Self {
                    algorithm: SigningAlgorithm::AesCmac,
                    key: sp800_108::derive_key(hmac, b"SMB2AESCMAC\0", b"SmbSign\0", 128),
                })
            }
            _ => Err(SMBError::crypto_error(format!("No signing support for dialect {:?}", dialect))),
        }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Computes the 16-byte signature of `message`, whose signature field
    /// must already be zeroed.
    pub fn signature(&self, message: &[u8]) -> SMBResult<[u8; 16]> {
        let output = match self.algorithm {
            SigningAlgorithm::HmacSha256 => new_sha256_from_slice(&self.key)?
                .chain_update(message)
                .finalize()
                .into_bytes()
                .to_vec(),
            SigningAlgorithm::AesCmac => <Cmac<Aes128>>::new_from_slice(&self.key)
                .map_err(|_| SMBError::crypto_error("Invalid Key Length"))?
                .chain_update(message)
                .finalize()
                .into_bytes()
                .to_vec(),
        };
        let mut signature = [0; 16];
        signature.copy_from_slice(&output[..16]);
        Ok(signature)
    }

    /// Sets the signed flag on an encoded message and writes its signature.
    pub fn sign(&self, message: &mut [u8]) -> SMBResult<()> {
        if message.len() < SIGNATURE_RANGE.end {
            return Err(SMBError::payload_too_small(SIGNATURE_RANGE.end, message.len()));
        }
        let flags = u32::from_le_bytes([
            message[FLAGS_OFFSET],
            message[FLAGS_OFFSET + 1],
            message[FLAGS_OFFSET + 2],
            message[FLAGS_OFFSET + 3],
        ]) | SMBFlags::SIGNED.bits();
        message[FLAGS_OFFSET..FLAGS_OFFSET + 4].copy_from_slice(&flags.to_le_bytes());
        message[SIGNATURE_RANGE].fill(0);
        let signature = self.signature(message)?;
        message[SIGNATURE_RANGE].copy_from_slice(&signature);
        Ok(())
    }

    /// Checks the signature carried by an encoded message.
    pub fn verify(&self, message: &[u8]) -> SMBResult<bool> {
        if message.len() < SIGNATURE_RANGE.end {
            return Err(SMBError::payload_too_small(SIGNATURE_RANGE.end, message.len()));
        }
        let mut zeroed = message.to_vec();
        zeroed[SIGNATURE_RANGE].fill(0);
        let expected = self.signature(&zeroed)?;
        Ok(expected[..] == message[SIGNATURE_RANGE])
    }
}

fn new_sha256_from_slice(slice: &[u8]) -> SMBResult<Hmac<Sha256>> {
    <Hmac<Sha256>>::new_from_slice(slice)
        .map_err(|_| SMBError::crypto_error("Invalid Key Length"))
}

#[cfg(test)]
mod tests {
    use smb_core::SMBToBytes;

    use crate::protocol::header::{SMBCommandCode, SMBHeader};

    use super::*;

    fn echo_request() -> Vec<u8> {
        [SMBHeader::request(SMBCommandCode::Echo, 7, 1, 0x1000).smb_to_bytes(), vec![4, 0, 0, 0]].concat()
    }

    #[test]
    fn smb2_signing_uses_session_key_directly() {
        let key = SMBSigningKey::derive(&[0xAB; 16], SMBDialect::V2_1_0).unwrap();
        assert_eq!(key.algorithm(), SigningAlgorithm::HmacSha256);
        assert_eq!(key.key(), &[0xAB; 16]);
    }

    #[test]
    fn smb3_signing_key_is_derived() {
        let key = SMBSigningKey::derive(&[0xAB; 16], SMBDialect::V3_0_2).unwrap();
        assert_eq!(key.algorithm(), SigningAlgorithm::AesCmac);
        assert_eq!(key.key().len(), 16);
        assert_ne!(key.key(), &[0xAB; 16]);
        let expected = sp800_108::derive_key(
            <Hmac<Sha256>>::new_from_slice(&[0xAB; 16]).unwrap(),
            b"SMB2AESCMAC\0",
            b"SmbSign\0",
            128,
        );
        assert_eq!(key.key(), expected.as_slice());
    }

    #[test]
    fn short_session_keys_are_padded() {
        let key = SMBSigningKey::derive(&[1, 2, 3], SMBDialect::V2_0_2).unwrap();
        assert_eq!(key.key(), &[1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn sign_then_verify() {
        for dialect in [SMBDialect::V2_0_2, SMBDialect::V3_0_0] {
            let key = SMBSigningKey::derive(&[0x42; 16], dialect).unwrap();
            let mut message = echo_request();
            key.sign(&mut message).unwrap();
            assert_eq!(message[16] & 0x08, 0x08);
            assert_ne!(&message[48..64], &[0; 16]);
            assert!(key.verify(&message).unwrap());
            message[66] ^= 0xFF;
            assert!(!key.verify(&message).unwrap());
        }
    }

    #[test]
    fn hmac_signature_is_truncated_sha256() {
        let key = SMBSigningKey::derive(&[9; 16], SMBDialect::V2_1_0).unwrap();
        let message = echo_request();
        let full = <Hmac<Sha256>>::new_from_slice(&[9; 16]).unwrap()
            .chain_update(&message)
            .finalize()
            .into_bytes();
        assert_eq!(key.signature(&message).unwrap(), full[..16]);
    }

    #[test]
    fn unsupported_dialect_has_no_key() {
        assert!(SMBSigningKey::derive(&[0; 16], SMBDialect::V3_1_1).is_err());
    }
}
