use digest::Digest;
use hmac::{Hmac, Mac};
use md4::Md4;
use md5::Md5;
use rc4::{KeyInit, Rc4, StreamCipher};
use rc4::consts::U16;

use smb_core::error::SMBError;
use smb_core::{SMBResult, SMBToBytes};

/// The three values an NTLMv2 AUTHENTICATE message derives from the
/// server challenge [MS-NLMP 3.3.2].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NTLMv2Response {
    pub nt_challenge_response: Vec<u8>,
    pub lm_challenge_response: Vec<u8>,
    pub session_base_key: Vec<u8>,
}

/// `NTOWFv2`: HMAC-MD5 keyed with MD4(password) over
/// UPPER(user) || domain, all UTF-16LE.
pub fn ntowf_v2(password: &str, user: &str, domain: &str) -> SMBResult<Vec<u8>> {
    let password_hash = Md4::digest(password.to_string().smb_to_bytes());
    let identity = (user.to_uppercase() + domain).smb_to_bytes();
    let result = new_hmac_from_slice(&password_hash)?
        .chain_update(identity)
        .finalize()
        .into_bytes();
    Ok(result.to_vec())
}

/// Computes the NTLMv2 and LMv2 responses. `time` is the FILETIME placed in
/// the client blob and `target_info` the AV pairs from the CHALLENGE message.
pub fn compute_response(
    response_key_nt: &[u8],
    server_challenge: &[u8; 8],
    client_challenge: &[u8; 8],
    time: u64,
    target_info: &[u8],
) -> SMBResult<NTLMv2Response> {
    let temp = [
        &[1_u8, 1][..],
        &[0; 6],
        &time.to_le_bytes(),
        client_challenge,
        &[0; 4],
        target_info,
        &[0; 4],
    ].concat();
    let nt_proof_str = new_hmac_from_slice(response_key_nt)?
        .chain_update(server_challenge)
        .chain_update(&temp)
        .finalize()
        .into_bytes();
    let lm_proof = new_hmac_from_slice(response_key_nt)?
        .chain_update(server_challenge)
        .chain_update(client_challenge)
        .finalize()
        .into_bytes();
    let session_base_key = new_hmac_from_slice(response_key_nt)?
        .chain_update(nt_proof_str)
        .finalize()
        .into_bytes();
    Ok(NTLMv2Response {
        nt_challenge_response: [nt_proof_str.as_slice(), &temp].concat(),
        lm_challenge_response: [lm_proof.as_slice(), client_challenge].concat(),
        session_base_key: session_base_key.to_vec(),
    })
}

/// RC4-encrypts the exported session key with the key exchange key for
/// `NTLMSSP_NEGOTIATE_KEY_EXCH`.
pub fn encrypt_session_key(key_exchange_key: &[u8], exported_session_key: &[u8]) -> SMBResult<Vec<u8>> {
    if key_exchange_key.len() != 16 {
        return Err(SMBError::crypto_error("Key exchange key must be 16 bytes"));
    }
    let mut rc4 = <Rc4<U16>>::new_from_slice(key_exchange_key)
        .map_err(|_| SMBError::crypto_error("Invalid length for key"))?;
    let mut output = exported_session_key.to_vec();
    rc4.apply_keystream(&mut output);
    Ok(output)
}

fn new_hmac_from_slice(slice: &[u8]) -> SMBResult<Hmac<Md5>> {
    <Hmac<Md5> as Mac>::new_from_slice(slice).map_err(|_| SMBError::crypto_error("Invalid length for key"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_CHALLENGE: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef];
    const CLIENT_CHALLENGE: [u8; 8] = [0xaa; 8];

    /// MS-NLMP 4.2.4.1.3: MsvAvNbDomainName "Domain", MsvAvNbComputerName "Server".
    const TARGET_INFO: [u8; 36] = [
        0x02, 0x00, 0x0c, 0x00, 0x44, 0x00, 0x6f, 0x00, 0x6d, 0x00, 0x61, 0x00, 0x69, 0x00, 0x6e, 0x00,
        0x01, 0x00, 0x0c, 0x00, 0x53, 0x00, 0x65, 0x00, 0x72, 0x00, 0x76, 0x00, 0x65, 0x00, 0x72, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ];

    /// MS-NLMP 4.2.4.1.1
    #[test]
    fn ntowf_v2_test_vector() {
        let key = ntowf_v2("Password", "User", "Domain").unwrap();
        assert_eq!(key, vec![
            0x0c, 0x86, 0x8a, 0x40, 0x3b, 0xfd, 0x7a, 0x93, 0xa3, 0x00, 0x1e, 0xf2, 0x2e, 0xf0, 0x2e, 0x3f,
        ]);
    }

    /// MS-NLMP 4.2.4.2
    #[test]
    fn ntlm_v2_response_test_vectors() {
        let key = ntowf_v2("Password", "User", "Domain").unwrap();
        let response = compute_response(&key, &SERVER_CHALLENGE, &CLIENT_CHALLENGE, 0, &TARGET_INFO).unwrap();
        assert_eq!(response.lm_challenge_response, vec![
            0x86, 0xc3, 0x50, 0x97, 0xac, 0x9c, 0xec, 0x10, 0x25, 0x54, 0x76, 0x4a, 0x57, 0xcc, 0xcc, 0x19,
            0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
        ]);
        assert_eq!(&response.nt_challenge_response[..16], &[
            0x68, 0xcd, 0x0a, 0xb8, 0x51, 0xe5, 0x1c, 0x96, 0xaa, 0xbc, 0x92, 0x7b, 0xeb, 0xef, 0x6a, 0x1c,
        ]);
        assert_eq!(response.session_base_key, vec![
            0x8d, 0xe4, 0x0c, 0xca, 0xdb, 0xc1, 0x4a, 0x82, 0xf1, 0x5c, 0xb0, 0xad, 0x0d, 0xe9, 0x5c, 0xa3,
        ]);
        assert_eq!(response.nt_challenge_response.len(), 16 + 28 + TARGET_INFO.len() + 4);
    }

    /// MS-NLMP 4.2.4.2.3
    #[test]
    fn encrypted_session_key_test_vector() {
        let session_base_key = [
            0x8d, 0xe4, 0x0c, 0xca, 0xdb, 0xc1, 0x4a, 0x82, 0xf1, 0x5c, 0xb0, 0xad, 0x0d, 0xe9, 0x5c, 0xa3,
        ];
        let encrypted = encrypt_session_key(&session_base_key, &[0x55; 16]).unwrap();
        assert_eq!(encrypted, vec![
            0xc5, 0xda, 0xd2, 0x54, 0x4f, 0xc9, 0x79, 0x90, 0x94, 0xce, 0x1c, 0xe9, 0x0b, 0xc9, 0xd0, 0x3e,
        ]);
    }
}
