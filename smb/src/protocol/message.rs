use serde::{Deserialize, Serialize};

use smb_core::{SMBFromBytes, SMBParseResult, SMBResult, SMBToBytes};
use smb_core::error::SMBError;

use crate::protocol::body::SMBBody;
use crate::protocol::header::{SMB1_PROTOCOL_ID, SMBFlags, SMBHeader};
use crate::util::crypto::smb2::SMBSigningKey;

/// One SMB2 message: a header and the body its command and direction select.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct SMBMessage {
    pub header: SMBHeader,
    pub body: SMBBody,
}

impl SMBMessage {
    pub fn new(header: SMBHeader, body: SMBBody) -> Self {
        SMBMessage {
            header,
            body
        }
    }

    pub fn parse(bytes: &[u8]) -> SMBParseResult<&[u8], Self> {
        let (remaining, header) = SMBHeader::smb_from_bytes(bytes)?;
        let (remaining, body) = SMBBody::parse(remaining, &header)?;
        Ok((remaining, Self { header, body }))
    }

    /// The unframed wire form.
    pub fn as_bytes(&self) -> Vec<u8> {
        [self.header.smb_to_bytes(), self.body.smb_to_bytes()].concat()
    }

    /// The wire form with the signed flag set and the signature filled in.
    pub fn as_signed_bytes(&self, key: &SMBSigningKey) -> SMBResult<Vec<u8>> {
        let mut bytes = self.as_bytes();
        key.sign(&mut bytes)?;
        Ok(bytes)
    }

    pub fn is_signed(&self) -> bool {
        self.header.flags.contains(SMBFlags::SIGNED)
    }
}

/// Whether raw message bytes carry the SMB1 protocol id, which a server
/// without SMB2 support answers NEGOTIATE with.
pub fn is_legacy_message(bytes: &[u8]) -> bool {
    bytes.starts_with(&SMB1_PROTOCOL_ID)
}

/// Verifies the signature of a received message against `key`.
pub fn verify_signature(bytes: &[u8], key: &SMBSigningKey) -> SMBResult<()> {
    if key.verify(bytes)? {
        Ok(())
    } else {
        Err(SMBError::protocol_error("Message signature mismatch"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use smb_core::nt_status::NTStatus;

    use crate::protocol::body::SMBEmpty;
    use crate::protocol::body::error::SMBErrorResponse;
    use crate::protocol::body::tree_connect::SMBTreeConnectRequest;
    use crate::protocol::header::SMBCommandCode;
    use crate::protocol::body::SMBDialect;

    use super::*;

    #[test]
    fn request_round_trip() {
        let message = SMBMessage::new(
            SMBHeader::request(SMBCommandCode::TreeConnect, 3, 0, 0x1122),
            SMBBody::TreeConnectRequest(SMBTreeConnectRequest::new("\\\\server\\microSD")),
        );
        let bytes = message.as_bytes();
        let (remaining, parsed) = SMBMessage::parse(&bytes).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(parsed, message);
    }

    #[test]
    fn failing_response_decodes_error_body() {
        let message = SMBMessage::new(
            SMBHeader::response(SMBCommandCode::Create, NTStatus::ObjectNameNotFound, 9, 1, 2),
            SMBBody::ErrorResponse(SMBErrorResponse::new()),
        );
        let (_, parsed) = SMBMessage::parse(&message.as_bytes()).unwrap();
        assert_eq!(parsed.header.nt_status(), NTStatus::ObjectNameNotFound);
        assert!(matches!(parsed.body, SMBBody::ErrorResponse(_)));
    }

    #[test]
    fn signed_message_verifies() {
        let key = SMBSigningKey::derive(&[0x42; 16], SMBDialect::V3_0_0).unwrap();
        let message = SMBMessage::new(
            SMBHeader::request(SMBCommandCode::Echo, 10, 0, 7),
            SMBBody::EchoRequest(SMBEmpty),
        );
        let mut bytes = message.as_signed_bytes(&key).unwrap();
        let (_, parsed) = SMBMessage::parse(&bytes).unwrap();
        assert!(parsed.is_signed());
        assert!(verify_signature(&bytes, &key).is_ok());
        bytes[66] ^= 0x01;
        assert!(matches!(verify_signature(&bytes, &key), Err(SMBError::ProtocolError(_))));
    }

    #[test]
    fn detects_smb1_replies() {
        assert!(is_legacy_message(&[0xFF, b'S', b'M', b'B', 0x72]));
        assert!(!is_legacy_message(&[0xFE, b'S', b'M', b'B']));
        assert!(SMBMessage::parse(&[0xFF, b'S', b'M', b'B', 0x72]).is_err());
    }
}
