use nom::IResult;
use serde::{Deserialize, Serialize};

use smb_core::logging::trace;
use smb_core::SMBParseResult;
use smb_core::error::SMBError;

use crate::util::auth::spnego::{SPNEGOTokenInitBody, SPNEGOTokenResponseBody};
use crate::util::auth::spnego::der::{APPLICATION, context, encode_tlv, expect_tlv, fail, OID, parse_tlv, SPNEGO_ID};

pub(crate) const NEG_TOKEN_INIT: u8 = context(0);
pub(crate) const NEG_TOKEN_RESP: u8 = context(1);

/// A `NegotiationToken` [RFC 4178 4.2]. The initial token travels inside the
/// GSS-API `InitialContextToken` framing; later ones are bare.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub enum SPNEGOToken {
    Init(SPNEGOTokenInitBody),
    Response(SPNEGOTokenResponseBody),
}

impl SPNEGOToken {
    pub fn parse(bytes: &[u8]) -> SMBParseResult<&[u8], Self> {
        Self::parse_inner(bytes).map_err(|e| SMBError::parse_error(format!("Invalid SPNEGO token: {:?}", e.map_input(|i| i.len()))))
    }

    fn parse_inner(bytes: &[u8]) -> IResult<&[u8], Self> {
        trace!(buf_len = bytes.len(), "parsing SPNEGO token");
        let (remaining, (tag, content)) = parse_tlv(bytes)?;
        let token = match tag {
            APPLICATION => {
                let (choice, oid) = expect_tlv(content, OID)?;
                if oid != SPNEGO_ID {
                    return Err(fail(content));
                }
                let (_, token) = Self::parse_choice(choice)?;
                token
            }
            NEG_TOKEN_RESP => SPNEGOToken::Response(SPNEGOTokenResponseBody::from_der(content)?.1),
            _ => return Err(fail(bytes)),
        };
        Ok((remaining, token))
    }

    fn parse_choice(input: &[u8]) -> IResult<&[u8], Self> {
        let (remaining, (tag, content)) = parse_tlv(input)?;
        match tag {
            NEG_TOKEN_INIT => Ok((remaining, SPNEGOToken::Init(SPNEGOTokenInitBody::from_der(content)?.1))),
            NEG_TOKEN_RESP => Ok((remaining, SPNEGOToken::Response(SPNEGOTokenResponseBody::from_der(content)?.1))),
            _ => Err(fail(input)),
        }
    }

    /// Encodes the token. `header` adds the GSS-API framing, which only the
    /// first token of an exchange carries.
    pub fn as_bytes(&self, header: bool) -> Vec<u8> {
        let choice = match self {
            SPNEGOToken::Init(body) => body.as_bytes(),
            SPNEGOToken::Response(body) => body.as_bytes(),
        };
        if !header {
            return choice;
        }
        encode_tlv(APPLICATION, &[encode_tlv(OID, &SPNEGO_ID), choice].concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NTLM_OID: [u8; 10] = [0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x02, 0x0a];

    #[test]
    fn init_token_has_gss_header() {
        let token = SPNEGOToken::Init(SPNEGOTokenInitBody::new(NTLM_OID.to_vec(), b"NTLMSSP\0".to_vec()));
        let bytes = token.as_bytes(true);
        assert_eq!(&bytes[0..10], &[0x60, 0x28, 0x06, 0x06, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x02]);
        assert_eq!(bytes.len(), 0x28 + 2);
        let (remaining, parsed) = SPNEGOToken::parse(&bytes).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(parsed, token);
    }

    #[test]
    fn bare_response_token() {
        let token = SPNEGOToken::Response(SPNEGOTokenResponseBody::new(vec![9; 4]));
        let bytes = token.as_bytes(false);
        assert_eq!(bytes[0], 0xA1);
        assert_eq!(SPNEGOToken::parse(&bytes).unwrap().1, token);
    }

    #[test]
    fn wrong_mechanism_oid_is_rejected() {
        let token = SPNEGOToken::Init(SPNEGOTokenInitBody::new(NTLM_OID.to_vec(), vec![]));
        let mut bytes = token.as_bytes(true);
        bytes[9] = 0x03;
        assert!(matches!(SPNEGOToken::parse(&bytes), Err(SMBError::ParseError(_))));
        assert!(SPNEGOToken::parse(&[0x30, 0x00]).is_err());
    }
}
