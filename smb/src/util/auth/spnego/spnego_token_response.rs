use nom::IResult;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::auth::spnego::der::{context, encode_explicit, ENUMERATED, expect_tlv, fail, OCTET_STRING, OID, parse_sequence, SEQUENCE};
use crate::util::auth::spnego::spnego_token::NEG_TOKEN_RESP;

const NEG_STATE: u8 = context(0);
const SUPPORTED_MECH: u8 = context(1);
const RESPONSE_TOKEN: u8 = context(2);
const MECH_LIST_MIC: u8 = context(3);

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Deserialize, Serialize)]
pub enum NegotiateState {
    AcceptCompleted = 0x0,
    AcceptIncomplete,
    Reject,
    RequestMic,
}

/// `NegTokenResp` [RFC 4178 4.2.2]. Servers send it with the mechanism
/// challenge; the client answers with one carrying only the response token.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct SPNEGOTokenResponseBody {
    pub state: Option<NegotiateState>,
    pub supported_mech: Option<Vec<u8>>,
    pub response_token: Option<Vec<u8>>,
    pub mech_list_mic: Option<Vec<u8>>,
}

impl SPNEGOTokenResponseBody {
    pub fn new(response_token: Vec<u8>) -> Self {
        Self {
            response_token: Some(response_token),
            ..Default::default()
        }
    }

    /// Decodes the content of the `[1]` choice.
    pub fn from_der(content: &[u8]) -> IResult<&[u8], Self> {
        let (remaining, fields) = parse_sequence(content)?;
        let mut body = Self::default();
        for (tag, field) in fields {
            match tag {
                NEG_STATE => {
                    let (_, value) = expect_tlv(field, ENUMERATED)?;
                    let state = match value {
                        [state] => NegotiateState::try_from_primitive(*state).map_err(|_| fail(field))?,
                        _ => return Err(fail(field)),
                    };
                    body.state = Some(state);
                }
                SUPPORTED_MECH => body.supported_mech = Some(expect_tlv(field, OID)?.1.to_vec()),
                RESPONSE_TOKEN => body.response_token = Some(expect_tlv(field, OCTET_STRING)?.1.to_vec()),
                MECH_LIST_MIC => body.mech_list_mic = Some(expect_tlv(field, OCTET_STRING)?.1.to_vec()),
                _ => return Err(fail(field)),
            }
        }
        Ok((remaining, body))
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut fields = Vec::new();
        if let Some(state) = self.state {
            fields.extend(encode_explicit(NEG_STATE, ENUMERATED, &[state as u8]));
        }
        if let Some(mech) = &self.supported_mech {
            fields.extend(encode_explicit(SUPPORTED_MECH, OID, mech));
        }
        if let Some(token) = &self.response_token {
            fields.extend(encode_explicit(RESPONSE_TOKEN, OCTET_STRING, token));
        }
        if let Some(mic) = &self.mech_list_mic {
            fields.extend(encode_explicit(MECH_LIST_MIC, OCTET_STRING, mic));
        }
        encode_explicit(NEG_TOKEN_RESP, SEQUENCE, &fields)
    }
}
