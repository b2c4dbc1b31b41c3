use nom::combinator::all_consuming;
use nom::IResult;
use nom::multi::many0;
use serde::{Deserialize, Serialize};

use crate::util::auth::spnego::der::{context, encode_explicit, encode_tlv, expect_tlv, fail, OCTET_STRING, OID, parse_sequence, SEQUENCE};
use crate::util::auth::spnego::spnego_token::NEG_TOKEN_INIT;

const MECH_TYPES: u8 = context(0);
const REQ_FLAGS: u8 = context(1);
const MECH_TOKEN: u8 = context(2);
/// mechListMIC, or negHints in a server's NegTokenInit2.
const MECH_LIST_MIC: u8 = context(3);
const INIT2_MECH_LIST_MIC: u8 = context(4);

/// `NegTokenInit` [RFC 4178 4.2.1]: the mechanisms the client offers and the
/// optimistic token for the first of them.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct SPNEGOTokenInitBody {
    pub mech_type_list: Option<Vec<Vec<u8>>>,
    pub mech_token: Option<Vec<u8>>,
    pub mech_list_mic: Option<Vec<u8>>,
}

impl SPNEGOTokenInitBody {
    pub fn new(mech_type: Vec<u8>, mech_token: Vec<u8>) -> Self {
        Self {
            mech_type_list: Some(vec![mech_type]),
            mech_token: Some(mech_token),
            mech_list_mic: None,
        }
    }

    /// Decodes the content of the `[0]` choice.
    pub fn from_der(content: &[u8]) -> IResult<&[u8], Self> {
        let (remaining, fields) = parse_sequence(content)?;
        let mut body = Self::default();
        for (tag, field) in fields {
            match tag {
                MECH_TYPES => {
                    let (_, list) = expect_tlv(field, SEQUENCE)?;
                    let (_, oids) = all_consuming(many0(parse_oid))(list)?;
                    body.mech_type_list = Some(oids.into_iter().map(<[u8]>::to_vec).collect());
                }
                REQ_FLAGS => {}
                MECH_TOKEN => body.mech_token = Some(expect_tlv(field, OCTET_STRING)?.1.to_vec()),
                MECH_LIST_MIC if field.first() != Some(&OCTET_STRING) => {}
                MECH_LIST_MIC | INIT2_MECH_LIST_MIC => {
                    body.mech_list_mic = Some(expect_tlv(field, OCTET_STRING)?.1.to_vec());
                }
                _ => return Err(fail(field)),
            }
        }
        Ok((remaining, body))
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut fields = Vec::new();
        if let Some(mech_type_list) = &self.mech_type_list {
            let oids: Vec<u8> = mech_type_list.iter().flat_map(|oid| encode_tlv(OID, oid)).collect();
            fields.extend(encode_explicit(MECH_TYPES, SEQUENCE, &oids));
        }
        if let Some(mech_token) = &self.mech_token {
            fields.extend(encode_explicit(MECH_TOKEN, OCTET_STRING, mech_token));
        }
        if let Some(mech_list_mic) = &self.mech_list_mic {
            fields.extend(encode_explicit(MECH_LIST_MIC, OCTET_STRING, mech_list_mic));
        }
        encode_explicit(NEG_TOKEN_INIT, SEQUENCE, &fields)
    }
}

fn parse_oid(input: &[u8]) -> IResult<&[u8], &[u8]> {
    expect_tlv(input, OID)
}
