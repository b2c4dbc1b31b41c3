//! The DER subset SPNEGO tokens are written in [X.690 8.1]: definite
//! lengths, explicit context tags and a few universal types.

use nom::bytes::complete::take;
use nom::combinator::all_consuming;
use nom::error::{Error, ErrorKind};
use nom::multi::many0;
use nom::number::complete::le_u8;
use nom::IResult;

pub const APPLICATION: u8 = 0x60;
pub const SEQUENCE: u8 = 0x30;
pub const OID: u8 = 0x06;
pub const OCTET_STRING: u8 = 0x04;
pub const ENUMERATED: u8 = 0x0A;

/// iso.org.dod.internet.security.mechanism.snego (1.3.6.1.5.5.2)
pub const SPNEGO_ID: [u8; 6] = [0x2b, 0x06, 0x01, 0x05, 0x05, 0x02];

/// Constructed context-specific tag `[n]`.
pub const fn context(n: u8) -> u8 {
    0xA0 | n
}

pub fn encode_length(length: usize) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }
    let bytes = length.to_be_bytes();
    let significant = &bytes[bytes.iter().take_while(|byte| **byte == 0).count()..];
    [&[0x80 | significant.len() as u8][..], significant].concat()
}

pub fn encode_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    [&[tag][..], &encode_length(content.len()), content].concat()
}

/// `tag { inner_tag content }`, the explicit tagging every SPNEGO field uses.
pub fn encode_explicit(tag: u8, inner_tag: u8, content: &[u8]) -> Vec<u8> {
    encode_tlv(tag, &encode_tlv(inner_tag, content))
}

pub(crate) fn fail(input: &[u8]) -> nom::Err<Error<&[u8]>> {
    nom::Err::Error(Error::new(input, ErrorKind::Fail))
}

pub fn parse_length(input: &[u8]) -> IResult<&[u8], usize> {
    let (remaining, first) = le_u8(input)?;
    if first < 0x80 {
        return Ok((remaining, first as usize));
    }
    let count = (first & 0x7F) as usize;
    if count == 0 || count > std::mem::size_of::<usize>() {
        return Err(fail(input));
    }
    let (remaining, bytes) = take(count)(remaining)?;
    Ok((remaining, bytes.iter().fold(0, |length, byte| (length << 8) | *byte as usize)))
}

/// One element of any type, as `(tag, content)`.
pub fn parse_tlv(input: &[u8]) -> IResult<&[u8], (u8, &[u8])> {
    let (remaining, tag) = le_u8(input)?;
    let (remaining, length) = parse_length(remaining)?;
    let (remaining, content) = take(length)(remaining)?;
    Ok((remaining, (tag, content)))
}

/// One element that has to carry `tag`.
pub fn expect_tlv(input: &[u8], tag: u8) -> IResult<&[u8], &[u8]> {
    let (remaining, (found, content)) = parse_tlv(input)?;
    if found != tag {
        return Err(fail(input));
    }
    Ok((remaining, content))
}

/// The elements of a SEQUENCE. Bytes left over inside it are an error.
pub fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<(u8, &[u8])>> {
    let (remaining, sequence) = expect_tlv(input, SEQUENCE)?;
    let (_, fields) = all_consuming(many0(parse_tlv))(sequence)?;
    Ok((remaining, fields))
}
