//! Core traits and types shared by the SMB client crates.
//!
//! Every wire structure implements [`SMBByteSize`], [`SMBFromBytes`] and
//! [`SMBToBytes`]. Parsing returns the unconsumed input alongside the value so
//! callers can chain field reads the same way `nom` parsers chain.

use uuid::Uuid;

use error::SMBError;

pub mod error;
pub mod logging;
pub mod nt_status;

pub type SMBResult<T> = Result<T, SMBError>;

pub type SMBParseResult<I, O, E = SMBError> = Result<(I, O), E>;

pub trait SMBByteSize {
    fn smb_byte_size(&self) -> usize;
}

pub trait SMBFromBytes: SMBByteSize {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized;
}

pub trait SMBToBytes: SMBByteSize {
    fn smb_to_bytes(&self) -> Vec<u8>;
}

impl<T: SMBByteSize> SMBByteSize for Vec<T> {
    fn smb_byte_size(&self) -> usize {
        self.iter().fold(0, |prev, x| prev + x.smb_byte_size())
    }
}

impl<T: SMBToBytes> SMBToBytes for Vec<T> {
    fn smb_to_bytes(&self) -> Vec<u8> {
        self.iter().flat_map(SMBToBytes::smb_to_bytes).collect()
    }
}

pub trait SMBVecFromBytes {
    fn smb_from_bytes_vec(input: &[u8], count: usize) -> SMBParseResult<&[u8], Self> where Self: Sized;
}

impl<T: SMBFromBytes> SMBVecFromBytes for Vec<T> {
    fn smb_from_bytes_vec(input: &[u8], count: usize) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let mut remaining = input;
        // Elements are at least one byte wide.
        let mut msg_vec = Vec::<T>::with_capacity(count.min(input.len()));
        for _ in 0..count {
            let (r, val) = T::smb_from_bytes(remaining)?;
            msg_vec.push(val);
            remaining = r;
        }
        Ok((remaining, msg_vec))
    }
}

/// Reads `count` bytes of UTF-16LE text.
impl SMBVecFromBytes for String {
    fn smb_from_bytes_vec(input: &[u8], count: usize) -> SMBParseResult<&[u8], Self> where Self: Sized {
        if count % 2 != 0 {
            return Err(SMBError::parse_error("UTF-16 string has an odd byte length"));
        }
        let (remaining, vec) = <Vec<u16>>::smb_from_bytes_vec(input, count / 2)?;
        let string = String::from_utf16(&vec)
            .map_err(|_e| SMBError::parse_error("Invalid UTF-16 string"))?;
        Ok((remaining, string))
    }
}

impl SMBByteSize for String {
    fn smb_byte_size(&self) -> usize {
        self.encode_utf16().count() * 2
    }
}

impl SMBToBytes for String {
    fn smb_to_bytes(&self) -> Vec<u8> {
        self.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }
}

impl SMBFromBytes for Uuid {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let (remaining, bytes) = <[u8; 16]>::smb_from_bytes(input)?;
        Ok((remaining, Uuid::from_bytes_le(bytes)))
    }
}

impl SMBByteSize for Uuid {
    fn smb_byte_size(&self) -> usize {
        16
    }
}

impl SMBToBytes for Uuid {
    fn smb_to_bytes(&self) -> Vec<u8> {
        self.to_bytes_le().to_vec()
    }
}

impl SMBByteSize for bool {
    fn smb_byte_size(&self) -> usize {
        1
    }
}

impl SMBFromBytes for bool {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let (remaining, value) = u8::smb_from_bytes(input)?;
        Ok((remaining, value != 0))
    }
}

impl SMBToBytes for bool {
    fn smb_to_bytes(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }
}

fn split_fixed<const N: usize>(input: &[u8]) -> SMBParseResult<&[u8], [u8; N]> {
    if input.len() < N {
        return Err(SMBError::payload_too_small(N, input.len()));
    }
    let (head, remaining) = input.split_at(N);
    let res = <[u8; N]>::try_from(head)
        .map_err(|_e| SMBError::parse_error("Invalid byte slice"))?;
    Ok((remaining, res))
}

impl<const N: usize> SMBByteSize for [u8; N] {
    fn smb_byte_size(&self) -> usize {
        N
    }
}

impl<const N: usize> SMBFromBytes for [u8; N] {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> {
        split_fixed::<N>(input)
    }
}

impl<const N: usize> SMBToBytes for [u8; N] {
    fn smb_to_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }
}

macro_rules! impl_smb_for_unsigned_type {(
    $($t:ty)*
) => (
    $(
        impl SMBByteSize for $t {
            fn smb_byte_size(&self) -> usize {
                std::mem::size_of_val(self)
            }
        }

        impl SMBFromBytes for $t {
            fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> {
                const T_SIZE: usize = std::mem::size_of::<$t>();
                let (remaining, bytes) = split_fixed::<T_SIZE>(input)?;
                Ok((remaining, <$t>::from_le_bytes(bytes)))
            }
        }

        impl SMBToBytes for $t {
            fn smb_to_bytes(&self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }
        }
    )*
)}

impl_smb_for_unsigned_type! {
    u8 u16 u32 u64 u128
}
