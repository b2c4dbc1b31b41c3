/// Implements the smb-core codec traits for a `bitflags` type using its
/// underlying little-endian integer. Unknown bits are retained so a decoded
/// value encodes back to the same bytes.
macro_rules! impl_smb_for_bitflag {(
    $($t:ty)*
) => (
    $(
        impl ::smb_core::SMBByteSize for $t {
            fn smb_byte_size(&self) -> usize {
                std::mem::size_of_val(&self.bits())
            }
        }

        impl ::smb_core::SMBFromBytes for $t {
            fn smb_from_bytes(input: &[u8]) -> ::smb_core::SMBParseResult<&[u8], Self> {
                let (remaining, bits) = <<$t as ::bitflags::Flags>::Bits as ::smb_core::SMBFromBytes>::smb_from_bytes(input)?;
                Ok((remaining, <$t>::from_bits_retain(bits)))
            }
        }

        impl ::smb_core::SMBToBytes for $t {
            fn smb_to_bytes(&self) -> Vec<u8> {
                ::smb_core::SMBToBytes::smb_to_bytes(&self.bits())
            }
        }
    )*
)}

/// Implements the smb-core codec traits for a fieldless `num_enum` type.
/// Decoding a value outside the enum is a parse error.
macro_rules! impl_smb_for_enum {(
    $($t:ty: $repr:ty),* $(,)?
) => (
    $(
        impl ::smb_core::SMBByteSize for $t {
            fn smb_byte_size(&self) -> usize {
                std::mem::size_of::<$repr>()
            }
        }

        impl ::smb_core::SMBFromBytes for $t {
            fn smb_from_bytes(input: &[u8]) -> ::smb_core::SMBParseResult<&[u8], Self> {
                let (remaining, value) = <$repr as ::smb_core::SMBFromBytes>::smb_from_bytes(input)?;
                let parsed = <$t as ::num_enum::TryFromPrimitive>::try_from_primitive(value)
                    .map_err(|e| ::smb_core::error::SMBError::parse_error(e.to_string()))?;
                Ok((remaining, parsed))
            }
        }

        impl ::smb_core::SMBToBytes for $t {
            fn smb_to_bytes(&self) -> Vec<u8> {
                ::smb_core::SMBToBytes::smb_to_bytes(&(*self as $repr))
            }
        }
    )*
)}

pub(crate) use impl_smb_for_bitflag;
pub(crate) use impl_smb_for_enum;
