//! Derives `SMBByteSize`, `SMBFromBytes` and `SMBToBytes` for SMB2 bodies
//! with a fixed part followed by at most a few variable-length buffers.
//!
//! Offsets in the attributes are relative to the start of the body.
//!
//! ```ignore
//! #[derive(SMBByteSize, SMBFromBytes, SMBToBytes)]
//! #[smb_byte_tag(value = 17)]
//! pub struct SMBReadResponse {
//!     #[smb_direct(start(fixed = 8))]
//!     pub data_remaining: u32,
//!     #[smb_buffer(
//!         offset(inner(start = 2, num_type = "u8", subtract = 64)),
//!         length(inner(start = 4, num_type = "u32"))
//!     )]
//!     pub data: Vec<u8>,
//! }
//! ```
//!
//! * `smb_byte_tag(value = N)` writes and checks the StructureSize at byte 0.
//!   An odd `N` counts the first buffer byte, so the fixed part is `N & !1`
//!   bytes and an encoding is never shorter than `N`.
//! * `smb_direct(start(fixed = N))` places a field at byte `N`.
//! * `smb_buffer` appends a `Vec<u8>` or UTF-16 `String` after the fixed part
//!   and records its length (and optionally its offset, with `subtract`
//!   turning a header-relative offset into a body-relative one).
//!
//! Bytes no field claims are written as zero and ignored on parse.

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

use crate::field_mapping::SMBFieldMapping;
use crate::smb_byte_size::ByteSizeCreator;
use crate::smb_from_bytes::FromBytesCreator;
use crate::smb_to_bytes::ToBytesCreator;

mod attrs;
mod field;
mod field_mapping;
mod smb_byte_size;
mod smb_from_bytes;
mod smb_to_bytes;

#[proc_macro_derive(SMBFromBytes, attributes(smb_direct, smb_buffer, smb_byte_tag))]
pub fn smb_from_bytes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_impl_creator(&input, FromBytesCreator {})
}

#[proc_macro_derive(SMBToBytes, attributes(smb_direct, smb_buffer, smb_byte_tag))]
pub fn smb_to_bytes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_impl_creator(&input, ToBytesCreator {})
}

#[proc_macro_derive(SMBByteSize, attributes(smb_direct, smb_buffer, smb_byte_tag))]
pub fn smb_byte_size(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_impl_creator(&input, ByteSizeCreator {})
}

pub(crate) trait CreatorFn {
    fn call(self, mapping: &SMBFieldMapping) -> proc_macro2::TokenStream;
}

fn derive_impl_creator(input: &DeriveInput, creator: impl CreatorFn) -> TokenStream {
    match SMBFieldMapping::from_derive_input(input) {
        Ok(mapping) => creator.call(&mapping).into(),
        Err(e) => e.write_errors().into(),
    }
}
