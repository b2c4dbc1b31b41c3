use darling::FromAttributes;
use proc_macro2::{Ident, TokenStream};
use quote::quote_spanned;
use syn::{Field, Type};
use syn::spanned::Spanned;

use crate::attrs::{Buffer, BufferLayout, Direct};

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SMBField<'a> {
    field: &'a Field,
    pub(crate) name: &'a Ident,
    ty: &'a Type,
    val_type: SMBFieldType,
    declared: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SMBFieldType {
    Direct(usize),
    Buffer(BufferLayout),
}

impl<'a> SMBField<'a> {
    pub(crate) fn from_field(field: &'a Field, declared: usize) -> darling::Result<Self> {
        let name = field.ident.as_ref()
            .ok_or_else(|| darling::Error::unsupported_shape("unnamed field").with_span(field))?;
        let has_attr = |attr: &str| field.attrs.iter().any(|a| a.path().is_ident(attr));
        let val_type = if has_attr("smb_buffer") {
            SMBFieldType::Buffer(Buffer::from_attributes(&field.attrs)?.layout()?)
        } else if has_attr("smb_direct") {
            SMBFieldType::Direct(Direct::from_attributes(&field.attrs)?.start()?)
        } else {
            return Err(darling::Error::custom("field needs #[smb_direct] or #[smb_buffer]"));
        };
        Ok(Self { field, name, ty: &field.ty, val_type, declared })
    }

    /// Fixed fields sort by offset ahead of buffers, which keep declaration order.
    pub(crate) fn order(&self) -> (usize, usize) {
        match &self.val_type {
            SMBFieldType::Direct(start) => (0, *start),
            SMBFieldType::Buffer(_) => (1, self.declared),
        }
    }

    /// End of the offset/length fields a buffer owns inside the fixed part.
    pub(crate) fn attr_byte_size(&self) -> usize {
        match &self.val_type {
            SMBFieldType::Direct(_) => 0,
            SMBFieldType::Buffer(layout) => layout.offset.as_ref()
                .map_or(0, |offset| offset.end())
                .max(layout.length.end()),
        }
    }

    pub(crate) fn smb_byte_size(&self) -> TokenStream {
        let name = self.name;
        match &self.val_type {
            SMBFieldType::Direct(start) => quote_spanned! {self.field.span()=>
                size = ::std::cmp::max(size, #start + ::smb_core::SMBByteSize::smb_byte_size(&self.#name));
            },
            SMBFieldType::Buffer(_) => quote_spanned! {self.field.span()=>
                size += ::smb_core::SMBByteSize::smb_byte_size(&self.#name);
            },
        }
    }

    pub(crate) fn smb_from_bytes(&self) -> TokenStream {
        let name = self.name;
        let ty = self.ty;
        match &self.val_type {
            SMBFieldType::Direct(start) => quote_spanned! {self.field.span()=>
                let #name: #ty = {
                    let field_input = input.get(#start..)
                        .ok_or_else(|| ::smb_core::error::SMBError::payload_too_small(#start, input.len()))?;
                    let (_, value) = <#ty as ::smb_core::SMBFromBytes>::smb_from_bytes(field_input)?;
                    current_pos = ::std::cmp::max(current_pos, #start + ::smb_core::SMBByteSize::smb_byte_size(&value));
                    value
                };
            },
            SMBFieldType::Buffer(layout) => {
                let length = layout.length.smb_from_bytes();
                let offset = match &layout.offset {
                    Some(offset) => offset.smb_from_bytes(),
                    None => quote_spanned! {self.field.span()=> current_pos },
                };
                quote_spanned! {self.field.span()=>
                    let #name: #ty = {
                        let buffer_length: usize = #length;
                        let buffer_start: usize = if buffer_length == 0 { current_pos } else { #offset };
                        let buffer_end = buffer_start + buffer_length;
                        if buffer_end > input.len() {
                            return Err(::smb_core::error::SMBError::payload_too_small(buffer_end, input.len()));
                        }
                        let (_, value) = <#ty as ::smb_core::SMBVecFromBytes>::smb_from_bytes_vec(
                            &input[buffer_start..buffer_end],
                            buffer_length,
                        )?;
                        current_pos = ::std::cmp::max(current_pos, buffer_end);
                        value
                    };
                }
            }
        }
    }

    pub(crate) fn smb_to_bytes(&self) -> TokenStream {
        let name = self.name;
        match &self.val_type {
            SMBFieldType::Direct(start) => quote_spanned! {self.field.span()=>
                let bytes = ::smb_core::SMBToBytes::smb_to_bytes(&self.#name);
                item[#start..(#start + bytes.len())].copy_from_slice(&bytes);
                current_pos = ::std::cmp::max(current_pos, #start + bytes.len());
            },
            SMBFieldType::Buffer(layout) => {
                let offset = layout.offset.as_ref()
                    .map(|offset| offset.smb_to_bytes(quote_spanned! {self.field.span()=> current_pos }));
                let length = layout.length.smb_to_bytes(quote_spanned! {self.field.span()=> bytes.len() });
                quote_spanned! {self.field.span()=>
                    let bytes = ::smb_core::SMBToBytes::smb_to_bytes(&self.#name);
                    #offset
                    #length
                    item[current_pos..(current_pos + bytes.len())].copy_from_slice(&bytes);
                    current_pos += bytes.len();
                }
            }
        }
    }
}
