use darling::{FromAttributes, FromMeta};
use darling::ast::NestedMeta;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{Expr, Lit, Meta};

#[derive(Debug, PartialEq, Eq, FromMeta)]
pub struct DirectInner {
    pub start: usize,
    pub num_type: String,
    #[darling(default)]
    pub subtract: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum AttributeInfo {
    Fixed(usize),
    Inner(DirectInner),
    #[default] CurrentPos,
}

impl FromMeta for AttributeInfo {
    fn from_list(items: &[NestedMeta]) -> darling::Result<Self> {
        for item in items {
            if let NestedMeta::Meta(Meta::NameValue(meta)) = item {
                if meta.path.is_ident("fixed") {
                    if let Expr::Lit(lit) = &meta.value {
                        if let Lit::Int(int) = &lit.lit {
                            return Ok(AttributeInfo::Fixed(int.base10_parse::<usize>()?))
                        }
                    }
                }
            } else if let NestedMeta::Meta(Meta::List(list)) = item {
                if list.path.is_ident("inner") {
                    return Ok(AttributeInfo::Inner(DirectInner::from_nested_meta(item)?))
                }
            }
        }
        Err(darling::Error::missing_field("fixed | current_pos | inner"))
    }

    fn from_string(value: &str) -> darling::Result<Self> {
        match value.to_lowercase().trim().replace([' ', '_'], "").as_str() {
            "currentpos" => Ok(AttributeInfo::CurrentPos),
            _ => Err(darling::Error::missing_field("fixed | current_pos | inner"))
        }
    }
}

/// An integer field in the fixed part that describes a buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct NumberField {
    pub start: usize,
    pub num_type: Ident,
    pub width: usize,
    pub subtract: usize,
}

impl NumberField {
    fn from_inner(inner: &DirectInner) -> darling::Result<Self> {
        let width = match inner.num_type.as_str() {
            "u8" => 1,
            "u16" => 2,
            "u32" => 4,
            "u64" => 8,
            other => return Err(darling::Error::unknown_value(other)),
        };
        Ok(Self {
            start: inner.start,
            num_type: Ident::new(&inner.num_type, Span::call_site()),
            width,
            subtract: inner.subtract,
        })
    }

    pub(crate) fn end(&self) -> usize {
        self.start + self.width
    }

    /// Reads the number as a `usize`, with `subtract` already removed.
    pub(crate) fn smb_from_bytes(&self) -> TokenStream {
        let start = self.start;
        let subtract = self.subtract;
        let ty = &self.num_type;
        quote! {{
            let number_input = input.get(#start..)
                .ok_or_else(|| ::smb_core::error::SMBError::payload_too_small(#start, input.len()))?;
            let (_, number) = <#ty as ::smb_core::SMBFromBytes>::smb_from_bytes(number_input)?;
            (number as usize).checked_sub(#subtract)
                .ok_or_else(|| ::smb_core::error::SMBError::parse_error(
                    format!("Buffer field at {} points before the body: {}", #start, number)
                ))?
        }}
    }

    pub(crate) fn smb_to_bytes(&self, value: TokenStream) -> TokenStream {
        let start = self.start;
        let subtract = self.subtract;
        let ty = &self.num_type;
        quote! {
            let number_bytes = ::smb_core::SMBToBytes::smb_to_bytes(&((#value + #subtract) as #ty));
            item[#start..(#start + number_bytes.len())].copy_from_slice(&number_bytes);
        }
    }
}

#[derive(Debug, FromAttributes, Default, PartialEq, Eq)]
#[darling(attributes(smb_direct))]
pub struct Direct {
    pub start: AttributeInfo,
}

impl Direct {
    pub(crate) fn start(&self) -> darling::Result<usize> {
        match self.start {
            AttributeInfo::Fixed(start) => Ok(start),
            _ => Err(darling::Error::custom("smb_direct fields need start(fixed = N)")),
        }
    }
}

#[derive(Debug, FromAttributes, PartialEq, Eq)]
#[darling(attributes(smb_buffer))]
pub struct Buffer {
    #[darling(default)]
    pub offset: AttributeInfo,
    pub length: AttributeInfo,
}

/// A validated `smb_buffer`: the data follows the fixed part, its length is
/// always written to the body and its offset is written when `offset` is set.
#[derive(Debug, PartialEq, Eq)]
pub struct BufferLayout {
    pub offset: Option<NumberField>,
    pub length: NumberField,
}

impl Buffer {
    pub(crate) fn layout(&self) -> darling::Result<BufferLayout> {
        let offset = match &self.offset {
            AttributeInfo::CurrentPos => None,
            AttributeInfo::Inner(inner) => Some(NumberField::from_inner(inner)?),
            AttributeInfo::Fixed(_) => return Err(darling::Error::custom("smb_buffer offset must be inner(..) or current_pos")),
        };
        let length = match &self.length {
            AttributeInfo::Inner(inner) => NumberField::from_inner(inner)?,
            _ => return Err(darling::Error::custom("smb_buffer length must be inner(..)")),
        };
        Ok(BufferLayout { offset, length })
    }
}

#[derive(Debug, FromAttributes, Default, Eq, PartialEq)]
#[darling(attributes(smb_byte_tag))]
pub struct ByteTag {
    pub value: u16,
}

impl ByteTag {
    /// Size of the fixed part. A tag with the low bit set counts one byte of
    /// the variable buffer.
    pub(crate) fn fixed_size(&self) -> usize {
        (self.value as usize & !1).max(2)
    }

    pub(crate) fn smb_from_bytes(&self) -> TokenStream {
        let value = self.value;
        let fixed_size = self.fixed_size();
        quote! {
            if input.len() < #fixed_size {
                return Err(::smb_core::error::SMBError::payload_too_small(#fixed_size, input.len()));
            }
            let (_, structure_size) = <u16 as ::smb_core::SMBFromBytes>::smb_from_bytes(input)?;
            if structure_size != #value {
                return Err(::smb_core::error::SMBError::parse_error(
                    format!("Invalid structure size {} (expected {})", structure_size, #value)
                ));
            }
        }
    }

    pub(crate) fn smb_to_bytes(&self) -> TokenStream {
        let value = self.value;
        quote! {
            item[0..2].copy_from_slice(&(#value as u16).to_le_bytes());
        }
    }
}
