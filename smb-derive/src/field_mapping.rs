use darling::FromAttributes;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::attrs::ByteTag;
use crate::field::SMBField;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SMBFieldMappingType {
    NamedStruct,
    Unit,
}

#[derive(Debug)]
pub(crate) struct SMBFieldMapping<'a> {
    pub(crate) name: &'a Ident,
    pub(crate) fields: Vec<SMBField<'a>>,
    pub(crate) byte_tag: Option<ByteTag>,
    mapping_type: SMBFieldMappingType,
}

impl<'a> SMBFieldMapping<'a> {
    pub(crate) fn from_derive_input(input: &'a DeriveInput) -> darling::Result<Self> {
        let byte_tag = if input.attrs.iter().any(|attr| attr.path().is_ident("smb_byte_tag")) {
            Some(ByteTag::from_attributes(&input.attrs)?)
        } else {
            None
        };
        let Data::Struct(structure) = &input.data else {
            return Err(darling::Error::unsupported_shape("enum or union").with_span(input));
        };
        let (mut fields, mapping_type) = match &structure.fields {
            Fields::Named(named) => {
                let mut errors = darling::Error::accumulator();
                let fields = named.named.iter().enumerate()
                    .filter_map(|(idx, field)| errors.handle(
                        SMBField::from_field(field, idx).map_err(|e| e.with_span(field))
                    ))
                    .collect::<Vec<_>>();
                errors.finish()?;
                (fields, SMBFieldMappingType::NamedStruct)
            }
            Fields::Unit => (Vec::new(), SMBFieldMappingType::Unit),
            Fields::Unnamed(_) => return Err(darling::Error::unsupported_shape("tuple struct").with_span(input)),
        };
        fields.sort_by_key(SMBField::order);
        Ok(Self { name: &input.ident, fields, byte_tag, mapping_type })
    }

    /// Size of the part every encoding has regardless of field values.
    pub(crate) fn fixed_size(&self) -> usize {
        let tagged = self.byte_tag.as_ref().map_or(0, ByteTag::fixed_size);
        self.fields.iter().map(SMBField::attr_byte_size).fold(tagged, usize::max)
    }

    pub(crate) fn min_size(&self) -> usize {
        self.byte_tag.as_ref().map_or(0, |tag| tag.value as usize)
    }

    pub(crate) fn constructor(&self) -> TokenStream {
        let names = self.fields.iter().map(|field| field.name);
        match self.mapping_type {
            SMBFieldMappingType::NamedStruct => quote! { Self { #(#names,)* } },
            SMBFieldMappingType::Unit => quote! { Self },
        }
    }
}
