use proc_macro2::TokenStream;
use quote::quote;

use crate::CreatorFn;
use crate::field_mapping::SMBFieldMapping;

pub(crate) struct FromBytesCreator {}

impl CreatorFn for FromBytesCreator {
    fn call(self, mapping: &SMBFieldMapping) -> TokenStream {
        let name = mapping.name;
        let fixed_size = mapping.fixed_size();
        let min_size = mapping.min_size();
        let tag = mapping.byte_tag.as_ref().map(|tag| tag.smb_from_bytes());
        let fields = mapping.fields.iter().map(|field| field.smb_from_bytes());
        let constructor = mapping.constructor();
        quote! {
            impl ::smb_core::SMBFromBytes for #name {
                #[allow(unused_mut, unused_assignments)]
                fn smb_from_bytes(input: &[u8]) -> ::smb_core::SMBParseResult<&[u8], Self> where Self: Sized {
                    #tag
                    let mut current_pos: usize = #fixed_size;
                    #(#fields)*
                    let consumed = ::std::cmp::min(::std::cmp::max(current_pos, #min_size), input.len());
                    Ok((&input[consumed..], #constructor))
                }
            }
        }
    }
}
