use proc_macro2::TokenStream;
use quote::quote;

use crate::CreatorFn;
use crate::field_mapping::SMBFieldMapping;

pub(crate) struct ByteSizeCreator {}

impl CreatorFn for ByteSizeCreator {
    fn call(self, mapping: &SMBFieldMapping) -> TokenStream {
        let name = mapping.name;
        let fixed_size = mapping.fixed_size();
        let min_size = mapping.min_size();
        let fields = mapping.fields.iter().map(|field| field.smb_byte_size());
        quote! {
            impl ::smb_core::SMBByteSize for #name {
                #[allow(unused_mut)]
                fn smb_byte_size(&self) -> usize {
                    let mut size: usize = #fixed_size;
                    #(#fields)*
                    ::std::cmp::max(size, #min_size)
                }
            }
        }
    }
}
