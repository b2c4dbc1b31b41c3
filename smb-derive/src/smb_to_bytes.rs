use proc_macro2::TokenStream;
use quote::quote;

use crate::CreatorFn;
use crate::field_mapping::SMBFieldMapping;

pub(crate) struct ToBytesCreator {}

impl CreatorFn for ToBytesCreator {
    fn call(self, mapping: &SMBFieldMapping) -> TokenStream {
        let name = mapping.name;
        let fixed_size = mapping.fixed_size();
        let tag = mapping.byte_tag.as_ref().map(|tag| tag.smb_to_bytes());
        let fields = mapping.fields.iter().map(|field| field.smb_to_bytes());
        quote! {
            impl ::smb_core::SMBToBytes for #name {
                #[allow(unused_mut, unused_variables, unused_assignments)]
                fn smb_to_bytes(&self) -> Vec<u8> {
                    let mut item = vec![0_u8; ::smb_core::SMBByteSize::smb_byte_size(self)];
                    let mut current_pos: usize = #fixed_size;
                    #tag
                    #(#fields)*
                    item
                }
            }
        }
    }
}
