use digest::Mac;

/// SP800-108 KDF in counter mode, with a 32-bit counter and a 32-bit
/// big-endian output length: `K(i) = PRF(i || label || 0x00 || context || L)`.
pub fn derive_key<T: Mac + Clone>(mac: T, label: &[u8], context: &[u8], key_len_bits: u32) -> Vec<u8> {
    let key_len = (key_len_bits / 8) as usize;
    let mut output = Vec::with_capacity(key_len);
    let mut counter = 1_u32;
    while output.len() < key_len {
        let block = mac.clone()
            .chain_update(counter.to_be_bytes())
            .chain_update(label)
            .chain_update([0])
            .chain_update(context)
            .chain_update(key_len_bits.to_be_bytes())
            .finalize()
            .into_bytes();
        let take = (key_len - output.len()).min(block.len());
        output.extend_from_slice(&block[..take]);
        counter += 1;
    }
    output
}
