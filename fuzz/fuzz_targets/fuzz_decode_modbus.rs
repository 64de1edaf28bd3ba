#![no_main]
use emcp::decoder::{
    MEASUREMENTS_OFFSET, decode_discrete_input_block, decode_input_register_block,
    decode_overcurrent_protection, encode_discrete_input_block, encode_input_register_block,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Every decoder must reject or accept arbitrary payloads without panicking
    let _ = decode_overcurrent_protection(data);

    if let Ok(status) = decode_input_register_block(data) {
        let encoded = encode_input_register_block(&status);
        assert_eq!(&encoded[MEASUREMENTS_OFFSET..], &data[MEASUREMENTS_OFFSET..]);
        assert_eq!(&encoded[..4], &data[..4]);
        assert_eq!(&encoded[6..16], &data[6..16]);
    }

    if let Ok(status) = decode_discrete_input_block(data) {
        assert_eq!(&encode_discrete_input_block(&status)[..], data);
    }
});
