#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use tgapng::{PNG_SIGNATURE, ZlibCompressor, transcode_chunks};

fuzz_target!(|data: Vec<u8>| {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    let chunks = data.chunks(97).map(Bytes::copy_from_slice);
    if let Ok(out) = rt.block_on(transcode_chunks(chunks, ZlibCompressor::new(1))) {
        let png = out.concat();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }
});
