#![no_main]

use bytes::Bytes;
use futures_util::stream;
use libfuzzer_sys::fuzz_target;
use tgapng::{CodecError, TargaDecoder};

fuzz_target!(|data: Vec<u8>| {
    // The first byte picks the input chunk size
    let Some((&split, body)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).max(1);
    let chunks: Vec<Result<Bytes, CodecError>> = body
        .chunks(split)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();

    let mut decoder = TargaDecoder::from_stream(stream::iter(chunks));
    futures_util::FutureExt::now_or_never(async {
        let Ok(header) = decoder.read_header().await else {
            return;
        };

        // Anything accepted must be the supported subset
        assert!(header.validate().is_ok());

        let mut rows = 0u16;
        while let Ok(Some(row)) = decoder.read_scanline().await {
            assert_eq!(row.len(), header.scanline_len());
            rows += 1;
        }
        assert!(rows <= header.height);
    })
    .expect("an in-memory stream never suspends");
});
