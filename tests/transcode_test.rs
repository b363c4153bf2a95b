// Integration tests for the Targa to PNG transcoding API
// Tests cover: PNG framing, pixel conversion, chunk delivery, failures, cancellation

use bytes::Bytes;
use futures_util::StreamExt;
use miniz_oxide::inflate::decompress_to_vec_zlib;
use tgapng::{
    BridgeQueue, ChunkReader, CodecError, PNG_SIGNATURE, PngEncoder, PngHeader, Step, TargaHeader,
    TargaType, TranscodeConfig, Transcoder, TranscoderState, ZlibCompressor, crc32,
    transcode_chunks,
};

/// A decoded PNG chunk: type tag and payload.
struct Chunk {
    ty: [u8; 4],
    payload: Vec<u8>,
}

/// Splits a PNG byte stream into chunks, checking the signature and every CRC.
fn parse_png(png: &[u8]) -> Vec<Chunk> {
    assert_eq!(&png[..8], &PNG_SIGNATURE, "PNG must start with the signature");

    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let body = &png[pos + 4..pos + 8 + len];
        let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
        assert_eq!(crc, crc32(body), "CRC must cover type and payload");

        chunks.push(Chunk {
            ty: body[..4].try_into().unwrap(),
            payload: body[4..].to_vec(),
        });
        pos += 12 + len;
    }
    assert_eq!(pos, png.len(), "no trailing bytes after IEND");
    chunks
}

/// Concatenates and inflates every IDAT payload.
fn image_data(chunks: &[Chunk]) -> Vec<u8> {
    let compressed: Vec<u8> = chunks
        .iter()
        .filter(|c| &c.ty == b"IDAT")
        .flat_map(|c| c.payload.iter().copied())
        .collect();
    decompress_to_vec_zlib(&compressed).expect("IDAT data must be a valid zlib stream")
}

/// Builds a Targa file from a header and BGR pixel bytes.
fn targa(header: TargaHeader, pixels: &[u8]) -> Vec<u8> {
    let mut data = header.to_bytes().to_vec();
    data.extend(std::iter::repeat_n(0xEE, usize::from(header.id_length)));
    data.extend(std::iter::repeat_n(0xDD, usize::from(header.palette_length)));
    data.extend_from_slice(pixels);
    data
}

/// Deterministic BGR pixel bytes for a `width` x `height` image.
fn gradient(width: u16, height: u16) -> Vec<u8> {
    (0..usize::from(width) * usize::from(height) * 3)
        .map(|i| (i * 31 % 256) as u8)
        .collect()
}

async fn transcode(data: &[u8], chunk_size: usize) -> Result<Vec<u8>, CodecError> {
    let chunks = data.chunks(chunk_size).map(Bytes::copy_from_slice);
    let out = transcode_chunks(chunks, ZlibCompressor::default()).await?;
    Ok(out.concat())
}

// ============================================================================
// PNG Structure Tests
// ============================================================================

#[tokio::test]
async fn test_minimal_image_structure() {
    let data = targa(TargaHeader::bgr24(1, 1), &[0x10, 0x20, 0x30]);
    let png = transcode(&data, data.len()).await.unwrap();
    let chunks = parse_png(&png);

    let count = |ty: &[u8; 4]| chunks.iter().filter(|c| &c.ty == ty).count();
    assert_eq!(count(b"IHDR"), 1, "exactly one IHDR");
    assert!(count(b"IDAT") >= 1, "at least one IDAT");
    assert_eq!(count(b"IEND"), 1, "exactly one IEND");

    assert_eq!(&chunks[0].ty, b"IHDR", "IHDR comes first");
    assert_eq!(&chunks.last().unwrap().ty, b"IEND", "IEND comes last");
    assert!(chunks.last().unwrap().payload.is_empty());
}

#[tokio::test]
async fn test_header_matches_source_dimensions() {
    let data = targa(TargaHeader::bgr24(300, 7), &gradient(300, 7));
    let png = transcode(&data, 4096).await.unwrap();
    let chunks = parse_png(&png);

    let ihdr = &chunks[0].payload;
    assert_eq!(ihdr.len(), 13);
    assert_eq!(&ihdr[0..4], &300u32.to_be_bytes());
    assert_eq!(&ihdr[4..8], &7u32.to_be_bytes());
    assert_eq!(&ihdr[8..], &[8, 2, 0, 0, 0], "8 bit RGB, no interlace");
}

#[test]
fn test_encoder_header_and_end_bytes() {
    let mut encoder = PngEncoder::new(Vec::<Bytes>::new());
    encoder.write_signature().unwrap();
    encoder.write_header(&PngHeader::new(1, 1)).unwrap();
    encoder.write_end().unwrap();
    let png = encoder.into_inner().concat();

    assert_eq!(png.len(), 8 + 25 + 12);
    assert_eq!(
        &png[16..29],
        &[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00]
    );
    assert_eq!(&png[33..37], &[0, 0, 0, 0], "IEND has an empty payload");
}

// ============================================================================
// Pixel Conversion Tests
// ============================================================================

#[tokio::test]
async fn test_pixels_are_rgb_with_filter_bytes() {
    // Two rows of two pixels, BGR on the wire
    let pixels = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, //
        0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C,
    ];
    let data = targa(TargaHeader::bgr24(2, 2), &pixels);
    let png = transcode(&data, 5).await.unwrap();

    assert_eq!(
        image_data(&parse_png(&png)),
        vec![
            0x00, 0x03, 0x02, 0x01, 0x06, 0x05, 0x04, //
            0x00, 0x09, 0x08, 0x07, 0x0C, 0x0B, 0x0A,
        ]
    );
}

#[tokio::test]
async fn test_id_and_palette_bytes_are_skipped() {
    let mut header = TargaHeader::bgr24(1, 1);
    header.id_length = 5;
    header.palette_length = 4;
    let data = targa(header, &[0xAA, 0xBB, 0xCC]);

    let png = transcode(&data, 3).await.unwrap();
    assert_eq!(image_data(&parse_png(&png)), vec![0x00, 0xCC, 0xBB, 0xAA]);
}

#[tokio::test]
async fn test_large_image_round_trip() {
    let (width, height) = (257, 129);
    let pixels = gradient(width, height);
    let data = targa(TargaHeader::bgr24(width, height), &pixels);
    let png = transcode(&data, 1000).await.unwrap();

    let raw = image_data(&parse_png(&png));
    let stride = 1 + usize::from(width) * 3;
    assert_eq!(raw.len(), stride * usize::from(height));

    for (row, line) in raw.chunks(stride).enumerate() {
        assert_eq!(line[0], 0, "row {} must use filter type None", row);
        let source = &pixels[row * (stride - 1)..(row + 1) * (stride - 1)];
        for (dst, src) in line[1..].chunks(3).zip(source.chunks(3)) {
            assert_eq!(dst, &[src[2], src[1], src[0]]);
        }
    }
}

// ============================================================================
// Chunk Delivery Tests
// ============================================================================

#[tokio::test]
async fn test_output_independent_of_input_chunking() {
    let data = targa(TargaHeader::bgr24(13, 5), &gradient(13, 5));

    let whole = transcode(&data, data.len()).await.unwrap();
    for size in [1, 2, 3, 17, 18, 19, 40] {
        let split = transcode(&data, size).await.unwrap();
        assert_eq!(whole, split, "chunk size {} changed the output", size);
    }
}

#[tokio::test]
async fn test_small_blocks_make_many_idat_chunks() {
    let data = targa(TargaHeader::bgr24(64, 64), &gradient(64, 64));
    let config = TranscodeConfig::default()
        .with_compression_level(0)
        .with_output_block_size(256);

    let chunks = data.chunks(512).map(Bytes::copy_from_slice);
    let out = transcode_chunks(chunks, ZlibCompressor::from_config(&config))
        .await
        .unwrap();
    let parsed = parse_png(&out.concat());

    let idat: Vec<_> = parsed.iter().filter(|c| &c.ty == b"IDAT").collect();
    assert!(idat.len() > 1, "expected several IDAT chunks");
    assert!(idat.iter().all(|c| c.payload.len() <= 256));
    assert_eq!(image_data(&parsed).len(), 64 * (1 + 64 * 3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_producer_on_another_task() {
    let data = targa(TargaHeader::bgr24(40, 40), &gradient(40, 40));
    let expected = transcode(&data, data.len()).await.unwrap();

    let mut transcoder = Transcoder::new(ZlibCompressor::default());
    let output = transcoder.output();
    transcoder.on_start().unwrap();

    let consumer = tokio::spawn(async move {
        output
            .map(|chunk| chunk.map(|c| c.to_vec()))
            .collect::<Vec<_>>()
            .await
    });

    for piece in data.chunks(77) {
        transcoder.on_chunk(Bytes::copy_from_slice(piece)).unwrap();
        tokio::task::yield_now().await;
    }
    transcoder.on_finish().await.unwrap();

    let png: Vec<u8> = consumer
        .await
        .unwrap()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
        .concat();
    assert_eq!(png, expected);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_rejects_palette() {
    let mut header = TargaHeader::bgr24(1, 1);
    header.has_palette = true;
    let err = transcode(&targa(header, &[0; 3]), 64).await.unwrap_err();
    assert!(matches!(err, CodecError::Unsupported(msg) if msg.contains("palette")));
}

#[tokio::test]
async fn test_rejects_sixteen_bit_bgr() {
    let mut header = TargaHeader::bgr24(1, 1);
    header.bit_depth = 16;
    let err = transcode(&targa(header, &[0; 2]), 64).await.unwrap_err();
    assert!(matches!(err, CodecError::Unsupported(msg) if msg.contains("24 bit")));
}

#[tokio::test]
async fn test_rejects_compressed_and_gray_types() {
    for ty in [TargaType::BgrCompressed, TargaType::Gray, TargaType::Indexed] {
        let mut header = TargaHeader::bgr24(1, 1);
        header.image_type = ty;
        let result = transcode(&targa(header, &[0; 3]), 64).await;
        assert!(
            matches!(result, Err(CodecError::Unsupported(_))),
            "{:?} must be rejected",
            ty
        );
    }
}

#[tokio::test]
async fn test_rejects_bottom_left_origin() {
    let mut header = TargaHeader::bgr24(1, 1);
    header.starts_top = false;
    let err = transcode(&targa(header, &[0; 3]), 64).await.unwrap_err();
    assert!(err.to_string().contains("top left"));
}

#[tokio::test]
async fn test_rejects_right_origin() {
    let mut header = TargaHeader::bgr24(1, 1);
    header.starts_right = true;
    assert!(transcode(&targa(header, &[0; 3]), 64).await.is_err());
}

#[tokio::test]
async fn test_rejects_illegal_type() {
    let mut data = targa(TargaHeader::bgr24(1, 1), &[0; 3]);
    data[2] = 7;
    let err = transcode(&data, 64).await.unwrap_err();
    assert!(matches!(err, CodecError::IllegalImageType(7)));
}

#[tokio::test]
async fn test_truncated_pixels() {
    let data = targa(TargaHeader::bgr24(4, 4), &gradient(4, 4));
    let err = transcode(&data[..data.len() - 5], 9).await.unwrap_err();
    assert!(matches!(err, CodecError::StreamClosed { missing: 5 }));
}

#[tokio::test]
async fn test_failed_session_keeps_signature_and_rejects_output() {
    let mut header = TargaHeader::bgr24(1, 1);
    header.starts_top = false;

    let mut transcoder = Transcoder::new(ZlibCompressor::default());
    let output = transcoder.output();
    transcoder.on_start().unwrap();
    transcoder
        .on_chunk(Bytes::from(targa(header, &[0; 3])))
        .unwrap();
    assert!(transcoder.on_finish().await.is_err());

    let items: Vec<_> = output.collect().await;
    assert_eq!(items.len(), 2);
    assert_eq!(&items[0].as_ref().unwrap()[..], &PNG_SIGNATURE);
    assert!(matches!(&items[1], Err(CodecError::Rejected(_))));
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_cancel_mid_image() {
    let data = targa(TargaHeader::bgr24(8, 8), &gradient(8, 8));

    let mut transcoder = Transcoder::new(ZlibCompressor::default());
    let mut output = transcoder.output();
    transcoder.on_start().unwrap();
    transcoder
        .on_chunk(Bytes::copy_from_slice(&data[..60]))
        .unwrap();

    // Let the pipeline start pulling input
    let signature = output.next().await.unwrap().unwrap();
    assert_eq!(&signature[..], &PNG_SIGNATURE);

    transcoder.cancel();
    let err = transcoder.on_finish().await.unwrap_err();
    assert!(matches!(err, CodecError::StreamClosed { .. }));
    assert_eq!(transcoder.state(), TranscoderState::Finished);
}

#[tokio::test]
async fn test_force_terminate_wakes_pending_reader() {
    let queue = BridgeQueue::<Bytes>::new();
    let producer = queue.clone();

    let reader = tokio::spawn(async move {
        let mut reader = ChunkReader::new(queue.stream());
        reader.read_u32().await
    });

    tokio::task::yield_now().await;
    assert_eq!(producer.force_terminate(None), Step::End(None));

    let result = reader.await.unwrap();
    assert!(matches!(result, Err(CodecError::StreamClosed { missing: 4 })));
}
