//! Concurrent transcoding sessions on tokio.
//!
//! Each session is fed by its own producer task that delivers the Targa
//! image in small chunks, while the main task consumes the PNG output.
//!
//! Run with:
//!     cargo run --example async_tokio

use bytes::Bytes;
use futures_util::StreamExt;
use tgapng::{TargaHeader, TranscodeConfig, Transcoder, ZlibCompressor};

fn targa(width: u16, height: u16, seed: u8) -> Vec<u8> {
    let mut data = TargaHeader::bgr24(width, height).to_bytes().to_vec();
    data.extend(
        (0..usize::from(width) * usize::from(height) * 3)
            .map(|i| (i as u8).wrapping_mul(seed)),
    );
    data
}

async fn run_session(id: usize, data: Vec<u8>) -> Result<(usize, usize, usize), tgapng::CodecError> {
    let config = TranscodeConfig::default().with_compression_level(9);
    let mut transcoder = Transcoder::new(ZlibCompressor::from_config(&config));
    let output = transcoder.output();
    transcoder.on_start()?;

    let consumer = tokio::spawn(async move {
        output
            .fold((0usize, 0usize), |(chunks, bytes), chunk| async move {
                match chunk {
                    Ok(chunk) => (chunks + 1, bytes + chunk.len()),
                    Err(_) => (chunks, bytes),
                }
            })
            .await
    });

    for piece in data.chunks(1500) {
        transcoder.on_chunk(Bytes::copy_from_slice(piece))?;
        tokio::task::yield_now().await;
    }
    transcoder.on_finish().await?;

    let (chunks, bytes) = consumer
        .await
        .map_err(|e| tgapng::CodecError::TaskFailed(e.to_string()))?;
    Ok((id, chunks, bytes))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let images = vec![targa(320, 240, 3), targa(640, 480, 7), targa(100, 1000, 11)];
    println!("Transcoding {} images concurrently...\n", images.len());

    let handles: Vec<_> = images
        .into_iter()
        .enumerate()
        .map(|(id, data)| tokio::spawn(run_session(id, data)))
        .collect();

    for handle in handles {
        let (id, chunks, bytes) = handle.await??;
        println!("Session {}: {} output chunks, {} PNG bytes", id, chunks, bytes);
    }

    Ok(())
}
