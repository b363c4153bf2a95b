//! Transcodes a Targa file to PNG through the `futures-io` adapter.
//!
//! Run with:
//!     cargo run --example async_file --features async-io -- input.tga output.png
//!
//! Without arguments a small gradient image is written to the temp
//! directory and transcoded.

use std::path::PathBuf;

use tgapng::{TargaHeader, TranscodeConfig, transcode_async};
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (input, output): (PathBuf, PathBuf) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (input.into(), output.into()),
        _ => {
            let dir = std::env::temp_dir();
            let input = dir.join("tgapng-demo.tga");
            tokio::fs::write(&input, gradient(256, 128)).await?;
            (input, dir.join("tgapng-demo.png"))
        }
    };

    let file = tokio::fs::File::open(&input).await?;
    let config = TranscodeConfig::default().with_read_chunk_size(4096);
    let png = transcode_async(file.compat(), config).await?;

    tokio::fs::write(&output, &png).await?;
    println!(
        "{} -> {} ({} bytes)",
        input.display(),
        output.display(),
        png.len()
    );
    Ok(())
}

fn gradient(width: u16, height: u16) -> Vec<u8> {
    let mut data = TargaHeader::bgr24(width, height).to_bytes().to_vec();
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128]);
        }
    }
    data
}
