use crate::geometry::Fp;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("buffer holds {actual} floats, {width}x{height} needs {expected}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Receives each finished frame: row-major RGB floats, bottom row first.
pub trait DisplaySink {
    fn present(&mut self, rgb: &[Fp], width: usize, height: usize) -> Result<(), SinkError>;
}

/// Clamps to [0, 1], quantizes to 8 bits and flips rows so the top row comes
/// first, as image files expect.
pub fn to_rgb8(rgb: &[Fp], width: usize, height: usize) -> Result<Vec<u8>, SinkError> {
    let expected = width * height * 3;
    if rgb.len() != expected {
        return Err(SinkError::SizeMismatch {
            width,
            height,
            expected,
            actual: rgb.len(),
        });
    }
    let row_len = width * 3;
    let mut result = Vec::with_capacity(expected);
    for row in rgb.chunks_exact(row_len.max(1)).rev() {
        result.extend(row.iter().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
    }
    Ok(result)
}

pub struct PngSink {
    pub path: PathBuf,
}

impl DisplaySink for PngSink {
    fn present(&mut self, rgb: &[Fp], width: usize, height: usize) -> Result<(), SinkError> {
        let bytes = to_rgb8(rgb, width, height)?;
        let img = RgbImage::from_raw(width as u32, height as u32, bytes).ok_or(
            SinkError::SizeMismatch {
                width,
                height,
                expected: width * height * 3,
                actual: rgb.len(),
            },
        )?;
        let format = ImageFormat::from_path(&self.path).unwrap_or(ImageFormat::Png);
        img.save_with_format(&self.path, format)?;
        Ok(())
    }
}

pub struct PpmSink {
    pub path: PathBuf,
}

impl DisplaySink for PpmSink {
    fn present(&mut self, rgb: &[Fp], width: usize, height: usize) -> Result<(), SinkError> {
        let bytes = to_rgb8(rgb, width, height)?;
        let mut out_file = fs::File::create(&self.path)?;
        out_file.write_all(b"P6\n")?;
        out_file.write_all(format!("{} {}\n", width, height).as_bytes())?;
        out_file.write_all(b"255\n")?;
        out_file.write_all(&bytes)?;
        Ok(())
    }
}

/// Keeps the last frame in memory.
#[derive(Default)]
pub struct MemorySink {
    pub frames: usize,
    pub last: Vec<Fp>,
    pub width: usize,
    pub height: usize,
}

impl DisplaySink for MemorySink {
    fn present(&mut self, rgb: &[Fp], width: usize, height: usize) -> Result<(), SinkError> {
        self.frames += 1;
        self.last = rgb.to_vec();
        self.width = width;
        self.height = height;
        Ok(())
    }
}
