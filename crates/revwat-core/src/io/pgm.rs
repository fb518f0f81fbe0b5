//! A minimal, dependency-free reader/writer for binary grayscale PGM (P5)
//! rasters: ASCII header (`P5\n<width> <height>\n<maxval>\n`) followed by
//! raw samples, one byte per sample when `maxval < 256` and two
//! big-endian bytes per sample otherwise — this is the real PGM wire
//! format, not a custom variant, so files round-trip through ImageMagick,
//! netpbm, etc.

use super::{PixelSink, PixelSource};
use crate::image::{BitDepth, Image};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

/// Reads a PGM file from a fixed path.
pub struct PgmReader {
    path: PathBuf,
}

impl PgmReader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PixelSource for PgmReader {
    fn read(&mut self) -> io::Result<Image> {
        let file = File::open(&self.path)?;
        read_pgm(BufReader::new(file))
    }
}

/// Writes a PGM file to a fixed path.
pub struct PgmWriter {
    path: PathBuf,
}

impl PgmWriter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PixelSink for PgmWriter {
    fn write(&mut self, image: &Image) -> io::Result<()> {
        let file = File::create(&self.path)?;
        write_pgm(BufWriter::new(file), image)
    }
}

/// Reads a PGM raster from any buffered reader.
pub fn read_pgm<R: BufRead>(mut reader: R) -> io::Result<Image> {
    let magic = read_token(&mut reader)?;
    if magic != "P5" {
        return Err(io::Error::new(io::ErrorKind::InvalidData, format!("unsupported PGM magic {magic:?}")));
    }
    let width: usize = read_token(&mut reader)?
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid PGM width"))?;
    let height: usize = read_token(&mut reader)?
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid PGM height"))?;
    let maxval: u32 = read_token(&mut reader)?
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid PGM maxval"))?;

    let bit_depth = if maxval < 256 { BitDepth::Eight } else { BitDepth::Sixteen };
    let bytes_per_pixel = bit_depth.bytes_per_pixel();

    let mut raw = vec![0u8; width * height * bytes_per_pixel];
    reader.read_exact(&mut raw)?;

    let pixels = match bytes_per_pixel {
        1 => raw.iter().map(|&b| u32::from(b)).collect(),
        2 => raw.chunks_exact(2).map(|chunk| u32::from(u16::from_be_bytes([chunk[0], chunk[1]]))).collect(),
        _ => unreachable!(),
    };

    Image::new(width, height, bit_depth, pixels)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

/// Writes a PGM raster to any writer.
pub fn write_pgm<W: Write>(mut writer: W, image: &Image) -> io::Result<()> {
    writeln!(writer, "P5")?;
    writeln!(writer, "{} {}", image.width(), image.height())?;
    writeln!(writer, "{}", image.bit_depth().max_value())?;

    match image.bit_depth().bytes_per_pixel() {
        1 => {
            let bytes: Vec<u8> = image.pixels().iter().map(|&p| p as u8).collect();
            writer.write_all(&bytes)?;
        }
        2 => {
            for &p in image.pixels() {
                writer.write_all(&(p as u16).to_be_bytes())?;
            }
        }
        _ => unreachable!(),
    }
    Ok(())
}

/// Reads a single whitespace-delimited ASCII token from the PGM header,
/// skipping `#`-prefixed comment lines as the format allows.
fn read_token<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut token = String::new();
    loop {
        let mut byte = [0u8; 1];
        let n = reader.read(&mut byte)?;
        if n == 0 {
            break;
        }
        let c = byte[0] as char;
        if c == '#' {
            let mut discard = String::new();
            reader.read_line(&mut discard)?;
            continue;
        }
        if c.is_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(c);
    }
    if token.is_empty() {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected end of PGM header"));
    }
    Ok(token)
}
