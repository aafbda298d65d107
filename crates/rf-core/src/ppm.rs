//! Binary `P6` raster I/O.
//!
//! Layout: `P6`, whitespace, decimal width and height, whitespace, `255`,
//! exactly one whitespace byte, then `width * height * 3` bytes of RGB in
//! row-major order. Comment lines and other maxvals are rejected. The writer
//! always emits `P6\n<w> <h>\n255\n` followed by the raw samples.

use core::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::image::{Image, ImageView};
use crate::pixel::Rgb8;

const MAGIC: &[u8; 2] = b"P6";
const MAXVAL: u32 = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    BadMagic,
    /// A header field is missing, not a positive decimal, or overflows.
    BadHeader(&'static str),
    UnsupportedMaxval(u32),
    Truncated {
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "missing P6 magic number"),
            Self::BadHeader(field) => write!(f, "malformed header field: {field}"),
            Self::UnsupportedMaxval(v) => {
                write!(f, "unsupported maxval {v}, only {MAXVAL} is accepted")
            }
            Self::Truncated { expected, actual } => {
                write!(
                    f,
                    "truncated pixel data: expected {expected} bytes, got {actual}"
                )
            }
        }
    }
}

#[derive(Debug)]
pub enum PpmError {
    /// The path could not be opened or created.
    FileAccess { path: PathBuf, source: io::Error },
    Format(FormatError),
    Io(io::Error),
}

impl fmt::Display for PpmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileAccess { path, source } => {
                write!(f, "cannot access {}: {source}", path.display())
            }
            Self::Format(e) => write!(f, "invalid PPM: {e}"),
            Self::Io(e) => write!(f, "PPM I/O error: {e}"),
        }
    }
}

impl std::error::Error for FormatError {}

impl std::error::Error for PpmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileAccess { source, .. } => Some(source),
            Self::Format(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<FormatError> for PpmError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl From<io::Error> for PpmError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub fn read_ppm(path: impl AsRef<Path>) -> Result<Image<Rgb8>, PpmError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PpmError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let img = decode_ppm(BufReader::new(file))?;
    debug!(
        "read {}x{} PPM from {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(img)
}

pub fn decode_ppm<R: Read>(mut reader: R) -> Result<Image<Rgb8>, PpmError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(parse(&bytes)?)
}

pub fn write_ppm(path: impl AsRef<Path>, img: &ImageView<'_, Rgb8>) -> Result<(), PpmError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| PpmError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    encode_ppm(&mut writer, img)?;
    writer.flush()?;
    Ok(())
}

pub fn encode_ppm<W: Write>(mut writer: W, img: &ImageView<'_, Rgb8>) -> Result<(), PpmError> {
    write!(writer, "P6\n{} {}\n{MAXVAL}\n", img.width(), img.height())?;
    let mut line = Vec::with_capacity(img.width() * 3);
    for row in img.rows() {
        line.clear();
        for px in row {
            line.extend_from_slice(&px.channels());
        }
        writer.write_all(&line)?;
    }
    Ok(())
}

fn parse(bytes: &[u8]) -> Result<Image<Rgb8>, FormatError> {
    if bytes.len() < 3 || &bytes[..2] != MAGIC || !bytes[2].is_ascii_whitespace() {
        return Err(FormatError::BadMagic);
    }

    let mut pos = 2;
    let width = parse_dimension(next_token(bytes, &mut pos), "width")?;
    let height = parse_dimension(next_token(bytes, &mut pos), "height")?;
    let maxval = next_token(bytes, &mut pos)
        .and_then(parse_decimal)
        .ok_or(FormatError::BadHeader("maxval"))?;
    if maxval != MAXVAL as usize {
        return Err(FormatError::UnsupportedMaxval(
            u32::try_from(maxval).unwrap_or(u32::MAX),
        ));
    }

    match bytes.get(pos) {
        Some(b) if b.is_ascii_whitespace() => pos += 1,
        _ => return Err(FormatError::BadHeader("separator after maxval")),
    }

    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .ok_or(FormatError::BadHeader("dimensions overflow"))?;
    let payload = &bytes[pos..];
    if payload.len() < expected {
        return Err(FormatError::Truncated {
            expected,
            actual: payload.len(),
        });
    }

    let pixels = payload[..expected]
        .chunks_exact(3)
        .map(|c| Rgb8::new(c[0], c[1], c[2]))
        .collect();
    Image::from_vec(width, height, pixels).map_err(|_| FormatError::BadHeader("dimensions"))
}

fn next_token<'a>(bytes: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    let start = *pos;
    while *pos < bytes.len() && !bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    (*pos > start).then(|| &bytes[start..*pos])
}

fn parse_decimal(token: &[u8]) -> Option<usize> {
    if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
        return None;
    }
    core::str::from_utf8(token).ok()?.parse().ok()
}

fn parse_dimension(token: Option<&[u8]>, field: &'static str) -> Result<usize, FormatError> {
    match token.and_then(parse_decimal) {
        Some(v) if v > 0 => Ok(v),
        _ => Err(FormatError::BadHeader(field)),
    }
}
