//! Wire format of the WPILib CameraServer.
//!
//! The client opens a TCP connection on [`CAMERA_SERVER_PORT`] and sends a
//! 12-byte [`Handshake`]. The server then streams frames, each one being
//! [`FRAME_MAGIC`], a big-endian `u32` payload length and the JPEG bytes.

use std::fmt;
use std::str::FromStr;

use image::{ImageFormat, RgbImage};

use crate::CamServerError;

pub const CAMERA_SERVER_PORT: u16 = 1180;

/// Leading bytes of every frame.
pub const FRAME_MAGIC: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Magic plus payload length.
pub const HEADER_LEN: usize = 8;

/// Compression field of the handshake; the server accepts nothing else.
pub const NO_COMPRESSION: u32 = u32::MAX;

/// Largest JPEG payload the server sends (600×480×3).
pub const MAX_JPEG_BYTES: usize = 864_000;

pub const MAX_CHUNK_BYTES: usize = MAX_JPEG_BYTES + HEADER_LEN;

/// Frame sizes the server can be asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageSize {
    Size640x480,
    #[default]
    Size320x240,
    Size160x120,
}

impl ImageSize {
    /// Value sent on the wire.
    pub fn code(self) -> u32 {
        match self {
            ImageSize::Size640x480 => 0,
            ImageSize::Size320x240 => 1,
            ImageSize::Size160x120 => 2,
        }
    }

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ImageSize::Size640x480 => (640, 480),
            ImageSize::Size320x240 => (320, 240),
            ImageSize::Size160x120 => (160, 120),
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{w}x{h}")
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported image size {0:?} (expected 640x480, 320x240 or 160x120)")]
pub struct UnknownImageSize(pub String);

impl FromStr for ImageSize {
    type Err = UnknownImageSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "640x480" => Ok(ImageSize::Size640x480),
            "320x240" => Ok(ImageSize::Size320x240),
            "160x120" => Ok(ImageSize::Size160x120),
            other => Err(UnknownImageSize(other.to_string())),
        }
    }
}

/// Stream request sent once after connecting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handshake {
    pub fps: u32,
    pub size: ImageSize,
}

impl Handshake {
    pub fn new(fps: u32, size: ImageSize) -> Self {
        Self { fps, size }
    }

    /// `fps`, [`NO_COMPRESSION`], size code; all big-endian `u32`.
    pub fn encode(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.fps.to_be_bytes());
        out[4..8].copy_from_slice(&NO_COMPRESSION.to_be_bytes());
        out[8..12].copy_from_slice(&self.size.code().to_be_bytes());
        out
    }
}

/// Split a frame header into its payload length; `None` on a magic mismatch.
pub fn parse_header(header: &[u8; HEADER_LEN]) -> Option<usize> {
    if header[..4] != FRAME_MAGIC {
        return None;
    }
    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    Some(len as usize)
}

/// JPEG bytes of one received chunk.
///
/// Everything after the header is taken as payload, the length field is not
/// checked. `None` when the chunk is too short or the magic does not match.
pub fn parse_chunk(chunk: &[u8]) -> Option<&[u8]> {
    if chunk.len() < HEADER_LEN || chunk[..4] != FRAME_MAGIC {
        return None;
    }
    Some(&chunk[HEADER_LEN..])
}

pub fn decode_jpeg(bytes: &[u8]) -> Result<RgbImage, CamServerError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
    Ok(img.to_rgb8())
}
