//! Client for the WPILib CameraServer JPEG stream.
//!
//! ```no_run
//! use stronghold_camserver::{CameraServerClient, FrameSync, Handshake, ImageSize, CAMERA_SERVER_PORT};
//!
//! let hs = Handshake::new(15, ImageSize::Size320x240);
//! let mut client =
//!     CameraServerClient::connect(("10.0.0.2", CAMERA_SERVER_PORT), hs, FrameSync::Framed)?;
//! let frame = client.next_frame()?;
//! println!("{}x{}", frame.width(), frame.height());
//! # Ok::<(), stronghold_camserver::CamServerError>(())
//! ```

mod client;
mod error;
mod protocol;

pub use client::{CameraServerClient, FrameSync};
pub use error::CamServerError;
pub use protocol::{
    decode_jpeg, parse_chunk, parse_header, Handshake, ImageSize, UnknownImageSize,
    CAMERA_SERVER_PORT, FRAME_MAGIC, HEADER_LEN, MAX_CHUNK_BYTES, MAX_JPEG_BYTES, NO_COMPRESSION,
};
