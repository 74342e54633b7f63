use std::io::{BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use image::RgbImage;
use log::{debug, warn};

use crate::protocol::{
    decode_jpeg, parse_chunk, parse_header, Handshake, HEADER_LEN, MAX_CHUNK_BYTES,
    MAX_JPEG_BYTES,
};
use crate::CamServerError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// How the client splits the byte stream into frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameSync {
    /// Read the header, then exactly `length` payload bytes. On a bad magic
    /// or an implausible length, slide one byte and look again.
    #[default]
    Framed,
    /// Treat each `read` of up to [`MAX_CHUNK_BYTES`] as one frame and drop
    /// chunks that do not start with the magic.
    Chunked,
}

/// Blocking client for one camera-server stream.
pub struct CameraServerClient<S = TcpStream> {
    reader: BufReader<S>,
    sync: FrameSync,
    chunk: Vec<u8>,
    frames: u64,
    discarded: u64,
}

impl CameraServerClient<TcpStream> {
    /// Connect and send the handshake.
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        handshake: Handshake,
        sync: FrameSync,
    ) -> Result<Self, CamServerError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        if let Ok(peer) = stream.peer_addr() {
            debug!("connected to camera server at {peer}");
        }
        Self::from_stream(stream, handshake, sync)
    }
}

impl<S: Read> CameraServerClient<S> {
    /// Send the handshake over an already open stream.
    pub fn from_stream(
        mut stream: S,
        handshake: Handshake,
        sync: FrameSync,
    ) -> Result<Self, CamServerError>
    where
        S: Write,
    {
        stream.write_all(&handshake.encode())?;
        stream.flush()?;
        debug!(
            "requested {} fps at {} ({:?} framing)",
            handshake.fps, handshake.size, sync
        );
        Ok(Self {
            reader: BufReader::with_capacity(64 * 1024, stream),
            sync,
            chunk: Vec::new(),
            frames: 0,
            discarded: 0,
        })
    }

    pub fn sync(&self) -> FrameSync {
        self.sync
    }

    /// Frames returned so far.
    pub fn frames_received(&self) -> u64 {
        self.frames
    }

    /// Chunks dropped (chunked mode) or bytes skipped (framed mode) while
    /// looking for a frame header.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }

    /// Block until the next frame arrives and decode it.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn next_frame(&mut self) -> Result<RgbImage, CamServerError> {
        let frame = match self.sync {
            FrameSync::Framed => {
                let payload = self.next_payload()?;
                decode_jpeg(&payload)?
            }
            FrameSync::Chunked => {
                let len = self.next_chunk()?;
                decode_jpeg(&self.chunk[HEADER_LEN..len])?
            }
        };
        self.frames += 1;
        Ok(frame)
    }

    /// JPEG bytes of the next well-formed frame.
    pub fn next_payload(&mut self) -> Result<Vec<u8>, CamServerError> {
        let mut header = [0u8; HEADER_LEN];
        self.reader
            .read_exact(&mut header)
            .map_err(CamServerError::from_read)?;

        let mut skipped = 0u64;
        loop {
            match parse_header(&header) {
                Some(len) if len <= MAX_JPEG_BYTES => {
                    if skipped > 0 {
                        warn!("resynchronized after skipping {skipped} bytes");
                    }
                    let mut payload = vec![0u8; len];
                    self.reader
                        .read_exact(&mut payload)
                        .map_err(CamServerError::from_read)?;
                    return Ok(payload);
                }
                Some(len) => debug!("implausible frame length {len}, resynchronizing"),
                None => {}
            }

            header.copy_within(1.., 0);
            let mut byte = [0u8; 1];
            self.reader
                .read_exact(&mut byte)
                .map_err(CamServerError::from_read)?;
            header[HEADER_LEN - 1] = byte[0];
            skipped += 1;
            self.discarded += 1;
        }
    }

    /// Fill `self.chunk` with the next chunk whose magic matches; returns its length.
    fn next_chunk(&mut self) -> Result<usize, CamServerError> {
        self.chunk.resize(MAX_CHUNK_BYTES, 0);
        loop {
            let n = self.reader.read(&mut self.chunk)?;
            if n == 0 {
                return Err(CamServerError::ConnectionClosed);
            }
            if parse_chunk(&self.chunk[..n]).is_some() {
                return Ok(n);
            }
            self.discarded += 1;
            debug!("discarding {n}-byte chunk without frame header");
        }
    }
}
