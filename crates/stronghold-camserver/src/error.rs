/// Errors returned by the camera-server client.
#[derive(thiserror::Error, Debug)]
pub enum CamServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("camera server closed the connection")]
    ConnectionClosed,
    #[error("failed to decode JPEG frame: {0}")]
    Decode(#[from] image::ImageError),
}

impl CamServerError {
    /// Maps a short read to [`CamServerError::ConnectionClosed`].
    pub(crate) fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            CamServerError::ConnectionClosed
        } else {
            CamServerError::Io(err)
        }
    }
}
