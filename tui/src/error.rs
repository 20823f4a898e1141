pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    UtilsError(#[from] gasboard_utils::Error),

    #[error(transparent)]
    CoreError(#[from] gasboard_common::Error),

    #[error("Draw failed: {0}")]
    Draw(std::io::Error),

    #[error("Unknown Theme: {0}")]
    UnknownTheme(String),

    #[error("Mpsc Recv Error: {0}")]
    MpscRecvError(Box<std::sync::mpsc::RecvError>),
}

impl From<std::sync::mpsc::RecvError> for Error {
    fn from(e: std::sync::mpsc::RecvError) -> Self {
        Error::MpscRecvError(Box::new(e))
    }
}
