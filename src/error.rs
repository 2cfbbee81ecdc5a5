use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Everything that can go wrong between the text field and the saved file.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Please enter a YouTube URL")]
    EmptyUrl,

    #[error("Invalid YouTube URL. Please enter a valid YouTube video URL.")]
    InvalidUrl,

    #[error("yt-dlp not found on PATH and no bundled copy is available")]
    MissingBinary,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read video metadata: {0}")]
    Metadata(String),

    #[error("yt-dlp failed ({status}): {detail}")]
    ToolFailed { status: ExitStatus, detail: String },
}
