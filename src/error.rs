use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for BDMV scanning and playlist parsing.
pub type Result<T> = std::result::Result<T, BdmvError>;

/// The error type for BDMV scanning and playlist parsing.
///
/// Any error raised while decoding a playlist file aborts that one file;
/// there is no partial decode. [`Disc::scan`] reports per-file failures
/// through `tracing` and only fails as a whole when no playlist decoded.
///
/// [`Disc::scan`]: crate::Disc::scan
#[derive(Debug, Error)]
pub enum BdmvError {
    /// An I/O error occurred, including short reads on truncated files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with the `MPLS` signature.
    #[error("not an MPLS file (signature {0:02x?})")]
    BadSignature([u8; 4]),

    /// The MPLS version string is not one of `0100`, `0200`, `0300`.
    #[error("unsupported MPLS version {:?}", String::from_utf8_lossy(.0))]
    UnsupportedVersion([u8; 4]),

    /// A stream entry carries a PID-shape tag outside the known set (1-4).
    #[error("unknown stream entry kind {0:#04x}")]
    UnknownStreamEntryKind(u8),

    /// A play item references a clip whose codec identifier is not `M2TS`.
    #[error("play item clip codec {0:02x?} is not M2TS")]
    BadClipCodec([u8; 4]),

    /// A play item's clip name is not ASCII.
    #[error("play item clip name is not valid ASCII")]
    InvalidClipName,

    /// The referenced clip file does not exist on disc.
    #[error("referenced clip {} does not exist", .0.display())]
    MissingClip(PathBuf),

    /// Two play items in the same playlist reference the same clip.
    #[error("clip {} referenced twice by the same playlist", .0.display())]
    DuplicateClip(PathBuf),

    /// The playlist has no items, or its items sum to zero duration.
    #[error("playlist has zero total duration")]
    ZeroDuration,

    /// A required entry of the BDMV directory layout is missing.
    #[error("required path {} is missing", .0.display())]
    MissingPath(PathBuf),

    /// No playlist file under `PLAYLIST/` decoded successfully.
    #[error("no valid playlist found")]
    NoValidPlaylists,
}
