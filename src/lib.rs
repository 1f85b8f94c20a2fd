//! A Blu-ray disc structure (BDMV) scanner and movie playlist (MPLS) parser.
//!
//! The entry point into this crate is [`Disc::scan`], which takes the root
//! of a BDMV directory (containing `index.bdmv`, `CLIPINF`, `PLAYLIST` and
//! `STREAM`), decodes every `.mpls` playlist it defines and returns them
//! sorted by descending duration: each with its total duration, its ordered
//! clip references, and the set of elementary streams multiplexed into
//! those clips. No audio/video payload is ever demuxed; a referenced
//! `.M2TS` clip is at most checked for existence.
//!
//! A single playlist file can also be parsed directly with
//! [`parse_playlist`], which accepts any `Read + Seek` source.
//!
//! The MPLS file format is not officially documented; this parser follows
//! the excellent third-party file specs in the [lw/BluRay] repository and
//! the [bdinfo/mpls] Wikibooks page. Refer to those for more in-depth
//! information.
//!
//! [lw/BluRay]: https://github.com/lw/BluRay/wiki/MPLS
//! [bdinfo/mpls]: https://en.wikibooks.org/wiki/User:Bdinfo/mpls
//!
//! # Examples
//! ```no_run
//! use bdmv::{Disc, ScanOptions};
//!
//! # fn main() -> Result<(), bdmv::BdmvError> {
//! let disc = Disc::scan("/mnt/movie/BDMV", &ScanOptions::default())?;
//!
//! for playlist in &disc.playlists {
//!     println!("{} ({} ms)", playlist.file_name, playlist.duration.millis());
//!     for item in &playlist.items {
//!         println!("  {}", item.clip_path.display());
//!     }
//!     for stream in &playlist.streams {
//!         println!("  PID {:#06x}: {:?} ({:?})", stream.pid, stream.coding, stream.kind());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod parser;
mod reader;
mod scanner;
pub mod types;

pub use error::{BdmvError, Result};
pub use parser::parse_playlist;
pub use scanner::{Disc, ScanOptions};
pub use types::*;
