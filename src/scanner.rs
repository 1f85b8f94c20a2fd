use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{BdmvError, Result};
use crate::parser::parse_playlist;
use crate::types::Playlist;

/// Every entry a BDMV root directory must contain to be scanned at all.
const REQUIRED_PATHS: [&str; 4] = ["index.bdmv", "CLIPINF", "PLAYLIST", "STREAM"];

/// Options controlling [`Disc::scan`] and [`parse_playlist`].
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Fail a playlist when a referenced `STREAM/{name}.M2TS` file does
    /// not exist. On by default.
    pub check_clip_files: bool,
    /// Drop playlists that are structurally identical (same duration,
    /// items and streams) to one already accepted. On by default.
    pub skip_duplicate_playlists: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            check_clip_files: true,
            skip_duplicate_playlists: true,
        }
    }
}

/// The decoded playlists of one BDMV directory.
#[derive(Debug, Default, Clone)]
pub struct Disc {
    /// All successfully decoded playlists, sorted by descending duration.
    pub playlists: Vec<Playlist>,
}

impl Disc {
    /// Scans a BDMV root directory and decodes every `.mpls` playlist
    /// under `PLAYLIST/`.
    ///
    /// A playlist file that fails to decode is logged and skipped; the
    /// scan as a whole fails only when the directory layout is not a BDMV
    /// structure or no playlist decoded at all.
    ///
    /// # Examples
    /// ```no_run
    /// use bdmv::{Disc, ScanOptions};
    ///
    /// # fn main() -> Result<(), bdmv::BdmvError> {
    /// let disc = Disc::scan("/mnt/movie/BDMV", &ScanOptions::default())?;
    /// let main_feature = &disc.playlists[0];
    /// println!("{}: {:.1} s", main_feature.file_name, main_feature.duration.seconds());
    /// # Ok(())
    /// # }
    /// ```
    pub fn scan(root: impl AsRef<Path>, options: &ScanOptions) -> Result<Disc> {
        let root = root.as_ref();

        for required in REQUIRED_PATHS {
            let path = root.join(required);
            if !path.exists() {
                return Err(BdmvError::MissingPath(path));
            }
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(root.join("PLAYLIST"))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("mpls"))
            })
            .collect();
        candidates.sort();

        let mut playlists: Vec<Playlist> = Vec::new();
        for path in candidates {
            // the file handle lives for exactly one playlist decode
            let playlist = File::open(&path)
                .map_err(BdmvError::from)
                .and_then(|file| parse_playlist(file, &path, root, options));

            match playlist {
                Ok(playlist) => {
                    if options.skip_duplicate_playlists
                        && playlists.iter().any(|p| p.structurally_eq(&playlist))
                    {
                        debug!(path = %path.display(), "skipping structurally identical playlist");
                        continue;
                    }
                    debug!(
                        path = %path.display(),
                        items = playlist.items.len(),
                        streams = playlist.streams.len(),
                        "decoded playlist"
                    );
                    playlists.push(playlist);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to decode playlist");
                }
            }
        }

        if playlists.is_empty() {
            return Err(BdmvError::NoValidPlaylists);
        }

        playlists.sort_by(|a, b| b.duration.cmp(&a.duration));
        Ok(Disc { playlists })
    }
}
