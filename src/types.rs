use std::fmt::{self, Debug, Display};
use std::ops::{Add, AddAssign};
use std::path::PathBuf;

/// A presentation time stamp in units of 100 nanoseconds.
///
/// MPLS files store time stamps as 32-bit values on a 45 kHz clock; the
/// parser rescales them on read via [`from_ticks`], so consumers of this
/// crate never see the raw clock.
///
/// [`from_ticks`]: #method.from_ticks
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub u64);

impl Pts {
    pub const ZERO: Pts = Pts(0);

    /// Rescales a raw 45 kHz tick count to 100 ns units.
    pub fn from_ticks(ticks: u32) -> Pts {
        // 10_000_000 / 45_000 is not an integer; multiply first so nothing
        // is lost before the division truncates.
        Pts(u64::from(ticks) * 10_000_000 / 45_000)
    }

    /// Returns this time stamp in whole milliseconds.
    pub fn millis(self) -> u64 {
        self.0 / 10_000
    }

    /// Returns this time stamp in units of seconds.
    pub fn seconds(self) -> f64 {
        self.0 as f64 / 10_000_000.0
    }

    pub fn saturating_sub(self, rhs: Pts) -> Pts {
        Pts(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Pts {
    type Output = Pts;

    fn add(self, rhs: Pts) -> Pts {
        Pts(self.0 + rhs.0)
    }
}

impl AddAssign for Pts {
    fn add_assign(&mut self, rhs: Pts) {
        self.0 += rhs.0;
    }
}

impl Debug for Pts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pts")
            .field("raw", &self.0)
            .field("secs", &self.seconds())
            .finish()
    }
}

/// A three-letter language code as stored in the stream attributes,
/// usually ISO 639-2 (e.g. `eng`).
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(pub [u8; 3]);

impl LanguageCode {
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Debug for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LanguageCode({})", String::from_utf8_lossy(&self.0))
    }
}

/// The coding format of an elementary stream, from the stream attributes
/// coding tag.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StreamCoding {
    Mpeg1Video,
    Mpeg2Video,
    H264Video,
    H264MvcVideo,
    HevcVideo,
    Vc1Video,
    Mpeg1Audio,
    Mpeg2Audio,
    Mpeg2AacAudio,
    Mpeg4AacAudio,
    LpcmAudio,
    Ac3Audio,
    Ac3PlusAudio,
    Ac3PlusSecondaryAudio,
    TrueHdAudio,
    DtsAudio,
    DtsHdAudio,
    DtsHdSecondaryAudio,
    DtsHdMasterAudio,
    PresentationGraphics,
    InteractiveGraphics,
    Subtitle,
    #[default]
    Unknown,
}

impl StreamCoding {
    pub fn from_tag(tag: u8) -> StreamCoding {
        match tag {
            0x01 => StreamCoding::Mpeg1Video,
            0x02 => StreamCoding::Mpeg2Video,
            0x1B => StreamCoding::H264Video,
            0x20 => StreamCoding::H264MvcVideo,
            0x24 => StreamCoding::HevcVideo,
            0xEA => StreamCoding::Vc1Video,
            0x03 => StreamCoding::Mpeg1Audio,
            0x04 => StreamCoding::Mpeg2Audio,
            0x0F => StreamCoding::Mpeg2AacAudio,
            0x11 => StreamCoding::Mpeg4AacAudio,
            0x80 => StreamCoding::LpcmAudio,
            0x81 => StreamCoding::Ac3Audio,
            0x84 => StreamCoding::Ac3PlusAudio,
            0xA1 => StreamCoding::Ac3PlusSecondaryAudio,
            0x83 => StreamCoding::TrueHdAudio,
            0x82 => StreamCoding::DtsAudio,
            0x85 => StreamCoding::DtsHdAudio,
            0xA2 => StreamCoding::DtsHdSecondaryAudio,
            0x86 => StreamCoding::DtsHdMasterAudio,
            0x90 => StreamCoding::PresentationGraphics,
            0x91 => StreamCoding::InteractiveGraphics,
            0x92 => StreamCoding::Subtitle,
            _ => StreamCoding::Unknown,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VideoFormat {
    #[default]
    Unknown,
    Interlaced480,
    Interlaced576,
    Progressive480,
    Interlaced1080,
    Progressive720,
    Progressive1080,
    Progressive576,
    Progressive2160,
}

impl VideoFormat {
    pub(crate) fn from_nibble(n: u8) -> VideoFormat {
        match n {
            0x1 => VideoFormat::Interlaced480,
            0x2 => VideoFormat::Interlaced576,
            0x3 => VideoFormat::Progressive480,
            0x4 => VideoFormat::Interlaced1080,
            0x5 => VideoFormat::Progressive720,
            0x6 => VideoFormat::Progressive1080,
            0x7 => VideoFormat::Progressive576,
            0x8 => VideoFormat::Progressive2160,
            _ => VideoFormat::Unknown,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FrameRate {
    #[default]
    Unknown,
    F23_976,
    F24,
    F25,
    F29_97,
    F50,
    F59_94,
}

impl FrameRate {
    pub(crate) fn from_nibble(n: u8) -> FrameRate {
        match n {
            0x1 => FrameRate::F23_976,
            0x2 => FrameRate::F24,
            0x3 => FrameRate::F25,
            0x4 => FrameRate::F29_97,
            0x6 => FrameRate::F50,
            0x7 => FrameRate::F59_94,
            _ => FrameRate::Unknown,
        }
    }
}

/// Display aspect ratio of a video stream.
///
/// The `.mpls` stream attributes do not carry this field, so the playlist
/// parser leaves it at `Unknown`; it exists so callers enriching streams
/// from clip information files have somewhere to put it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    #[default]
    Unknown,
    Ratio4x3,
    Ratio16x9,
    Ratio2x21,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    #[default]
    Unknown,
    Mono,
    Stereo,
    Multichannel,
    StereoAndMultichannel,
}

impl ChannelLayout {
    pub(crate) fn from_nibble(n: u8) -> ChannelLayout {
        match n {
            0x1 => ChannelLayout::Mono,
            0x3 => ChannelLayout::Stereo,
            0x6 => ChannelLayout::Multichannel,
            0xC => ChannelLayout::StereoAndMultichannel,
            _ => ChannelLayout::Unknown,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SampleRate {
    #[default]
    Unknown,
    Khz48,
    Khz96,
    Khz192,
    Khz48And192,
    Khz48And96,
}

impl SampleRate {
    pub(crate) fn from_nibble(n: u8) -> SampleRate {
        match n {
            0x1 => SampleRate::Khz48,
            0x4 => SampleRate::Khz96,
            0x5 => SampleRate::Khz192,
            0xC => SampleRate::Khz48And192,
            0xE => SampleRate::Khz48And96,
            _ => SampleRate::Unknown,
        }
    }
}

/// The broad category of a stream, derived from which attributes were
/// actually decoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
    Subtitles,
}

/// One elementary stream multiplexed into a playlist's clips.
///
/// Exactly one of `video_format` and `channel_layout` is set for a fully
/// decoded video or audio stream; graphics and subtitle streams set neither
/// and classify as [`StreamKind::Subtitles`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stream {
    pub pid: u16,
    pub coding: StreamCoding,
    pub language: Option<LanguageCode>,
    pub video_format: VideoFormat,
    pub frame_rate: FrameRate,
    pub aspect_ratio: AspectRatio,
    pub channel_layout: ChannelLayout,
    pub sample_rate: SampleRate,
}

impl Stream {
    pub fn kind(&self) -> StreamKind {
        if self.video_format != VideoFormat::Unknown {
            StreamKind::Video
        } else if self.channel_layout != ChannelLayout::Unknown {
            StreamKind::Audio
        } else {
            StreamKind::Subtitles
        }
    }
}

/// One play item: a reference to a clip file plus its slice of the
/// playlist timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayItem {
    /// Full path of the referenced clip, `{root}/STREAM/{name}.M2TS`.
    pub clip_path: PathBuf,
    pub start_pts: Pts,
    pub end_pts: Pts,
    /// Where this item starts on the playlist timeline; the cumulative
    /// duration of all items before it.
    pub start_time: Pts,
}

/// A fully decoded movie playlist.
#[derive(Debug, Default, Clone)]
pub struct Playlist {
    /// The `.mpls` file this playlist was decoded from.
    pub file_name: String,
    /// Total duration, the item-order sum of every item's PTS span.
    pub duration: Pts,
    pub items: Vec<PlayItem>,
    /// All elementary streams referenced by this playlist, unique by PID.
    pub streams: Vec<Stream>,
}

impl Playlist {
    /// File-name-agnostic equality, used to spot the same playlist stored
    /// under two different `.mpls` names on the same disc.
    pub fn structurally_eq(&self, other: &Playlist) -> bool {
        self.duration == other.duration
            && self.items == other.items
            && self.streams == other.streams
    }
}
