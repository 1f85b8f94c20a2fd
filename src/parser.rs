use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{BdmvError, Result};
use crate::reader::BdavReader;
use crate::scanner::ScanOptions;
use crate::types::{
    ChannelLayout, FrameRate, LanguageCode, PlayItem, Playlist, Pts, SampleRate, Stream,
    StreamCoding, VideoFormat,
};

const SIGNATURE: [u8; 4] = *b"MPLS";
const SUPPORTED_VERSIONS: [[u8; 4]; 3] = [*b"0100", *b"0200", *b"0300"];
const CLIP_CODEC_ID: [u8; 4] = *b"M2TS";

fn read_language_code<R: Read + Seek>(r: &mut BdavReader<R>) -> Result<LanguageCode> {
    let mut code = [0u8; 3];
    r.read_exact(&mut code)?;
    Ok(LanguageCode(code))
}

/// Decodes one elementary-stream record and appends it to `streams`,
/// unless its PID is already known from an earlier play item.
///
/// A record is two length-prefixed sub-records: the stream entry (PID and
/// how to find it) followed by the stream attributes (coding tag and
/// tag-specific fields). Both lengths exclude their own one-byte field.
/// After each sub-record the cursor is repositioned to
/// `start + declared_length` no matter how much of the payload was
/// understood, so a record carrying fields this parser does not know about
/// can never skew the next record.
fn read_stream_entry<R: Read + Seek>(
    r: &mut BdavReader<R>,
    streams: &mut Vec<Stream>,
) -> Result<()> {
    let entry_len = u64::from(r.read_u8()?);
    let entry_start = r.position()?;

    let entry_kind = r.read_u8()?;
    let pid = match entry_kind {
        1 => r.read_u16()?,
        2 | 4 => {
            r.skip(2)?;
            r.read_u16()?
        }
        3 => {
            r.skip(1)?;
            r.read_u16()?
        }
        other => return Err(BdmvError::UnknownStreamEntryKind(other)),
    };

    r.seek(entry_start + entry_len)?;
    let attrs_len = u64::from(r.read_u8()?);
    let attrs_start = r.position()?;

    // Later play items re-declare the streams of earlier ones; the first
    // record for a PID wins and the attributes are skipped, not re-decoded.
    if streams.iter().any(|s| s.pid == pid) {
        return r.seek(attrs_start + attrs_len);
    }

    let mut stream = Stream {
        pid,
        coding: StreamCoding::from_tag(r.read_u8()?),
        ..Stream::default()
    };

    match stream.coding {
        StreamCoding::Mpeg1Video
        | StreamCoding::Mpeg2Video
        | StreamCoding::H264Video
        | StreamCoding::H264MvcVideo
        | StreamCoding::HevcVideo
        | StreamCoding::Vc1Video => {
            let attr = r.read_u8()?;
            stream.video_format = VideoFormat::from_nibble(attr >> 4);
            stream.frame_rate = FrameRate::from_nibble(attr & 0x0F);
        }
        StreamCoding::Mpeg1Audio
        | StreamCoding::Mpeg2Audio
        | StreamCoding::LpcmAudio
        | StreamCoding::Ac3Audio
        | StreamCoding::Ac3PlusAudio
        | StreamCoding::Ac3PlusSecondaryAudio
        | StreamCoding::TrueHdAudio
        | StreamCoding::DtsAudio
        | StreamCoding::DtsHdAudio
        | StreamCoding::DtsHdSecondaryAudio
        | StreamCoding::DtsHdMasterAudio => {
            let attr = r.read_u8()?;
            stream.channel_layout = ChannelLayout::from_nibble(attr >> 4);
            stream.sample_rate = SampleRate::from_nibble(attr & 0x0F);
            stream.language = Some(read_language_code(r)?);
        }
        StreamCoding::PresentationGraphics | StreamCoding::InteractiveGraphics => {
            stream.language = Some(read_language_code(r)?);
        }
        StreamCoding::Subtitle => {
            r.skip(1)?;
            stream.language = Some(read_language_code(r)?);
        }
        // Tags the container knows but whose attributes this parser does
        // not decode (AAC audio, future codings): keep PID and coding only.
        _ => {}
    }

    streams.push(stream);

    r.seek(attrs_start + attrs_len)
}

/// Skips one variable-length extra-attributes block that follows secondary
/// audio and secondary video records: a one-byte length, one reserved byte,
/// the payload, and a pad byte when the payload length is odd.
fn skip_extra_attributes<R: Read + Seek>(r: &mut BdavReader<R>) -> Result<()> {
    let len = u64::from(r.read_u8()?);
    r.skip(1)?;
    if len > 0 {
        r.skip(len)?;
        if len % 2 == 1 {
            r.skip(1)?;
        }
    }
    Ok(())
}

/// Decodes the stream number table (STN) of one play item, merging every
/// record into the playlist-wide `streams` set.
fn read_stream_table<R: Read + Seek>(
    r: &mut BdavReader<R>,
    streams: &mut Vec<Stream>,
) -> Result<()> {
    r.skip(4)?; // table length + reserved

    let num_video = r.read_u8()?;
    let num_audio = r.read_u8()?;
    let num_pg = r.read_u8()?;
    let num_ig = r.read_u8()?;
    let num_secondary_audio = r.read_u8()?;
    let num_secondary_video = r.read_u8()?;
    let num_pip_pg = r.read_u8()?;
    r.skip(5)?;

    if streams.is_empty() {
        streams.reserve(
            usize::from(num_video)
                + usize::from(num_audio)
                + usize::from(num_pg)
                + usize::from(num_ig)
                + usize::from(num_secondary_audio)
                + usize::from(num_secondary_video)
                + usize::from(num_pip_pg),
        );
    }

    for _ in 0..num_video {
        read_stream_entry(r, streams)?;
    }
    for _ in 0..num_audio {
        read_stream_entry(r, streams)?;
    }
    for _ in 0..u16::from(num_pg) + u16::from(num_pip_pg) {
        read_stream_entry(r, streams)?;
    }
    for _ in 0..num_ig {
        read_stream_entry(r, streams)?;
    }
    for _ in 0..num_secondary_audio {
        read_stream_entry(r, streams)?;
        skip_extra_attributes(r)?;
    }
    for _ in 0..num_secondary_video {
        read_stream_entry(r, streams)?;
        // Secondary video carries two blocks: its own references and the
        // associated picture-in-picture graphics references.
        skip_extra_attributes(r)?;
        skip_extra_attributes(r)?;
    }

    Ok(())
}

/// Decodes one `.mpls` playlist file end to end.
///
/// `root` is the BDMV directory the playlist belongs to; referenced clips
/// resolve to `{root}/STREAM/{name}.M2TS`. `mpls_path` is only recorded as
/// the playlist's [`file_name`].
///
/// Any failure (I/O, format violation, missing clip, duplicate clip, zero
/// duration) aborts the whole file; a partially decoded playlist is never
/// returned.
///
/// [`file_name`]: crate::Playlist#structfield.file_name
pub fn parse_playlist<R: Read + Seek>(
    source: R,
    mpls_path: &Path,
    root: &Path,
    options: &ScanOptions,
) -> Result<Playlist> {
    let mut r = BdavReader::new(source);

    let mut signature = [0u8; 4];
    r.read_exact(&mut signature)?;
    if signature != SIGNATURE {
        return Err(BdmvError::BadSignature(signature));
    }

    let mut version = [0u8; 4];
    r.read_exact(&mut version)?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(BdmvError::UnsupportedVersion(version));
    }

    let play_list_start = u64::from(r.read_u32()?);
    r.seek(play_list_start)?;
    r.skip(6)?; // block length + reserved
    let item_count = r.read_u16()?;

    let mut playlist = Playlist {
        file_name: mpls_path.to_string_lossy().into_owned(),
        ..Playlist::default()
    };

    // The first play item sits right after the 10-byte play list block
    // header; each item's length field excludes its own two bytes.
    let mut item_offset = play_list_start + 10;
    for _ in 0..item_count {
        r.seek(item_offset)?;
        let item_len = u64::from(r.read_u16()?);
        item_offset += item_len + 2;

        let mut clip_info = [0u8; 9];
        r.read_exact(&mut clip_info)?;
        let codec_id = [clip_info[5], clip_info[6], clip_info[7], clip_info[8]];
        if codec_id != CLIP_CODEC_ID {
            return Err(BdmvError::BadClipCodec(codec_id));
        }
        let clip_name = std::str::from_utf8(&clip_info[..5])
            .map_err(|_| BdmvError::InvalidClipName)?;
        let clip_path = root.join("STREAM").join(format!("{clip_name}.M2TS"));

        if options.check_clip_files && !clip_path.exists() {
            return Err(BdmvError::MissingClip(clip_path));
        }
        if playlist.items.iter().any(|item| item.clip_path == clip_path) {
            return Err(BdmvError::DuplicateClip(clip_path));
        }

        let mut flags = [0u8; 3];
        r.read_exact(&mut flags)?;
        let multi_angle = (flags[1] >> 4) & 0x1 == 1;

        let start_pts = Pts::from_ticks(r.read_u32()?);
        let end_pts = Pts::from_ticks(r.read_u32()?);

        let start_time = playlist.duration;
        playlist.duration += end_pts.saturating_sub(start_pts);

        r.skip(12)?; // UO mask, random access flag, still mode
        if multi_angle {
            // The main clip counts as an angle too.
            let angle_count = r.read_u8()?.max(1);
            r.skip(1)?;
            r.skip(10 * u64::from(angle_count - 1))?;
        }

        read_stream_table(&mut r, &mut playlist.streams)?;

        playlist.items.push(PlayItem {
            clip_path,
            start_pts,
            end_pts,
            start_time,
        });
    }

    if playlist.duration == Pts::ZERO {
        return Err(BdmvError::ZeroDuration);
    }

    Ok(playlist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StreamKind;
    use std::io::Cursor;

    fn entry_bytes(kind: u8, pid: u16) -> Vec<u8> {
        let mut body = vec![kind];
        match kind {
            1 => body.extend_from_slice(&pid.to_be_bytes()),
            2 | 4 => {
                body.extend_from_slice(&[0, 0]);
                body.extend_from_slice(&pid.to_be_bytes());
            }
            3 => {
                body.push(0);
                body.extend_from_slice(&pid.to_be_bytes());
            }
            _ => {}
        }
        // real discs pad the entry to 9 bytes
        body.resize(9, 0);
        let mut out = vec![body.len() as u8];
        out.extend(body);
        out
    }

    fn record_bytes(kind: u8, pid: u16, attrs: &[u8]) -> Vec<u8> {
        let mut out = entry_bytes(kind, pid);
        out.push(attrs.len() as u8);
        out.extend_from_slice(attrs);
        out
    }

    #[test]
    fn entry_kinds_locate_the_pid() {
        for kind in 1..=4u8 {
            let mut streams = Vec::new();
            let data = record_bytes(kind, 0x1011, &[0x1B, 0x61]);
            let mut r = BdavReader::new(Cursor::new(data));
            read_stream_entry(&mut r, &mut streams).unwrap();
            assert_eq!(streams.len(), 1, "entry kind {kind}");
            assert_eq!(streams[0].pid, 0x1011);
            assert_eq!(streams[0].coding, StreamCoding::H264Video);
            assert_eq!(streams[0].video_format, VideoFormat::Progressive1080);
            assert_eq!(streams[0].frame_rate, FrameRate::F23_976);
        }
    }

    #[test]
    fn unknown_entry_kind_is_an_error() {
        let mut streams = Vec::new();
        let data = record_bytes(5, 0x1011, &[0x1B, 0x61]);
        let mut r = BdavReader::new(Cursor::new(data));
        let err = read_stream_entry(&mut r, &mut streams).unwrap_err();
        assert!(matches!(err, BdmvError::UnknownStreamEntryKind(5)));
    }

    #[test]
    fn audio_record_decodes_layout_rate_and_language() {
        let mut streams = Vec::new();
        let data = record_bytes(1, 0x1100, &[0x81, 0x61, b'e', b'n', b'g']);
        let mut r = BdavReader::new(Cursor::new(data));
        read_stream_entry(&mut r, &mut streams).unwrap();

        let s = &streams[0];
        assert_eq!(s.coding, StreamCoding::Ac3Audio);
        assert_eq!(s.channel_layout, ChannelLayout::Multichannel);
        assert_eq!(s.sample_rate, SampleRate::Khz48);
        assert_eq!(s.language.unwrap().as_str(), Some("eng"));
        assert_eq!(s.kind(), StreamKind::Audio);
    }

    #[test]
    fn subtitle_record_skips_reserved_byte_before_language() {
        let mut streams = Vec::new();
        let data = record_bytes(1, 0x1800, &[0x92, 0x00, b'f', b'r', b'a']);
        let mut r = BdavReader::new(Cursor::new(data));
        read_stream_entry(&mut r, &mut streams).unwrap();

        assert_eq!(streams[0].coding, StreamCoding::Subtitle);
        assert_eq!(streams[0].language.unwrap().as_str(), Some("fra"));
        assert_eq!(streams[0].kind(), StreamKind::Subtitles);
    }

    #[test]
    fn duplicate_pid_keeps_first_record() {
        let mut data = record_bytes(1, 0x1011, &[0x1B, 0x61]);
        // same PID again, this time claiming to be audio
        data.extend(record_bytes(1, 0x1011, &[0x81, 0x31, b'e', b'n', b'g']));
        data.extend(record_bytes(1, 0x1100, &[0x81, 0x31, b'e', b'n', b'g']));

        let mut streams = Vec::new();
        let mut r = BdavReader::new(Cursor::new(data));
        for _ in 0..3 {
            read_stream_entry(&mut r, &mut streams).unwrap();
        }

        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].pid, 0x1011);
        assert_eq!(streams[0].coding, StreamCoding::H264Video);
        assert_eq!(streams[1].pid, 0x1100);
    }

    #[test]
    fn unhandled_coding_payload_does_not_desync_next_record() {
        // AAC record with junk bytes inside its declared attribute length,
        // followed by a normal audio record.
        let mut data = record_bytes(1, 0x1101, &[0x0F, 0xDE, 0xAD, 0xBE, 0xEF]);
        data.extend(record_bytes(1, 0x1102, &[0x81, 0x31, b'e', b'n', b'g']));

        let mut streams = Vec::new();
        let mut r = BdavReader::new(Cursor::new(data));
        read_stream_entry(&mut r, &mut streams).unwrap();
        read_stream_entry(&mut r, &mut streams).unwrap();

        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].coding, StreamCoding::Mpeg2AacAudio);
        assert_eq!(streams[0].kind(), StreamKind::Subtitles);
        assert_eq!(streams[1].pid, 0x1102);
        assert_eq!(streams[1].channel_layout, ChannelLayout::Stereo);
    }

    #[test]
    fn extra_attributes_block_honors_odd_length_pad() {
        // len 3 (odd) + reserved + payload + pad, then a sentinel byte
        let data = vec![3, 0, 0xAA, 0xBB, 0xCC, 0x00, 0x42];
        let mut r = BdavReader::new(Cursor::new(data));
        skip_extra_attributes(&mut r).unwrap();
        assert_eq!(r.read_u8().unwrap(), 0x42);

        // len 0: only the length byte and the reserved byte are consumed
        let data = vec![0, 0, 0x42];
        let mut r = BdavReader::new(Cursor::new(data));
        skip_extra_attributes(&mut r).unwrap();
        assert_eq!(r.read_u8().unwrap(), 0x42);
    }
}
