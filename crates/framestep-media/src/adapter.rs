// crates/framestep-media/src/adapter.rs
//
// Demuxer: stateful FFmpeg demux/decode wrapper behind the FrameSource
// trait. One instance per open file; owns the demux context, the video
// decoder, the RGBA scaler, and an independent packet-scan context that
// feeds the frame index without disturbing decode state.
//
// Frames leave this layer in presentation order only — FFmpeg's decoder
// handles B-frame reordering internally, and the EOF flush drains the
// delayed frames it buffers.

use std::path::{Path, PathBuf};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use framestep_core::{MediaError, RawFrame, ScanEntry, StreamInfo};

use crate::source::FrameSource;

pub struct Demuxer {
    path:      PathBuf,
    ictx:      ffmpeg::format::context::Input,
    decoder:   ffmpeg::decoder::video::Video,
    scaler:    SwsContext,
    video_idx: usize,
    tb_num:    i32,
    tb_den:    i32,
    last_pts:  i64,
    /// EOF was signalled to the decoder; only buffered frames remain.
    flushed:   bool,
    info:      StreamInfo,
    /// Packet-scan cursor for the frame index. Separate context so index
    /// extension never interleaves with in-flight decode state.
    scan:      Option<ffmpeg::format::context::Input>,
    scan_done: bool,
}

// SAFETY: Demuxer is owned by exactly one worker thread at a time; the raw
// SwsContext pointer inside the scaler is never shared, only moved with it.
unsafe impl Send for Demuxer {}

impl Demuxer {
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        let ictx = input(path)
            .map_err(|e| MediaError::UnreadableSource(format!("{}: {e}", path.display())))?;

        let video_idx = ictx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| {
                MediaError::UnreadableSource(format!("{}: no video stream", path.display()))
            })?
            .index();

        let (tb_num, tb_den, avg_fps, real_fps, start_raw, declared_raw, stream_dur, codec) = {
            let stream = ictx.stream(video_idx).expect("best() returned this index");
            let tb = stream.time_base();
            (
                tb.numerator(),
                tb.denominator(),
                f64::from(stream.avg_frame_rate()),
                f64::from(stream.rate()),
                stream.start_time(),
                stream.frames(),
                stream.duration(),
                format!("{:?}", stream.parameters().id()).to_lowercase(),
            )
        };

        let fps = if avg_fps > 0.0 {
            avg_fps
        } else if real_fps > 0.0 {
            real_fps
        } else {
            25.0
        };
        // avg vs real rate disagreeing is the container telling us frame
        // spacing is uneven — timestamps become the numbering authority.
        let constant_rate = avg_fps > 0.0 && real_fps > 0.0 && (avg_fps - real_fps).abs() < 0.01;

        let tbf = tb_num as f64 / tb_den as f64;
        let start_secs = if start_raw > 0 { start_raw as f64 * tbf } else { 0.0 };

        // Duration fallback chain: container, then stream.
        let mut duration_secs = ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
        if duration_secs <= 0.0 && stream_dur > 0 {
            duration_secs = stream_dur as f64 * tbf;
        }
        if duration_secs <= 0.0 && declared_raw > 0 {
            duration_secs = declared_raw as f64 / fps;
        }

        // Second context for decoder params (avoids borrow conflict with ictx).
        let ictx2 = input(path)
            .map_err(|e| MediaError::UnreadableSource(e.to_string()))?;
        let stream2 = ictx2
            .stream(video_idx)
            .ok_or_else(|| MediaError::UnreadableSource("stream gone on re-open".into()))?;
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())
            .map_err(|e| MediaError::UnreadableSource(e.to_string()))?;
        let decoder = dec_ctx
            .decoder()
            .video()
            .map_err(|e| MediaError::UnreadableSource(e.to_string()))?;

        let (w, h) = (decoder.width(), decoder.height());
        if w == 0 || h == 0 {
            return Err(MediaError::UnreadableSource(format!(
                "{}: zero-sized video stream",
                path.display()
            )));
        }

        let scaler = SwsContext::get(
            decoder.format(), w, h,
            Pixel::RGBA, w, h,
            Flags::BILINEAR,
        )
        .map_err(|e| MediaError::UnreadableSource(format!("scaler: {e}")))?;

        let info = StreamInfo {
            width:           w,
            height:          h,
            fps,
            duration_secs,
            start_secs,
            declared_frames: (declared_raw > 0).then_some(declared_raw as u64),
            codec,
            constant_rate,
        };

        Ok(Self {
            path: path.to_path_buf(),
            ictx,
            decoder,
            scaler,
            video_idx,
            tb_num,
            tb_den,
            last_pts: 0,
            flushed: false,
            info,
            scan: None,
            scan_done: false,
        })
    }

    fn ts_to_pts(&self, t: f64) -> i64 {
        (t * self.tb_den as f64 / self.tb_num as f64) as i64
    }

    fn pts_to_secs(&self, pts: i64) -> f64 {
        pts as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Scale to RGBA and destripe: copy only visible pixels, not stride padding.
    fn convert(&mut self, decoded: &ffmpeg::util::frame::video::Video) -> Result<RawFrame, MediaError> {
        let pts = decoded.pts().unwrap_or(self.last_pts + 1);
        self.last_pts = pts;
        let pts_secs = self.pts_to_secs(pts);

        let mut out = ffmpeg::util::frame::video::Video::empty();
        self.scaler
            .run(decoded, &mut out)
            .map_err(|e| MediaError::CorruptFrame { ts_secs: pts_secs, reason: e.to_string() })?;

        let w = self.info.width as usize;
        let h = self.info.height as usize;
        let stride = out.stride(0);
        let raw    = out.data(0);
        let data: Vec<u8> = (0..h)
            .flat_map(|row| {
                let s = row * stride;
                &raw[s..s + w * 4]
            })
            .copied()
            .collect();

        Ok(RawFrame { data, width: self.info.width, height: self.info.height, pts_secs })
    }
}

impl FrameSource for Demuxer {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    /// Backward range seek: lands on the keyframe AT OR BEFORE the target,
    /// never after — a forward seek mid-GOP would skip every frame between
    /// the target and the next keyframe. Pre-roll frames are discarded by
    /// the cursor's PTS filter.
    fn seek_to_or_before(&mut self, ts_secs: f64) -> Result<(), MediaError> {
        let ts = ts_secs.max(0.0);
        let seek_ts = (ts * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
        if let Err(e) = self.ictx.seek(seek_ts, ..=seek_ts) {
            // avformat_seek_file(max_ts≈0) returns EPERM on some platforms.
            // Re-opening resets the read cursor to the start, which is where
            // a failed near-zero seek wants to be anyway.
            if ts < 0.5 {
                eprintln!("[seek] soft-fail at {ts:.3}s: {e} — re-opening input");
                self.ictx = input(&self.path)
                    .map_err(|e2| MediaError::SeekFailure { ts_secs: ts, reason: e2.to_string() })?;
            } else {
                return Err(MediaError::SeekFailure { ts_secs: ts, reason: e.to_string() });
            }
        }
        self.decoder.flush();
        self.flushed  = false;
        self.last_pts = self.ts_to_pts(ts);
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<RawFrame>, MediaError> {
        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        loop {
            // Drain frames already buffered in the decoder first.
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                let raw = self.convert(&decoded)?;
                return Ok(Some(raw));
            }
            if self.flushed {
                return Ok(None);
            }

            // Feed exactly one video packet, or signal EOF so the decoder
            // releases its reorder-buffered tail frames.
            let near = self.pts_to_secs(self.last_pts);
            let mut fed = false;
            for (stream, packet) in self.ictx.packets().flatten() {
                if stream.index() != self.video_idx {
                    continue;
                }
                if let Err(e) = self.decoder.send_packet(&packet) {
                    return Err(MediaError::CorruptFrame { ts_secs: near, reason: e.to_string() });
                }
                fed = true;
                break;
            }
            if !fed {
                let _ = self.decoder.send_eof();
                self.flushed = true;
            }
        }
    }

    fn scan_next(&mut self) -> Result<Option<ScanEntry>, MediaError> {
        if self.scan_done {
            return Ok(None);
        }
        if self.scan.is_none() {
            self.scan = Some(
                input(&self.path).map_err(|e| MediaError::UnreadableSource(e.to_string()))?,
            );
        }
        let tbf = self.tb_num as f64 / self.tb_den as f64;
        let scan = self.scan.as_mut().expect("just opened");
        for (stream, packet) in scan.packets().flatten() {
            if stream.index() != self.video_idx {
                continue;
            }
            // Prefer pts; fall back to dts for the odd packet missing one.
            let Some(pts) = packet.pts().or_else(|| packet.dts()) else {
                continue;
            };
            return Ok(Some(ScanEntry {
                pts_secs: pts as f64 * tbf,
                is_key:   packet.is_key(),
            }));
        }
        self.scan_done = true;
        self.scan = None;
        Ok(None)
    }
}
