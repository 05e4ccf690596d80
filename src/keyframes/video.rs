//! Video frame extraction via ffmpeg-next (libavformat + libavcodec).
//!
//! Candidates arrive sorted by timestamp, so one sequential decode pass
//! over the file picks up every target frame without seeking. Each hit
//! is converted to RGB24, downscaled to the configured width and written
//! as a PNG.

use super::{ExtractedKeyframe, KeyframeCandidate};
use crate::error::{ReferatError, Result};
use image::RgbImage;
use std::path::Path;
use tracing::{debug, warn};

/// Microseconds per second, the unit of container-level durations.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Decodes and persists video frames for selected keyframe candidates.
pub struct FrameExtractor {
    max_width: u32,
}

impl FrameExtractor {
    pub fn new(max_width: u32) -> Self {
        Self { max_width }
    }

    /// Extract frames for `candidates` (sorted by timestamp ascending)
    /// into `output_dir` as `{base_name}_{ordinal}.png`.
    ///
    /// Best-effort: any failure to open or decode the video logs a
    /// warning and yields an empty list. Candidates whose timestamp lies
    /// past the end of the video are skipped; ordinals stay contiguous
    /// over the frames that were actually written.
    pub fn extract(
        &self,
        video_path: &Path,
        candidates: &[KeyframeCandidate],
        output_dir: &Path,
        base_name: &str,
    ) -> Vec<ExtractedKeyframe> {
        match self.extract_inner(video_path, candidates, output_dir, base_name) {
            Ok(frames) => frames,
            Err(e) => {
                warn!("Keyframe extraction failed for {}: {}", video_path.display(), e);
                Vec::new()
            }
        }
    }

    fn extract_inner(
        &self,
        video_path: &Path,
        candidates: &[KeyframeCandidate],
        output_dir: &Path,
        base_name: &str,
    ) -> Result<Vec<ExtractedKeyframe>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        ffmpeg_next::init().map_err(|e| ReferatError::Video(e.to_string()))?;

        let mut ictx = ffmpeg_next::format::input(video_path)
            .map_err(|e| ReferatError::Video(format!("{}: {}", video_path.display(), e)))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| ReferatError::Video("no video stream found".to_string()))?;
        let stream_index = stream.index();

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };
        if fps <= 0.0 {
            return Err(ReferatError::Video("invalid frame rate".to_string()));
        }

        // Some containers do not carry a per-stream frame count; fall
        // back to the container duration (in AV_TIME_BASE units).
        let mut total_frames = stream.frames();
        if total_frames <= 0 {
            let duration_seconds = ictx.duration() as f64 / AV_TIME_BASE;
            total_frames = (duration_seconds * fps) as i64;
        }

        let targets = frame_targets(candidates, fps, total_frames);
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
                .map_err(|e| ReferatError::Video(e.to_string()))?;
        let mut decoder = codec_ctx
            .decoder()
            .video()
            .map_err(|e| ReferatError::Video(e.to_string()))?;

        let width = decoder.width();
        let height = decoder.height();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| ReferatError::Video(e.to_string()))?;

        let mut hits: Vec<(usize, RgbImage)> = Vec::with_capacity(targets.len());
        let mut next_target = 0usize;
        let mut frame_index: i64 = 0;
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();

        'decode: for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index {
                continue;
            }
            if decoder.send_packet(&packet).is_err() {
                continue;
            }
            while decoder.receive_frame(&mut decoded).is_ok() {
                self.capture_hits(
                    &mut scaler,
                    &decoded,
                    width,
                    height,
                    &targets,
                    &mut next_target,
                    &mut frame_index,
                    &mut hits,
                );
                if next_target >= targets.len() {
                    break 'decode;
                }
            }
        }

        // Flush frames still buffered in the decoder; targets near the
        // video tail surface only here.
        if next_target < targets.len() {
            let _ = decoder.send_eof();
            while next_target < targets.len() && decoder.receive_frame(&mut decoded).is_ok() {
                self.capture_hits(
                    &mut scaler,
                    &decoded,
                    width,
                    height,
                    &targets,
                    &mut next_target,
                    &mut frame_index,
                    &mut hits,
                );
            }
        }

        Ok(persist_frames(hits, candidates, output_dir, base_name))
    }

    /// Match the current decoded frame against the pending targets and
    /// convert it once per target it satisfies.
    #[allow(clippy::too_many_arguments)]
    fn capture_hits(
        &self,
        scaler: &mut ffmpeg_next::software::scaling::Context,
        decoded: &ffmpeg_next::util::frame::video::Video,
        width: u32,
        height: u32,
        targets: &[(usize, i64)],
        next_target: &mut usize,
        frame_index: &mut i64,
        hits: &mut Vec<(usize, RgbImage)>,
    ) {
        while *next_target < targets.len() && targets[*next_target].1 <= *frame_index {
            let (candidate_index, _) = targets[*next_target];
            match self.convert_frame(scaler, decoded, width, height) {
                Ok(image) => hits.push((candidate_index, image)),
                Err(e) => warn!("Failed to convert frame {}: {}", frame_index, e),
            }
            *next_target += 1;
        }
        *frame_index += 1;
    }

    /// Convert a decoded frame to a packed RGB image, downscaled to the
    /// configured width.
    fn convert_frame(
        &self,
        scaler: &mut ffmpeg_next::software::scaling::Context,
        decoded: &ffmpeg_next::util::frame::video::Video,
        width: u32,
        height: u32,
    ) -> Result<RgbImage> {
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler
            .run(decoded, &mut rgb_frame)
            .map_err(|e| ReferatError::Video(e.to_string()))?;

        let pixels = strip_stride(&rgb_frame, width, height);
        let image = RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| ReferatError::Video("frame buffer size mismatch".to_string()))?;

        if width > self.max_width {
            let scaled_height =
                (height as f64 * self.max_width as f64 / width as f64).round() as u32;
            Ok(image::imageops::resize(
                &image,
                self.max_width,
                scaled_height.max(1),
                image::imageops::FilterType::Lanczos3,
            ))
        } else {
            Ok(image)
        }
    }
}

/// Map candidates (sorted by timestamp ascending) to decode-order frame
/// targets, dropping those past the end of the video. Each entry keeps
/// its candidate index.
fn frame_targets(
    candidates: &[KeyframeCandidate],
    fps: f64,
    total_frames: i64,
) -> Vec<(usize, i64)> {
    let duration_seconds = total_frames as f64 / fps;
    candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            if c.timestamp_seconds >= duration_seconds && duration_seconds > 0.0 {
                debug!(
                    "Candidate at {:.1}s is past video end ({:.1}s), skipping",
                    c.timestamp_seconds, duration_seconds
                );
                return None;
            }
            let frame_index = (c.timestamp_seconds * fps) as i64;
            if frame_index >= total_frames && total_frames > 0 {
                return None;
            }
            Some((i, frame_index))
        })
        .collect()
}

/// Write captured frames as `{base_name}_{ordinal}.png`.
///
/// Ordinals are 1-based and contiguous over the frames actually written:
/// a candidate dropped earlier or a failed save never leaves a gap in
/// the numbering.
fn persist_frames(
    hits: Vec<(usize, RgbImage)>,
    candidates: &[KeyframeCandidate],
    output_dir: &Path,
    base_name: &str,
) -> Vec<ExtractedKeyframe> {
    let mut extracted = Vec::with_capacity(hits.len());

    for (candidate_index, image) in hits {
        let candidate = &candidates[candidate_index];
        let filename = format!("{}_{}.png", base_name, extracted.len() + 1);
        let path = output_dir.join(&filename);

        match image.save(&path) {
            Ok(()) => {
                debug!(
                    "Extracted keyframe at {:.1}s -> {}",
                    candidate.timestamp_seconds,
                    path.display()
                );
                extracted.push(ExtractedKeyframe {
                    timestamp_seconds: candidate.timestamp_seconds,
                    timestamp_formatted: candidate.timestamp_formatted.clone(),
                    image_path: path.to_string_lossy().into_owned(),
                    context_text: candidate.context_text.clone(),
                    relevance_score: candidate.relevance_score,
                });
            }
            Err(e) => {
                warn!(
                    "Failed to persist keyframe at {:.1}s: {}",
                    candidate.timestamp_seconds, e
                );
            }
        }
    }

    extracted
}

/// Copy pixel rows out of an ffmpeg frame, stripping per-row stride
/// padding into a tightly packed RGB buffer.
fn strip_stride(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(ts: f64) -> KeyframeCandidate {
        KeyframeCandidate {
            timestamp_seconds: ts,
            timestamp_formatted: crate::transcript::format_timecode(ts),
            relevance_score: 0.5,
            context_text: String::new(),
            segment_index: 0,
            delay_seconds: 0.0,
        }
    }

    #[test]
    fn test_missing_video_returns_empty() {
        let extractor = FrameExtractor::new(1200);
        let dir = tempfile::tempdir().unwrap();
        let frames = extractor.extract(
            Path::new("/nonexistent/video.mp4"),
            &[candidate(10.0)],
            dir.path(),
            "meeting_summary",
        );
        assert!(frames.is_empty());
    }

    #[test]
    fn test_no_candidates_returns_empty() {
        let extractor = FrameExtractor::new(1200);
        let dir = tempfile::tempdir().unwrap();
        let frames = extractor.extract(
            Path::new("/nonexistent/video.mp4"),
            &[],
            dir.path(),
            "meeting_summary",
        );
        assert!(frames.is_empty());
    }

    #[test]
    fn test_frame_targets_drop_past_video_end() {
        // 10 fps, 100 frames: the video is 10 s long
        let candidates = vec![candidate(2.0), candidate(9.9), candidate(10.0), candidate(15.0)];
        let targets = frame_targets(&candidates, 10.0, 100);
        assert_eq!(targets, vec![(0, 20), (1, 99)]);
    }

    #[test]
    fn test_ordinals_contiguous_when_candidates_were_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![candidate(10.0), candidate(20.0), candidate(30.0)];
        // The middle candidate never produced a hit
        let hits = vec![(0, RgbImage::new(4, 4)), (2, RgbImage::new(4, 4))];

        let extracted = persist_frames(hits, &candidates, dir.path(), "demo");

        assert_eq!(extracted.len(), 2);
        assert!(extracted[0].image_path.ends_with("demo_1.png"));
        assert!(extracted[1].image_path.ends_with("demo_2.png"));
        assert_eq!(extracted[0].timestamp_seconds, 10.0);
        assert_eq!(extracted[1].timestamp_seconds, 30.0);
        assert!(dir.path().join("demo_1.png").exists());
        assert!(dir.path().join("demo_2.png").exists());
        assert!(!dir.path().join("demo_3.png").exists());
    }

    #[test]
    fn test_ordinals_contiguous_when_save_fails() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![candidate(10.0), candidate(20.0), candidate(30.0)];
        // A zero-sized image cannot be encoded as PNG
        let hits = vec![
            (0, RgbImage::new(4, 4)),
            (1, RgbImage::new(0, 0)),
            (2, RgbImage::new(4, 4)),
        ];

        let extracted = persist_frames(hits, &candidates, dir.path(), "demo");

        assert_eq!(extracted.len(), 2);
        assert!(extracted[0].image_path.ends_with("demo_1.png"));
        assert!(extracted[1].image_path.ends_with("demo_2.png"));
        assert_eq!(extracted[1].timestamp_seconds, 30.0);
    }
}
