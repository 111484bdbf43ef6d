use std::{
    io::{BufReader, Read},
    path::{Path, PathBuf},
    process::{Child, ChildStdout, Command, Stdio},
};

use crate::{
    error::{EmosaicError, EmosaicResult},
    frame::FrameRgba,
};

/// Native properties of a video stream, known once decoding has begun.
#[derive(Clone, Copy, Debug)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
    /// Stream frame count, when the container reports one.
    pub nb_frames: Option<u64>,
}

impl VideoMetadata {
    pub fn fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    /// Total frames in the stream, derived from duration and frame rate,
    /// falling back to the reported frame count for duration-less
    /// containers. `None` when the source reports neither.
    pub fn total_frames(&self) -> Option<u64> {
        if self.duration_sec > 0.0 && self.fps() > 0.0 {
            return Some((self.duration_sec * self.fps()).ceil().max(1.0) as u64);
        }
        self.nb_frames.filter(|&n| n > 0)
    }
}

/// The video playback collaborator. The pipeline only ever asks it to start
/// (muted), to report its decoded dimensions, and for the frame to show now.
pub trait VideoSource {
    /// Begin muted playback. A start failure is fatal for the session; the
    /// animation loop never enters its running state.
    fn start(&mut self) -> EmosaicResult<()>;

    /// Decoded dimensions and timing, once known. `None` while the stream
    /// has not produced its metadata yet.
    fn poll_metadata(&mut self) -> Option<VideoMetadata>;

    /// The frame to display for the current cycle. Past the end of the
    /// stream, implementations keep returning the last decoded frame (the
    /// playback freezes; the pipeline itself never observes end-of-stream).
    fn current_frame(&mut self) -> EmosaicResult<FrameRgba>;
}

/// Probe a video file with `ffprobe`, yielding the stream metadata the
/// animation loop waits for before sizing its surface.
pub fn probe_video(source_path: &Path) -> EmosaicResult<VideoMetadata> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| EmosaicError::video(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(EmosaicError::video(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| EmosaicError::video(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| EmosaicError::video("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| EmosaicError::video("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| EmosaicError::video("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| EmosaicError::video("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    // "N/A" and other non-numeric placeholders fall through to None.
    let nb_frames = video_stream
        .nb_frames
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok());

    Ok(VideoMetadata {
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
        nb_frames,
    })
}

/// Streaming decoder backed by the system `ffmpeg` binary: one child process
/// writing raw RGBA frames to a pipe, consumed one frame per cycle.
///
/// Uses the system binary rather than linked FFmpeg to avoid native dev
/// header/lib requirements.
pub struct FfmpegVideoSource {
    source_path: PathBuf,
    metadata: Option<VideoMetadata>,
    child: Option<Child>,
    reader: Option<BufReader<ChildStdout>>,
    last_frame: Option<FrameRgba>,
}

impl FfmpegVideoSource {
    pub fn open(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            metadata: None,
            child: None,
            reader: None,
            last_frame: None,
        }
    }

    fn reap_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl VideoSource for FfmpegVideoSource {
    fn start(&mut self) -> EmosaicResult<()> {
        if self.metadata.is_some() {
            return Err(EmosaicError::validation("playback already started"));
        }

        let metadata = probe_video(&self.source_path)?;

        let mut child = Command::new("ffmpeg")
            .args(["-loglevel", "error", "-i"])
            .arg(&self.source_path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "-an", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                EmosaicError::video(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EmosaicError::video("failed to open ffmpeg stdout (unexpected)"))?;

        tracing::debug!(
            source = %self.source_path.display(),
            width = metadata.width,
            height = metadata.height,
            "video playback started"
        );

        self.reader = Some(BufReader::new(stdout));
        self.child = Some(child);
        self.metadata = Some(metadata);
        Ok(())
    }

    fn poll_metadata(&mut self) -> Option<VideoMetadata> {
        self.metadata
    }

    fn current_frame(&mut self) -> EmosaicResult<FrameRgba> {
        let meta = self
            .metadata
            .ok_or_else(|| EmosaicError::validation("current_frame before playback started"))?;
        let frame_len = (meta.width as usize) * (meta.height as usize) * 4;

        if let Some(reader) = self.reader.as_mut() {
            match read_frame_bytes(reader, frame_len)? {
                Some(bytes) => {
                    let frame = FrameRgba::new(meta.width, meta.height, bytes)?;
                    self.last_frame = Some(frame.clone());
                    return Ok(frame);
                }
                None => {
                    // End of stream: freeze on the last decoded frame.
                    self.reader = None;
                    self.reap_child();
                }
            }
        }

        self.last_frame
            .clone()
            .ok_or_else(|| EmosaicError::video("video stream produced no frames"))
    }
}

impl Drop for FfmpegVideoSource {
    fn drop(&mut self) {
        self.reap_child();
    }
}

/// Read exactly one frame's worth of bytes. `Ok(None)` on a clean end of
/// stream; a partial trailing frame is an error.
fn read_frame_bytes(reader: &mut impl Read, frame_len: usize) -> EmosaicResult<Option<Vec<u8>>> {
    let mut buf = vec![0u8; frame_len];
    let mut filled = 0;
    while filled < frame_len {
        let n = reader
            .read(&mut buf[filled..])
            .map_err(|e| EmosaicError::video(format!("failed to read decoded frame: {e}")))?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(EmosaicError::video(
                "truncated frame at end of video stream",
            ));
        }
        filled += n;
    }
    Ok(Some(buf))
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}
