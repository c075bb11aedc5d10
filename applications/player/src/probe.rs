//! Duration probe over HTTP
//!
//! Fetches the media file and reads its length with symphonia. Hosts that
//! advertise the length in an `X-Content-Duration` (or `Content-Duration`)
//! header are answered from the header without decoding.

use async_trait::async_trait;
use cadence_playback::{DurationProbe, ProbeError};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::io::Cursor;
use std::time::Duration;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::debug;

const DURATION_HEADERS: [&str; 2] = ["x-content-duration", "content-duration"];

/// [`DurationProbe`] that downloads and inspects the media
#[derive(Debug, Clone)]
pub struct HttpDurationProbe {
    http: Client,
}

impl HttpDurationProbe {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl Default for HttpDurationProbe {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

#[async_trait]
impl DurationProbe for HttpDurationProbe {
    async fn probe(&self, url: &str) -> std::result::Result<Duration, ProbeError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Fetch(format!("HTTP {}", status.as_u16())));
        }

        match duration_from_headers(response.headers()) {
            Some(Ok(duration)) => {
                debug!(url = %url, seconds = duration.as_secs_f64(), "Duration from header");
                return Ok(duration);
            }
            Some(Err(e)) => debug!(url = %url, error = %e, "Ignoring duration header"),
            None => {}
        }

        let hint = hint_for(url, response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Fetch(e.to_string()))?;

        let duration = tokio::task::spawn_blocking(move || decode_duration(body, &hint))
            .await
            .map_err(|e| ProbeError::Decode(e.to_string()))??;

        debug!(url = %url, seconds = duration.as_secs_f64(), "Probed duration");
        Ok(duration)
    }
}

fn duration_from_headers(headers: &HeaderMap) -> Option<std::result::Result<Duration, ProbeError>> {
    let value = DURATION_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))?;

    let parsed = value
        .to_str()
        .map_err(|e| ProbeError::Decode(e.to_string()))
        .and_then(|text| {
            text.trim()
                .parse::<f64>()
                .ok()
                .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
                .ok_or_else(|| ProbeError::Decode(format!("invalid duration: {}", text)))
        });
    Some(parsed)
}

/// Format hint from the URL's file extension and the response content type
fn hint_for(url: &str, headers: &HeaderMap) -> Hint {
    let mut hint = Hint::new();
    if let Ok(parsed) = Url::parse(url) {
        if let Some(name) = parsed.path_segments().and_then(|mut segments| segments.next_back()) {
            if let Some((_, extension)) = name.rsplit_once('.') {
                hint.with_extension(extension);
            }
        }
    }
    if let Some(mime) = headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()) {
        hint.mime_type(mime);
    }
    hint
}

/// Length of an in-memory media file
///
/// Uses the frame count from the container when it has one. Otherwise walks
/// the packets (no decoding) and takes the end of the last one.
fn decode_duration<B>(data: B, hint: &Hint) -> std::result::Result<Duration, ProbeError>
where
    B: AsRef<[u8]> + Send + Sync + 'static,
{
    let source = MediaSourceStream::new(
        Box::new(Cursor::new(data)),
        MediaSourceStreamOptions::default(),
    );
    let probed = symphonia::default::get_probe()
        .format(
            hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ProbeError::Decode(format!("unrecognized media: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| ProbeError::Decode("no audio track".to_string()))?;
    let track_id = track.id;
    let n_frames = track.codec_params.n_frames;
    let time_base = track
        .codec_params
        .time_base
        .or_else(|| track.codec_params.sample_rate.map(|rate| TimeBase::new(1, rate)))
        .ok_or_else(|| ProbeError::Decode("no time base".to_string()))?;

    let frames = match n_frames {
        Some(frames) => frames,
        None => count_frames(format.as_mut(), track_id)?,
    };

    let time = time_base.calc_time(frames);
    Ok(Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac))
}

fn count_frames(
    format: &mut dyn FormatReader,
    track_id: u32,
) -> std::result::Result<u64, ProbeError> {
    let mut end = 0;
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => {
                end = end.max(packet.ts() + packet.dur());
            }
            Ok(_) => {}
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(ProbeError::Decode(e.to_string())),
        }
    }

    if end == 0 {
        return Err(ProbeError::Decode("no audio frames".to_string()));
    }
    Ok(end)
}
