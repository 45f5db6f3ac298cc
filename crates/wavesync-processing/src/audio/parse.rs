//! Blocking container probe. Runs on the blocking pool.

use super::error::ProbeError;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Format hints gathered from the HTTP exchange.
#[derive(Debug, Clone, Default)]
pub struct FormatHint {
    pub mime_type: Option<String>,
    pub extension: Option<String>,
}

impl FormatHint {
    /// Extension from the last path segment of `url`, mime type from the response.
    pub fn from_url(url: &reqwest::Url, mime_type: Option<String>) -> Self {
        let extension = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty());

        // Drop parameters such as "; charset=binary"
        let mime_type = mime_type
            .and_then(|m| m.split(';').next().map(|m| m.trim().to_lowercase()))
            .filter(|m| !m.is_empty());

        Self {
            mime_type,
            extension,
        }
    }

    fn to_hint(&self) -> Hint {
        let mut hint = Hint::new();
        if let Some(ref ext) = self.extension {
            hint.with_extension(ext);
        }
        if let Some(ref mime) = self.mime_type {
            hint.mime_type(mime);
        }
        hint
    }
}

/// Read container headers from `source` and return the duration in (fractional) seconds.
pub fn read_duration_secs(
    source: Box<dyn MediaSource>,
    format_hint: &FormatHint,
) -> Result<f64, ProbeError> {
    let stream = MediaSourceStream::new(source, Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &format_hint.to_hint(),
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ProbeError::Parse(e.to_string()))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ProbeError::Parse("No audio track found".to_string()))?;

    let params = &track.codec_params;
    let n_frames = params.n_frames.ok_or(ProbeError::NoDuration)?;

    let secs = match (params.time_base, params.sample_rate) {
        (Some(time_base), _) => {
            let time = time_base.calc_time(n_frames);
            time.seconds as f64 + time.frac
        }
        (None, Some(sample_rate)) if sample_rate > 0 => n_frames as f64 / f64::from(sample_rate),
        _ => return Err(ProbeError::NoDuration),
    };

    if !secs.is_finite() || secs <= 0.0 {
        return Err(ProbeError::NoDuration);
    }

    Ok(secs)
}
