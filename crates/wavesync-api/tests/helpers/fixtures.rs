//! Synthetic media for upload tests.

#![allow(dead_code)]

/// 8 kHz mono unsigned 8-bit PCM WAV lasting `secs` seconds.
pub fn wav(secs: f64) -> Vec<u8> {
    let sample_rate: u32 = 8000;
    let data_len = (secs * f64::from(sample_rate)).round() as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&8u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0x80);
    out
}

/// MPEG-1 Layer III, 128 kbps, 48 kHz, mono: 384-byte frames of 24 ms each.
const MP3_HEADER: [u8; 4] = [0xFF, 0xFB, 0x94, 0xC0];
const MP3_FRAME_LEN: usize = 384;
const MP3_FRAME_SECS: f64 = 1152.0 / 48_000.0;

/// Constant-bitrate MP3 without a Xing/Info frame lasting `secs` seconds.
pub fn mp3_cbr(secs: f64) -> Vec<u8> {
    let frames = (secs / MP3_FRAME_SECS).round() as usize;
    let mut out = Vec::with_capacity(frames * MP3_FRAME_LEN);
    for _ in 0..frames {
        out.extend_from_slice(&MP3_HEADER);
        out.resize(out.len() + MP3_FRAME_LEN - MP3_HEADER.len(), 0);
    }
    out
}

/// Bytes a server honouring `Range: bytes=0-1048576` sends back.
pub fn range_prefix(data: &[u8]) -> Vec<u8> {
    data[..data.len().min(1024 * 1024 + 1)].to_vec()
}

/// Not a decodable image; storage fakes never look inside.
pub fn cover_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
}
