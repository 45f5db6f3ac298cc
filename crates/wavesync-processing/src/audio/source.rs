//! Forward-only media source over a blocking reader.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Mutex;
use symphonia::core::io::MediaSource;

/// Adapts a forward-only reader (a bridged HTTP body) to symphonia's `MediaSource`.
///
/// With a known total length the source reports itself seekable, which lets the MP3
/// reader estimate duration from bitrate and size. Seeks may only move forward and are
/// served by reading and discarding bytes.
pub struct ForwardOnlySource {
    // Mutex only to satisfy `Sync`; access always goes through `&mut self`.
    inner: Mutex<Box<dyn Read + Send>>,
    byte_len: Option<u64>,
    position: u64,
}

impl ForwardOnlySource {
    pub fn new(inner: Box<dyn Read + Send>, byte_len: Option<u64>) -> Self {
        Self {
            inner: Mutex::new(inner),
            byte_len,
            position: 0,
        }
    }

    fn reader(&mut self) -> io::Result<&mut Box<dyn Read + Send>> {
        self.inner
            .get_mut()
            .map_err(|_| io::Error::other("source reader poisoned"))
    }

    fn skip_to(&mut self, target: u64) -> io::Result<u64> {
        if target < self.position {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "source cannot seek backwards",
            ));
        }

        let wanted = target - self.position;
        let skipped = io::copy(&mut self.reader()?.take(wanted), &mut io::sink())?;
        self.position += skipped;
        if skipped < wanted {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "seek target past the fetched prefix",
            ));
        }
        Ok(self.position)
    }
}

impl Read for ForwardOnlySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader()?.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for ForwardOnlySource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
            SeekFrom::End(delta) => self.byte_len.and_then(|len| len.checked_add_signed(delta)),
        };
        let target = target
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid seek target"))?;
        self.skip_to(target)
    }
}

impl MediaSource for ForwardOnlySource {
    fn is_seekable(&self) -> bool {
        self.byte_len.is_some()
    }

    fn byte_len(&self) -> Option<u64> {
        self.byte_len
    }
}
