//! Incremental extraction of marker-delimited frames from the serial stream.
//!
//! The device emits telemetry frames bounded by a 2-byte start marker `<:` and a
//! 2-byte end marker `:>`. Bytes arrive in arbitrary chunks and may be preceded
//! or followed by noise; the extractor accumulates them and hands back complete
//! frames, inclusive of both markers, in arrival order.

/// Start-of-frame marker.
pub const START_MARKER: [u8; 2] = [b'<', b':'];

/// End-of-frame marker.
pub const END_MARKER: [u8; 2] = [b':', b'>'];

/// Upper bound on a single extracted frame.
///
/// A full 3-channel telemetry frame is 33 bytes; anything markedly longer is
/// line noise that happened to land between a marker pair.
pub const MAX_FRAME_LEN: usize = 64;

/// How many trailing bytes survive a buffer overflow. Tunable, approximate; the
/// policy trades completeness for forward progress on a stream that never
/// produces a valid end marker.
const RETAIN_TAIL: usize = 100;

/// One complete frame, start and end markers included.
pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;

/// Accumulates raw serial bytes and yields complete frames.
///
/// `N` bounds the accumulation buffer (default 1024 bytes). The extractor never
/// blocks and never fails: input without markers simply yields nothing, and a
/// buffer that fills up without completing a frame is truncated to its tail so
/// that memory use stays bounded.
pub struct FrameExtractor<const N: usize = 1024> {
    buf: heapless::Vec<u8, N>,
    overflows: u32,
}

impl<const N: usize> FrameExtractor<N> {
    /// Create an extractor with an empty buffer.
    pub fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            overflows: 0,
        }
    }

    /// Append freshly read bytes to the accumulation buffer.
    ///
    /// If the buffer would exceed its capacity, everything but the last
    /// [`RETAIN_TAIL`] bytes (of buffered plus incoming combined) is discarded
    /// and the overflow counter is bumped. Callers that extract after every
    /// append will have consumed any complete frame before this can drop one.
    pub fn append(&mut self, bytes: &[u8]) {
        if self.buf.len() + bytes.len() > N {
            self.overflows = self.overflows.saturating_add(1);
            let retain = RETAIN_TAIL.min(N);
            if bytes.len() >= retain {
                self.buf.clear();
                let _ = self.buf.extend_from_slice(&bytes[bytes.len() - retain..]);
                return;
            }
            let keep = retain - bytes.len();
            if self.buf.len() > keep {
                let drop = self.buf.len() - keep;
                self.buf.copy_within(drop.., 0);
                self.buf.truncate(keep);
            }
        }
        let _ = self.buf.extend_from_slice(bytes);
    }

    /// Extract the next complete frame, if the buffer holds one.
    ///
    /// Returns `None` when no start marker is present, or when a start marker
    /// has no matching end marker yet; in both cases the buffer is left as-is
    /// to wait for more bytes. On success the frame and any garbage preceding
    /// it are removed from the buffer.
    pub fn extract_frame(&mut self) -> Option<Frame> {
        let start = find(&self.buf, &START_MARKER)?;
        let end_rel = find(&self.buf[start + START_MARKER.len()..], &END_MARKER)?;
        let end = start + START_MARKER.len() + end_rel + END_MARKER.len();

        let mut frame = Frame::new();
        let take = (end - start).min(MAX_FRAME_LEN);
        let _ = frame.extend_from_slice(&self.buf[start..start + take]);

        // Drop the consumed prefix, leading garbage included.
        let remaining = self.buf.len() - end;
        self.buf.copy_within(end.., 0);
        self.buf.truncate(remaining);

        Some(frame)
    }

    /// Iterate over all frames currently completable from the buffer.
    pub fn frames(&mut self) -> Frames<'_, N> {
        Frames { extractor: self }
    }

    /// Number of bytes waiting in the accumulation buffer.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// How many times the overflow truncation has kicked in.
    pub fn overflow_count(&self) -> u32 {
        self.overflows
    }
}

impl<const N: usize> Default for FrameExtractor<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Draining iterator returned by [`FrameExtractor::frames`].
pub struct Frames<'a, const N: usize> {
    extractor: &'a mut FrameExtractor<N>,
}

impl<const N: usize> Iterator for Frames<'_, N> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.extractor.extract_frame()
    }
}

fn find(haystack: &[u8], needle: &[u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == needle.as_slice())
}
