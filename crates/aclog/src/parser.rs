//! Streaming frame scanner for `.aclog` buffers.
//!
//! The scanner walks the buffer once, resynchronising byte by byte on the
//! `AC` magic, and feeds decoded values into growable per-dataset columns.
//! Work is split into budgeted [`FrameScanner::parse_step`] calls so a caller
//! can interleave scanning with other work and report progress.
//!
//! # Example
//!
//! ```no_run
//! use aclog::parser::FrameScanner;
//!
//! let bytes = std::fs::read("flight.aclog").unwrap();
//! let mut scanner = FrameScanner::new(&bytes);
//! scanner.parse_header().unwrap();
//! while scanner.parse_step(500_000).unwrap() < 1.0 {
//!     // redraw a progress bar here
//! }
//! let result = scanner.take_result().unwrap();
//! println!("{} frames", result.stats.total_frames);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::codec::{Cursor, Endian};
use crate::dataset::{DatasetBuilder, DatasetMap};
use crate::error::{Error, Result};
use crate::records::{Payload, RecordKind, LENGTH_OVERHEAD};

/// The two magic bytes opening the header and every record.
pub const MAGIC: [u8; 2] = *b"AC";

/// Size of the fixed file header.
pub const HEADER_LEN: usize = 28;

/// Size of the header's description field.
pub const DESCRIPTION_LEN: usize = 24;

/// Bytes before a record's payload: magic, type tag, length.
pub const FRAME_PREFIX_LEN: usize = 4;

/// Default cap on frames per session.
pub const DEFAULT_MAX_FRAMES: u64 = 20_000_000;

/// The fixed 28-byte file header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogHeader {
    /// Always `"AC"`.
    pub magic: String,
    /// Major format version.
    pub ver_main: u8,
    /// Minor format version.
    pub ver_sub: u8,
    /// Free-form description, at most 24 single-byte characters.
    pub description: String,
}

impl LogHeader {
    /// Build a header with the standard magic.
    #[must_use]
    pub fn new(ver_main: u8, ver_sub: u8, description: impl Into<String>) -> Self {
        Self {
            magic: "AC".to_string(),
            ver_main,
            ver_sub,
            description: description.into(),
        }
    }

    /// Parse the header at the start of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if `buf` is shorter than [`HEADER_LEN`] or
    /// does not start with [`MAGIC`].
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::format(format!(
                "need {HEADER_LEN} bytes, buffer has {}",
                buf.len()
            )));
        }
        if buf[..2] != MAGIC {
            return Err(Error::format(format!(
                "bad magic {:#04x} {:#04x}",
                buf[0], buf[1]
            )));
        }
        let cursor = Cursor::new(buf, Endian::Little);
        Ok(Self {
            magic: "AC".to_string(),
            ver_main: cursor.u8(2)?,
            ver_sub: cursor.u8(3)?,
            description: cursor.fixed_str(4, DESCRIPTION_LEN)?,
        })
    }

    /// Encode into the on-disk layout.
    ///
    /// The description is truncated to 24 bytes; characters outside Latin-1
    /// become `?`.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..2].copy_from_slice(&MAGIC);
        out[2] = self.ver_main;
        out[3] = self.ver_sub;
        for (slot, c) in out[4..].iter_mut().zip(self.description.chars()) {
            *slot = u8::try_from(u32::from(c)).unwrap_or(b'?');
        }
        out
    }
}

/// Running frame counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStats {
    /// Frames with a valid magic and in-bounds length.
    pub total_frames: u64,
    /// Frames whose type tag has no registered decoder.
    pub unknown_frames: u64,
    /// Frames seen per type tag.
    pub frame_counts: BTreeMap<u8, u64>,
}

impl ParseStats {
    fn record(&mut self, tag: u8, known: bool) {
        self.total_frames += 1;
        *self.frame_counts.entry(tag).or_insert(0) += 1;
        if !known {
            self.unknown_frames += 1;
        }
    }

    /// Frame counts labelled with the registered type name (or `Unknown`).
    #[must_use]
    pub fn labelled_counts(&self) -> Vec<(u8, &'static str, u64)> {
        self.frame_counts
            .iter()
            .map(|(&tag, &count)| {
                let name = RecordKind::from_tag(tag).map_or("Unknown", RecordKind::name);
                (tag, name, count)
            })
            .collect()
    }
}

/// Lifecycle of a [`FrameScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Header not parsed yet.
    Unstarted,
    /// Header parsed, no frames scanned.
    Ready,
    /// Some but not all of the buffer has been scanned.
    InProgress,
    /// The whole buffer has been scanned.
    Complete,
}

impl ScanState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Ready => "ready",
            Self::InProgress => "in progress",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scanner tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Byte order of multi-byte fields.
    pub endian: Endian,
    /// Frames allowed per session before the log is rejected as corrupt.
    pub max_frames: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

/// Everything extracted from one log.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// The file header.
    pub header: LogHeader,
    /// Frame counters.
    pub stats: ParseStats,
    /// Decoded datasets keyed by name.
    pub datasets: DatasetMap,
}

/// Resumable single-pass scanner over an in-memory log.
#[derive(Debug)]
pub struct FrameScanner<'a> {
    buf: &'a [u8],
    options: ScanOptions,
    state: ScanState,
    offset: usize,
    header: Option<LogHeader>,
    stats: ParseStats,
    datasets: BTreeMap<String, DatasetBuilder>,
    skipped_bytes: u64,
}

impl<'a> FrameScanner<'a> {
    /// Create a scanner with default options.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, ScanOptions::default())
    }

    /// Create a scanner with explicit options.
    #[must_use]
    pub fn with_options(buf: &'a [u8], options: ScanOptions) -> Self {
        Self {
            buf,
            options,
            state: ScanState::Unstarted,
            offset: 0,
            header: None,
            stats: ParseStats::default(),
            datasets: BTreeMap::new(),
            skipped_bytes: 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Byte offset of the next frame candidate.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Bytes discarded while resynchronising on the magic.
    #[must_use]
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped_bytes
    }

    /// Fraction of the buffer consumed so far.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.state == ScanState::Complete || self.buf.is_empty() {
            return 1.0;
        }
        self.offset as f64 / self.buf.len() as f64
    }

    /// Parse the header and position the scanner on the first frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for a short buffer or bad magic, and
    /// [`Error::InvalidState`] if the header was already parsed.
    pub fn parse_header(&mut self) -> Result<&LogHeader> {
        if self.state != ScanState::Unstarted {
            return Err(self.invalid("parse the header"));
        }
        let header = LogHeader::parse(self.buf)?;
        info!(
            version = %format!("{}.{}", header.ver_main, header.ver_sub),
            description = %header.description,
            bytes = self.buf.len(),
            "Parsed log header"
        );
        self.offset = HEADER_LEN;
        self.state = ScanState::Ready;
        Ok(self.header.insert(header))
    }

    /// Scan frames until roughly `budget` bytes have been consumed or the
    /// buffer is exhausted.
    ///
    /// Returns the fraction of the buffer consumed; exactly `1.0` means the
    /// scan is complete. Calling again after completion is a no-op that
    /// returns `1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] before the header is parsed and
    /// [`Error::FrameLimit`] once the session's frame cap is exceeded.
    pub fn parse_step(&mut self, budget: usize) -> Result<f64> {
        match self.state {
            ScanState::Unstarted => return Err(self.invalid("step")),
            ScanState::Complete => return Ok(1.0),
            ScanState::Ready | ScanState::InProgress => {}
        }
        self.state = ScanState::InProgress;

        let budget = budget.max(1);
        let len = self.buf.len();
        let start = self.offset;
        let mut resync_run = 0usize;

        loop {
            if self.offset + FRAME_PREFIX_LEN > len {
                self.finish("end of buffer");
                return Ok(1.0);
            }
            if self.offset - start >= budget {
                let progress = self.progress();
                debug!(offset = self.offset, progress, "Scan step yielded");
                return Ok(progress);
            }

            if self.buf[self.offset..self.offset + 2] != MAGIC {
                self.offset += 1;
                self.skipped_bytes += 1;
                resync_run += 1;
                continue;
            }
            if resync_run > 0 {
                trace!(bytes = resync_run, offset = self.offset, "Resynchronised on magic");
                resync_run = 0;
            }

            let tag = self.buf[self.offset + 2];
            let length = self.buf[self.offset + 3];
            let frame_len = LENGTH_OVERHEAD + usize::from(length);
            if self.offset + frame_len > len {
                warn!(
                    offset = self.offset,
                    tag,
                    length,
                    "Trailing record overruns the buffer; treating as end of stream"
                );
                self.finish("truncated trailing record");
                return Ok(1.0);
            }

            if self.stats.total_frames >= self.options.max_frames {
                return Err(Error::FrameLimit {
                    limit: self.options.max_frames,
                });
            }

            let kind = RecordKind::from_tag(tag);
            self.stats.record(tag, kind.is_some());
            if let Some(kind) = kind {
                let payload = Payload::new(
                    self.buf,
                    self.offset + FRAME_PREFIX_LEN,
                    self.options.endian,
                    length,
                );
                for entry in kind.decode(&payload) {
                    let dataset = self.datasets.entry(entry.dataset.into_owned()).or_default();
                    for (field, value) in &entry.values {
                        dataset.push(field, *value);
                    }
                }
            }

            // A length byte below 2 advances past the magic only.
            self.offset += frame_len;
        }
    }

    /// Scan the remainder of the buffer in one call.
    ///
    /// # Errors
    ///
    /// Same as [`FrameScanner::parse_step`].
    pub fn parse_to_end(&mut self) -> Result<()> {
        while self.parse_step(usize::MAX)? < 1.0 {}
        Ok(())
    }

    /// Freeze all columns and hand back the parsed log.
    ///
    /// Calling this before the scan is complete leaves the scanner untouched,
    /// so scanning can resume. Once taken, the result is gone and a second
    /// call fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the scan is complete and the
    /// result has not been taken yet.
    pub fn take_result(&mut self) -> Result<ParseResult> {
        if self.state != ScanState::Complete {
            return Err(self.invalid("take the result"));
        }
        let header = self.header.take().ok_or(Error::InvalidState {
            operation: "take the result",
            state: "already taken",
        })?;
        let datasets = std::mem::take(&mut self.datasets)
            .into_iter()
            .map(|(key, builder)| {
                let dataset = builder.freeze(&key);
                (key, dataset)
            })
            .collect();
        Ok(ParseResult {
            header,
            stats: self.stats.clone(),
            datasets,
        })
    }

    fn finish(&mut self, reason: &'static str) {
        self.state = ScanState::Complete;
        debug!(
            reason,
            frames = self.stats.total_frames,
            unknown = self.stats.unknown_frames,
            skipped_bytes = self.skipped_bytes,
            datasets = self.datasets.len(),
            "Scan complete"
        );
    }

    fn invalid(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state.as_str(),
        }
    }
}

/// Parse a complete log in one pass with the given options.
///
/// # Errors
///
/// Returns header format errors and the frame-limit error.
pub fn parse_with(buf: &[u8], options: ScanOptions) -> Result<ParseResult> {
    let mut scanner = FrameScanner::with_options(buf, options);
    scanner.parse_header()?;
    scanner.parse_to_end()?;
    scanner.take_result()
}

/// Parse a complete log in one pass with default options.
///
/// # Errors
///
/// Returns header format errors and the frame-limit error.
pub fn parse(buf: &[u8]) -> Result<ParseResult> {
    parse_with(buf, ScanOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, LocalPosition, SystemState};

    fn sample_log() -> Vec<u8> {
        let mut log = fixtures::header("bench flight");
        for i in 0..20u32 {
            log.extend(fixtures::frame(
                1,
                &SystemState {
                    ticks: i * 100,
                    mode: 2,
                    ..SystemState::default()
                }
                .encode(),
            ));
            if i % 3 == 0 {
                log.extend_from_slice(&[0x00, 0x41, 0x13]);
            }
            log.extend(fixtures::frame(
                32,
                &LocalPosition {
                    ticks: i * 100,
                    pos: [f64::from(i), 0.0, -1.0],
                    ..LocalPosition::default()
                }
                .encode(),
            ));
            log.extend(fixtures::frame(
                250,
                &fixtures::debug_vect(i * 100, "lingP", &[f64::from(i), 1.0]),
            ));
            log.extend(fixtures::frame(99, &[1, 2, 3]));
        }
        log
    }

    #[test]
    fn test_header_round_trip() {
        let header = LogHeader::new(3, 14, "quad-x test 7");
        let bytes = header.encode();
        assert_eq!(&bytes[..2], b"AC");
        assert_eq!(LogHeader::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_description_full_width() {
        let header = LogHeader::new(1, 0, "abcdefghijklmnopqrstuvwx");
        let parsed = LogHeader::parse(&header.encode()).unwrap();
        assert_eq!(parsed.description, "abcdefghijklmnopqrstuvwx");

        let long = LogHeader::new(1, 0, "abcdefghijklmnopqrstuvwxyz");
        let parsed = LogHeader::parse(&long.encode()).unwrap();
        assert_eq!(parsed.description.len(), DESCRIPTION_LEN);
    }

    #[test]
    fn test_header_non_latin1_replaced() {
        let header = LogHeader::new(1, 0, "飞行");
        let parsed = LogHeader::parse(&header.encode()).unwrap();
        assert_eq!(parsed.description, "??");
    }

    #[test]
    fn test_header_errors() {
        let err = LogHeader::parse(&[b'A', b'C', 1]).unwrap_err();
        assert!(err.is_format_error());

        let mut bytes = LogHeader::new(1, 0, "x").encode();
        bytes[1] = b'X';
        let err = LogHeader::parse(&bytes).unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_step_before_header_is_rejected() {
        let log = sample_log();
        let mut scanner = FrameScanner::new(&log);
        assert!(matches!(
            scanner.parse_step(100),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_header_twice_is_rejected() {
        let log = sample_log();
        let mut scanner = FrameScanner::new(&log);
        scanner.parse_header().unwrap();
        assert!(scanner.parse_header().is_err());
    }

    #[test]
    fn test_result_before_completion_is_rejected() {
        let log = sample_log();
        let mut scanner = FrameScanner::new(&log);
        scanner.parse_header().unwrap();
        scanner.parse_step(10).unwrap();
        assert_eq!(scanner.state(), ScanState::InProgress);
        assert!(scanner.take_result().is_err());
    }

    #[test]
    fn test_early_take_keeps_scanned_data() {
        let log = sample_log();
        let mut scanner = FrameScanner::new(&log);
        scanner.parse_header().unwrap();
        scanner.parse_step(200).unwrap();
        let frames_so_far = scanner.stats().total_frames;
        let offset = scanner.offset();
        assert!(frames_so_far > 0);

        assert!(matches!(
            scanner.take_result(),
            Err(Error::InvalidState { .. })
        ));
        assert_eq!(scanner.stats().total_frames, frames_so_far);
        assert_eq!(scanner.offset(), offset);

        scanner.parse_to_end().unwrap();
        let resumed = scanner.take_result().unwrap();
        let single = parse(&log).unwrap();
        assert_eq!(resumed.stats, single.stats);
        assert_eq!(resumed.datasets, single.datasets);

        assert!(scanner.take_result().is_err());
    }

    #[test]
    fn test_lifecycle_states() {
        let log = sample_log();
        let mut scanner = FrameScanner::new(&log);
        assert_eq!(scanner.state(), ScanState::Unstarted);
        scanner.parse_header().unwrap();
        assert_eq!(scanner.state(), ScanState::Ready);
        assert_eq!(scanner.offset(), HEADER_LEN);
        scanner.parse_to_end().unwrap();
        assert_eq!(scanner.state(), ScanState::Complete);
        assert_eq!(scanner.parse_step(10).unwrap(), 1.0);
    }

    #[test]
    fn test_frame_accounting() {
        let result = parse(&sample_log()).unwrap();
        let stats = &result.stats;

        assert_eq!(stats.total_frames, 80);
        assert_eq!(stats.total_frames, stats.frame_counts.values().sum::<u64>());
        let unknown: u64 = stats
            .frame_counts
            .iter()
            .filter(|(tag, _)| RecordKind::from_tag(**tag).is_none())
            .map(|(_, count)| count)
            .sum();
        assert_eq!(stats.unknown_frames, unknown);
        assert_eq!(stats.unknown_frames, 20);
        assert_eq!(stats.frame_counts[&32], 20);
    }

    #[test]
    fn test_datasets_accumulate_in_order() {
        let result = parse(&sample_log()).unwrap();
        let pos = &result.datasets["LocalPosition_Pos"];
        assert_eq!(pos.rows(), 20);
        let xs: Vec<f64> = pos.field("PosX").unwrap().to_vec();
        assert_eq!(xs, (0..20).map(f64::from).collect::<Vec<_>>());
        assert!(pos.validate().is_ok());
        assert_eq!(result.datasets["Bias"].rows(), 20);
        assert_eq!(result.datasets["SystemState"].rows(), 20);
    }

    #[test]
    fn test_chunked_matches_single_pass() {
        let log = sample_log();
        let single = parse(&log).unwrap();

        for budget in [1, 7, 64, 1000] {
            let mut scanner = FrameScanner::new(&log);
            scanner.parse_header().unwrap();
            let mut last = 0.0;
            loop {
                let progress = scanner.parse_step(budget).unwrap();
                assert!(progress >= last);
                assert!((0.0..=1.0).contains(&progress));
                last = progress;
                if progress >= 1.0 {
                    break;
                }
            }
            let chunked = scanner.take_result().unwrap();
            assert_eq!(chunked.stats, single.stats);
            assert_eq!(chunked.datasets, single.datasets);
        }
    }

    #[test]
    fn test_resync_over_garbage() {
        let state = fixtures::frame(1, &SystemState::default().encode());
        let acc = fixtures::frame(32, &LocalPosition::default().encode());

        let mut clean = fixtures::header("");
        clean.extend(&state);
        clean.extend(&acc);

        let mut dirty = fixtures::header("");
        dirty.extend(&state);
        dirty.extend_from_slice(&[0x41, 0x00, 0x43, 0x41, 0x41, 0xFF, 0x13]);
        dirty.extend(&acc);

        let clean = parse(&clean).unwrap();
        let dirty = parse(&dirty).unwrap();
        assert_eq!(dirty.stats.total_frames, 2);
        assert_eq!(dirty.stats, clean.stats);
        assert_eq!(dirty.datasets, clean.datasets);
    }

    #[test]
    fn test_truncated_trailing_record_ends_stream() {
        crate::logging::init_test_logging();
        let mut log = fixtures::header("");
        log.extend(fixtures::frame(1, &SystemState::default().encode()));
        let mut tail = fixtures::frame(32, &LocalPosition::default().encode());
        tail.truncate(40);
        log.extend(tail);

        let result = parse(&log).unwrap();
        assert_eq!(result.stats.total_frames, 1);
        assert!(result.datasets.contains_key("SystemState"));
        assert!(!result.datasets.contains_key("LocalPosition_Pos"));
    }

    #[test]
    fn test_zero_payload_frame_at_end_is_counted() {
        let mut log = fixtures::header("");
        log.extend(fixtures::frame(77, &[]));
        let result = parse(&log).unwrap();
        assert_eq!(result.stats.total_frames, 1);
        assert_eq!(result.stats.unknown_frames, 1);
    }

    #[test]
    fn test_length_below_overhead_still_advances() {
        let mut log = fixtures::header("");
        log.extend_from_slice(&[b'A', b'C', 5, 0]);
        log.extend_from_slice(&[b'A', b'C', 5, 1, 0]);
        log.extend(fixtures::frame(1, &SystemState::default().encode()));
        let result = parse(&log).unwrap();
        assert_eq!(result.stats.frame_counts[&5], 2);
        assert_eq!(result.stats.frame_counts[&1], 1);
    }

    #[test]
    fn test_header_only_log() {
        let result = parse(&fixtures::header("empty")).unwrap();
        assert_eq!(result.stats.total_frames, 0);
        assert!(result.datasets.is_empty());
        assert_eq!(result.header.description, "empty");
    }

    #[test]
    fn test_frame_limit() {
        let options = ScanOptions {
            max_frames: 10,
            ..ScanOptions::default()
        };
        let err = parse_with(&sample_log(), options).unwrap_err();
        assert!(matches!(err, Error::FrameLimit { limit: 10 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_big_endian_option_changes_decoding() {
        let mut log = fixtures::header("");
        log.extend(fixtures::frame(
            1,
            &SystemState {
                ticks: 1,
                ..SystemState::default()
            }
            .encode(),
        ));
        let options = ScanOptions {
            endian: Endian::Big,
            ..ScanOptions::default()
        };
        let result = parse_with(&log, options).unwrap();
        let time = result.datasets["SystemState"].time().unwrap()[0];
        assert!((time - f64::from(1u32 << 24) * 0.0001).abs() < 1e-9);
    }

    #[test]
    fn test_labelled_counts() {
        let result = parse(&sample_log()).unwrap();
        let labels = result.stats.labelled_counts();
        assert!(labels.contains(&(1, "SystemState", 20)));
        assert!(labels.contains(&(99, "Unknown", 20)));
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let result = parse(&sample_log()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["stats"]["totalFrames"], 80);
        assert_eq!(json["stats"]["frameCounts"]["99"], 20);
        assert_eq!(json["header"]["verMain"], 1);
        assert_eq!(json["datasets"]["SystemState"]["data"]["Mode"][0], 2.0);
    }

    #[test]
    fn test_small_log_end_to_end() {
        let mut log = fixtures::header("bench");
        log.extend(fixtures::frame(1, &SystemState::default().encode()));
        log.extend(fixtures::frame(32, &LocalPosition::default().encode()));
        log.push(0x00);
        log.extend(fixtures::frame(99, &[7, 7]));

        let mut scanner = FrameScanner::new(&log);
        scanner.parse_header().unwrap();
        let mut steps = 0;
        while scanner.parse_step(1).unwrap() < 1.0 {
            steps += 1;
            assert!(steps < log.len());
        }
        let result = scanner.take_result().unwrap();

        assert_eq!(result.stats.total_frames, 3);
        assert_eq!(result.stats.unknown_frames, 1);
        for key in [
            "SystemState",
            "LocalPosition_Pos",
            "LocalPosition_Vel",
            "LocalPosition_Acc",
        ] {
            assert_eq!(result.datasets[key].rows(), 1, "{key}");
        }
        assert_eq!(result.datasets.len(), 4);
    }
}
