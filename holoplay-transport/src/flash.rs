//! Paged flash reader
//!
//! The calibration store is read one page at a time: a READ_PAGE feature
//! report goes out, and the page comes back in an ordinary input report whose
//! header echoes the command and page number. There is no transaction ID, so
//! the echoed header is the only way to tell the answer apart from stale page
//! echoes or unsolicited button reports sitting in the input queue.
//!
//! ```text
//! send  [00] 00 PH PL 00 .. 00          (feature report, 68 bytes)
//! recv  BM 00 PH PL d0 d1 .. d63        (input report, 68 bytes)
//!       ^^ button mask, ignored here
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use zerocopy::IntoBytes;

use crate::error::{ProtocolError, ReadError, TransportError};
use crate::protocol::{self, timing, ReadPageRequest, HEADER_SIZE, INPUT_REPORT_SIZE, PAGE_SIZE};
use crate::types::ReadTimeout;
use crate::Transport;

/// Timeouts and retry bound for flash transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolTiming {
    pub first_read_timeout_ms: u32,
    pub continuation_timeout_ms: u32,
    pub flush_timeout_ms: u32,
    pub max_echo_attempts: usize,
}

impl Default for ProtocolTiming {
    fn default() -> Self {
        Self {
            first_read_timeout_ms: timing::FIRST_READ_TIMEOUT_MS,
            continuation_timeout_ms: timing::CONTINUATION_TIMEOUT_MS,
            flush_timeout_ms: timing::FLUSH_TIMEOUT_MS,
            max_echo_attempts: timing::MAX_ECHO_ATTEMPTS,
        }
    }
}

/// Reads byte ranges from the display's calibration flash
pub struct PagedFlashReader<'a> {
    transport: &'a dyn Transport,
    timing: ProtocolTiming,
}

impl<'a> PagedFlashReader<'a> {
    pub fn new(transport: &'a dyn Transport, timing: ProtocolTiming) -> Self {
        Self { transport, timing }
    }

    /// Drain queued input reports.
    ///
    /// Call before starting a transaction sequence: button reports and echoes
    /// of earlier requests would otherwise be the first thing read. Returns the
    /// number of reports discarded.
    pub fn flush(&self) -> Result<usize, TransportError> {
        let mut drained = 0;
        while drained < timing::MAX_FLUSH_REPORTS {
            let report = self.transport.read(
                INPUT_REPORT_SIZE,
                ReadTimeout::Millis(self.timing.flush_timeout_ms),
            )?;
            if report.is_empty() {
                break;
            }
            trace!("Flushed stale report: {:02X?}", &report[..report.len().min(8)]);
            drained += 1;
        }
        if drained > 0 {
            debug!("Flushed {} stale input reports", drained);
        }
        Ok(drained)
    }

    /// Read `byte_count` bytes from the start of flash page `page`
    pub fn read_page(&self, page: u16, byte_count: usize) -> Result<Vec<u8>, ReadError> {
        if byte_count > PAGE_SIZE {
            return Err(ProtocolError::PageTooLarge {
                requested: byte_count,
                max: PAGE_SIZE,
            }
            .into());
        }

        let request = ReadPageRequest::new(page);
        debug!("Reading {} bytes from page {}", byte_count, page);
        self.transport.send_feature_report(request.as_bytes())?;

        let mut report = self.await_echo(&request)?;

        if report.len() < INPUT_REPORT_SIZE {
            let rest = self.transport.read(
                INPUT_REPORT_SIZE - report.len(),
                ReadTimeout::Millis(self.timing.continuation_timeout_ms),
            )?;
            trace!(
                "Completed split report for page {}: {} + {} bytes",
                page,
                report.len(),
                rest.len()
            );
            report.extend_from_slice(&rest);
        }

        // Second check on the assembled report before trusting the payload
        let expected = request.echo();
        if protocol::echoed_header(&report) != Some(expected) {
            return Err(ProtocolError::EchoMismatch {
                page,
                expected,
                actual: report[..report.len().min(HEADER_SIZE)].to_vec(),
            }
            .into());
        }

        let payload = protocol::payload(&report);
        if payload.len() < byte_count {
            return Err(ProtocolError::ShortPayload {
                page,
                expected: byte_count,
                actual: payload.len(),
            }
            .into());
        }
        Ok(payload[..byte_count].to_vec())
    }

    /// Read input reports until one echoes `request`'s command and page
    fn await_echo(&self, request: &ReadPageRequest) -> Result<Vec<u8>, ReadError> {
        let expected = request.echo();
        let page = request.page();
        let max_attempts = self.timing.max_echo_attempts;

        for attempt in 1..=max_attempts {
            let report = self.transport.read(
                INPUT_REPORT_SIZE,
                ReadTimeout::Millis(self.timing.first_read_timeout_ms),
            )?;

            match protocol::echoed_header(&report) {
                Some(header) if header == expected => return Ok(report),
                Some(header) => {
                    debug!(
                        "Discarding report for page {}: echoes {:02X?}, waiting for {:02X?}",
                        page, header, expected
                    );
                }
                None if report.is_empty() => {
                    debug!("Read timed out waiting for page {} (attempt {})", page, attempt);
                }
                None => {
                    debug!("Discarding {}-byte fragment while waiting for page {}", report.len(), page);
                }
            }

            if attempt + 1 == max_attempts {
                warn!("Page {} not echoed yet, last attempt", page);
            }
        }

        Err(ProtocolError::NoMatchingResponse {
            page,
            attempts: max_attempts,
        }
        .into())
    }
}
