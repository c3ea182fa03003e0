//! Metrics collection and reporting for batch runs.
//!
//! Tracks what a compress or extract run did:
//! - Files processed and failed (with the failure reason)
//! - Raw and compressed byte totals, and their ratio
//! - Carrier files read or written
//! - Timing information
//!
//! # Thread Safety
//!
//! The `Metrics` struct is NOT thread-safe. Runs are single-threaded and
//! update it in place.

use std::time::{Duration, Instant};

/// Counters for one batch run.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Files ===
    /// Files compressed or decompressed successfully
    pub files_ok: u64,

    /// Files that failed, with the reason
    pub files_failed: Vec<(String, String)>,

    /// Files skipped (e.g. empty input, refused names)
    pub files_skipped: u64,

    // === Bytes ===
    /// Uncompressed bytes across all successful files
    pub raw_bytes: u64,

    /// Compressed block bytes across all successful files
    pub compressed_bytes: u64,

    // === Carriers ===
    /// Carrier files written (compress) or read (extract)
    pub carriers_processed: u64,

    /// Carrier files with no attached payload
    pub carriers_without_payload: u64,

    /// Carrier files whose container failed to parse
    pub carriers_corrupt: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            files_ok: 0,
            files_failed: Vec::new(),
            files_skipped: 0,
            raw_bytes: 0,
            compressed_bytes: 0,
            carriers_processed: 0,
            carriers_without_payload: 0,
            carriers_corrupt: 0,
        }
    }

    /// Record a file that round-tripped through the codec.
    pub fn record_file(&mut self, raw_bytes: usize, compressed_bytes: usize) {
        self.files_ok += 1;
        self.raw_bytes += raw_bytes as u64;
        self.compressed_bytes += compressed_bytes as u64;
    }

    /// Record a file that failed.
    pub fn record_failure(&mut self, name: impl Into<String>, reason: impl ToString) {
        self.files_failed.push((name.into(), reason.to_string()));
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Compute compression ratio (compressed / raw).
    ///
    /// Returns 0.0 if no data compressed.
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.compressed_bytes as f64 / self.raw_bytes as f64
        }
    }

    /// True if no file or carrier failed.
    pub fn is_success(&self) -> bool {
        self.files_failed.is_empty() && self.carriers_without_payload == 0 && self.carriers_corrupt == 0
    }

    /// Compute throughput in bytes/second over raw bytes.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.raw_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("=== Files ===");
        println!("Processed: {}", self.files_ok);
        println!("Skipped: {}", self.files_skipped);
        println!("Failed: {}", self.files_failed.len());
        for (name, reason) in &self.files_failed {
            println!("  {name}: {reason}");
        }
        println!();

        println!("=== Compression ===");
        println!("Raw bytes: {} ({:.2} KiB)", self.raw_bytes, self.raw_bytes as f64 / 1024.0);
        println!(
            "Compressed: {} ({:.2} KiB)",
            self.compressed_bytes,
            self.compressed_bytes as f64 / 1024.0
        );
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();

        println!("=== Carriers ===");
        println!("Processed: {}", self.carriers_processed);
        println!("Without payload: {}", self.carriers_without_payload);
        println!("Corrupt: {}", self.carriers_corrupt);
        println!();

        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
    }

    /// Print just the final result (pass/fail).
    pub fn print_result(&self) {
        if self.is_success() {
            println!("✓ Completed: {} files, {} bytes in {} ms", self.files_ok, self.raw_bytes, self.duration().as_millis());
        } else {
            println!(
                "✗ Completed with errors: {} files ok, {} failed, {} carriers without payload, {} corrupt",
                self.files_ok,
                self.files_failed.len(),
                self.carriers_without_payload,
                self.carriers_corrupt
            );
        }
    }

    /// Export metrics as `key=value` lines, one counter per line.
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             files_ok={}\n\
             files_failed={}\n\
             files_skipped={}\n\
             raw_bytes={}\n\
             compressed_bytes={}\n\
             compression_ratio={:.4}\n\
             carriers_processed={}\n\
             carriers_without_payload={}\n\
             carriers_corrupt={}\n",
            self.duration().as_millis(),
            self.files_ok,
            self.files_failed.len(),
            self.files_skipped,
            self.raw_bytes,
            self.compressed_bytes,
            self.compression_ratio(),
            self.carriers_processed,
            self.carriers_without_payload,
            self.carriers_corrupt,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
