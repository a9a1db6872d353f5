//! Transmission-time model: when does compressing before sending pay off?
//!
//! Closed-form comparison of raw versus compressed transfer given sizes,
//! codec times, bandwidth, and one-way latency. No measurement happens
//! here; callers supply the six inputs.

/// Inputs and derived quantities for one transfer comparison.
#[derive(Debug, Clone, Copy)]
pub struct TransmissionMetrics {
    /// Raw payload size in bits.
    pub uncompressed_size_bits: u64,
    /// Compressed payload size in bits.
    pub compressed_size_bits: u64,
    /// Time to compress, nanoseconds.
    pub compression_time_ns: u64,
    /// Time to decompress, nanoseconds.
    pub decompression_time_ns: u64,
    /// Link bandwidth in bits per second.
    pub bandwidth_bps: f64,
    /// One-way latency, nanoseconds.
    pub latency_ns: u64,
}

impl TransmissionMetrics {
    /// Raw size over compressed size; infinite when nothing is stored.
    pub fn compression_ratio(&self) -> f64 {
        if self.compressed_size_bits == 0 {
            return f64::INFINITY;
        }
        self.uncompressed_size_bits as f64 / self.compressed_size_bits as f64
    }

    /// Wire time for the raw payload, nanoseconds.
    pub fn uncompressed_transmission_ns(&self) -> f64 {
        self.uncompressed_size_bits as f64 / self.bandwidth_bps * 1e9
    }

    /// Wire time for the compressed payload, nanoseconds.
    pub fn compressed_transmission_ns(&self) -> f64 {
        self.compressed_size_bits as f64 / self.bandwidth_bps * 1e9
    }

    /// Latency plus raw wire time.
    pub fn total_uncompressed_ns(&self) -> f64 {
        self.latency_ns as f64 + self.uncompressed_transmission_ns()
    }

    /// Latency plus compress, compressed wire time, and decompress.
    pub fn total_compressed_ns(&self) -> f64 {
        self.latency_ns as f64
            + self.compression_time_ns as f64
            + self.compressed_transmission_ns()
            + self.decompression_time_ns as f64
    }

    /// Time saved by compressing; negative when compression loses.
    pub fn time_saved_ns(&self) -> f64 {
        self.total_uncompressed_ns() - self.total_compressed_ns()
    }

    /// Whether the compressed path completes first.
    pub fn is_beneficial(&self) -> bool {
        self.time_saved_ns() > 0.0
    }

    /// Human-readable single-point report.
    pub fn format_report(&self) -> String {
        let mut lines = vec![
            "Transmission Analysis Report".to_string(),
            "=".repeat(50),
            format!(
                "Uncompressed size: {} bits ({} bytes)",
                self.uncompressed_size_bits,
                self.uncompressed_size_bits / 8
            ),
            format!(
                "Compressed size: {} bits ({} bytes)",
                self.compressed_size_bits,
                self.compressed_size_bits / 8
            ),
            format!("Compression ratio: {:.2}x", self.compression_ratio()),
            String::new(),
            "Timing breakdown:".to_string(),
            format!("  Link latency: {:.3} ms", self.latency_ns as f64 / 1e6),
            format!(
                "  Compression time: {:.3} ms",
                self.compression_time_ns as f64 / 1e6
            ),
            format!(
                "  Decompression time: {:.3} ms",
                self.decompression_time_ns as f64 / 1e6
            ),
            String::new(),
            format!(
                "Total time (raw): {:.3} ms",
                self.total_uncompressed_ns() / 1e6
            ),
            format!(
                "Total time (compressed): {:.3} ms",
                self.total_compressed_ns() / 1e6
            ),
            String::new(),
        ];

        let saved = self.time_saved_ns();
        let pct = saved.abs() / self.total_uncompressed_ns() * 100.0;
        if self.is_beneficial() {
            lines.push(format!(
                "Compression saves {:.3} ms ({pct:.1}% faster)",
                saved / 1e6
            ));
        } else {
            lines.push(format!(
                "Compression adds {:.3} ms of overhead ({pct:.1}% slower)",
                -saved / 1e6
            ));
        }
        lines.join("\n")
    }
}

/// Fixed ladder of (label, bandwidth bps, latency ns) sweep points.
pub const BANDWIDTH_LADDER: [(&str, f64, u64); 6] = [
    ("10 Gbps LAN (low latency)", 10e9, 100_000),
    ("1 Gbps LAN", 1e9, 500_000),
    ("100 Mbps", 100e6, 1_000_000),
    ("10 Mbps", 10e6, 5_000_000),
    ("1 Mbps", 1e6, 20_000_000),
    ("56 Kbps modem", 56e3, 100_000_000),
];

/// Slowest bandwidth at which compressing still wins, ignoring latency
/// (it cancels out). `None` when compression does not reduce the size.
pub fn min_bandwidth_for_benefit(
    uncompressed_size_bits: u64,
    compressed_size_bits: u64,
    compression_time_ns: u64,
    decompression_time_ns: u64,
) -> Option<f64> {
    if compressed_size_bits >= uncompressed_size_bits {
        return None;
    }
    let overhead_ns = compression_time_ns + decompression_time_ns;
    if overhead_ns == 0 {
        return Some(0.0);
    }
    let saved_bits = (uncompressed_size_bits - compressed_size_bits) as f64;
    Some(saved_bits / overhead_ns as f64 * 1e9)
}

/// Report the comparison across the fixed bandwidth ladder.
pub fn analyze_scenarios(
    uncompressed_size_bits: u64,
    compressed_size_bits: u64,
    compression_time_ns: u64,
    decompression_time_ns: u64,
) -> String {
    let mut lines = vec![
        "Network Scenario Analysis".to_string(),
        "=".repeat(70),
        String::new(),
    ];

    for (label, bandwidth_bps, latency_ns) in BANDWIDTH_LADDER {
        let metrics = TransmissionMetrics {
            uncompressed_size_bits,
            compressed_size_bits,
            compression_time_ns,
            decompression_time_ns,
            bandwidth_bps,
            latency_ns,
        };
        let status = if metrics.is_beneficial() {
            "BENEFICIAL"
        } else {
            "NOT BENEFICIAL"
        };
        lines.push(format!("{label:30} {status}"));
        lines.push(format!(
            "  Raw: {:8.3} ms | Compressed: {:8.3} ms | Diff: {:+8.3} ms",
            metrics.total_uncompressed_ns() / 1e6,
            metrics.total_compressed_ns() / 1e6,
            metrics.time_saved_ns() / 1e6
        ));
        lines.push(String::new());
    }

    match min_bandwidth_for_benefit(
        uncompressed_size_bits,
        compressed_size_bits,
        compression_time_ns,
        decompression_time_ns,
    ) {
        Some(min_bw) => lines.push(format!(
            "Minimum bandwidth for benefit: {:.2} Mbps (ignoring latency)",
            min_bw / 1e6
        )),
        None => lines.push("Compression never beneficial (no size reduction)".to_string()),
    }

    lines.join("\n")
}
