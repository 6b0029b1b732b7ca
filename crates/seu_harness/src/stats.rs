//! Run counters and the end-of-run report.

use std::fmt;

use serde::Serialize;

/// Counters accumulated over one run. Never reset mid-run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Clock cycles completed.
    pub cycles: u64,
    /// Cycles with the request valid.
    pub req_valid_cycles: u64,
    /// Cycles with the request valid and ready.
    pub req_fire_cycles: u64,
    /// Cycles with the response ready.
    pub rsp_ready_cycles: u64,
    /// Cycles with the response valid and ready.
    pub rsp_fire_cycles: u64,
    /// Bit flips injected.
    pub errors_injected: u64,
    /// Reads indexed by how many of the read cell's bits were corrupted.
    /// Has `width + 1` buckets.
    pub read_with_errors: Vec<u64>,
    /// SRAM read accesses observed.
    pub sram_reads: u64,
    /// SRAM write accesses observed.
    pub sram_writes: u64,
    /// Responses the DUT flagged with `error`.
    pub rsp_error_reports: u64,
    /// Responses the DUT flagged with `uncorrectable_error`.
    pub rsp_uncorrectable_reports: u64,
}

impl RunStatistics {
    /// Zeroed counters for a memory of `width`-bit cells.
    pub fn new(width: u32) -> Self {
        Self {
            cycles: 0,
            req_valid_cycles: 0,
            req_fire_cycles: 0,
            rsp_ready_cycles: 0,
            rsp_fire_cycles: 0,
            errors_injected: 0,
            read_with_errors: vec![0; width as usize + 1],
            sram_reads: 0,
            sram_writes: 0,
            rsp_error_reports: 0,
            rsp_uncorrectable_reports: 0,
        }
    }

    /// Records one classified read with `errors` corrupted bits. Counts
    /// beyond the word width land in the last bucket.
    pub fn record_read(&mut self, errors: u32) {
        let last = self.read_with_errors.len() - 1;
        self.read_with_errors[(errors as usize).min(last)] += 1;
        self.sram_reads += 1;
    }

    /// Total classified reads.
    pub fn total_reads(&self) -> u64 {
        self.read_with_errors.iter().sum()
    }

    /// Reads that saw at least one corrupted bit.
    pub fn reads_with_any_error(&self) -> u64 {
        self.read_with_errors.iter().skip(1).sum()
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "req_valid_cycles: {}", self.req_valid_cycles)?;
        writeln!(f, "req_fire_cycles: {}", self.req_fire_cycles)?;
        writeln!(f, "rsp_ready_cycles: {}", self.rsp_ready_cycles)?;
        writeln!(f, "rsp_fire_cycles: {}", self.rsp_fire_cycles)?;
        writeln!(f, "errors_injected: {}", self.errors_injected)?;
        for (i, n) in self.read_with_errors.iter().enumerate() {
            writeln!(f, "read_with_errors[{i}] = {n}")?;
        }
        writeln!(f, "sram_reads: {}", self.sram_reads)?;
        writeln!(f, "sram_writes: {}", self.sram_writes)?;
        writeln!(f, "rsp_error_reports: {}", self.rsp_error_reports)?;
        writeln!(
            f,
            "rsp_uncorrectable_reports: {}",
            self.rsp_uncorrectable_reports
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_has_width_plus_one_buckets() {
        assert_eq!(RunStatistics::new(16).read_with_errors.len(), 17);
        assert_eq!(RunStatistics::new(1).read_with_errors.len(), 2);
    }

    #[test]
    fn record_read_buckets() {
        let mut stats = RunStatistics::new(4);
        stats.record_read(0);
        stats.record_read(2);
        stats.record_read(2);
        stats.record_read(9);
        assert_eq!(stats.read_with_errors, vec![1, 0, 2, 0, 1]);
        assert_eq!(stats.total_reads(), 4);
        assert_eq!(stats.sram_reads, 4);
        assert_eq!(stats.reads_with_any_error(), 3);
    }

    #[test]
    fn report_layout() {
        let mut stats = RunStatistics::new(2);
        stats.req_valid_cycles = 10;
        stats.req_fire_cycles = 9;
        stats.rsp_ready_cycles = 10;
        stats.rsp_fire_cycles = 8;
        stats.errors_injected = 3;
        stats.record_read(1);
        let expected = "\
req_valid_cycles: 10
req_fire_cycles: 9
rsp_ready_cycles: 10
rsp_fire_cycles: 8
errors_injected: 3
read_with_errors[0] = 0
read_with_errors[1] = 1
read_with_errors[2] = 0
sram_reads: 1
sram_writes: 0
rsp_error_reports: 0
rsp_uncorrectable_reports: 0
";
        assert_eq!(stats.to_string(), expected);
    }

    #[test]
    fn json_field_names() {
        let stats = RunStatistics::new(1);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["errors_injected"], 0);
        assert_eq!(json["read_with_errors"].as_array().unwrap().len(), 2);
    }
}
