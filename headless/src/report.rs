//! Output records for `jumpsim sweep`
//!
//! Per-trial rows go to stdout as TSV (with a header) or JSON lines. With
//! `--summary` the rows are replaced by one aggregate per jump range.

use clap::ValueEnum;
use jump_sim_core::{JobResult, JumpRangeSummary, SweepStats};
use serde::Serialize;
use std::io::{self, Write};

pub const TRIAL_HEADER: &str = "ID\tBecause\tSucc\tDensity\tJumpRange\tCount\tTotalJump\tEfficiency";
pub const SUMMARY_HEADER: &str =
    "JumpRange\tDensity\tTrials\tSuccesses\tSuccessRate\tMeanCount\tMeanEfficiency\tExceedMaxHop\tCancelled";

const NA: &str = "NA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Tsv,
    Jsonl,
}

/// One trial as written to the output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub id: u64,
    pub because: Option<&'static str>,
    pub succ: bool,
    pub density: f64,
    pub jump_range: f64,
    pub count: Option<usize>,
    pub total_jump: Option<f64>,
    pub efficiency: Option<f64>,
}

impl TrialRecord {
    pub fn new(result: &JobResult, field_size: f64) -> Self {
        Self {
            id: result.id,
            because: result.failure_reason().map(|r| r.as_str()),
            succ: result.succeeded(),
            density: result.density,
            jump_range: result.jump_range,
            count: result.hop_count(),
            total_jump: result.total_distance(),
            efficiency: result.efficiency(field_size),
        }
    }

    pub fn tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{:.6}\t{:.2}\t{}\t{}\t{}",
            self.id,
            self.because.unwrap_or(NA),
            if self.succ { "T" } else { "F" },
            self.density,
            self.jump_range,
            self.count.map_or_else(|| NA.to_string(), |c| c.to_string()),
            fixed_or_na(self.total_jump, 2),
            fixed_or_na(self.efficiency, 4),
        )
    }
}

/// One jump-range aggregate as written to the output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    #[serde(flatten)]
    pub summary: JumpRangeSummary,
    pub success_rate: f64,
}

impl SummaryRecord {
    pub fn new(summary: JumpRangeSummary) -> Self {
        Self {
            success_rate: summary.success_rate(),
            summary,
        }
    }

    pub fn tsv(&self) -> String {
        let s = &self.summary;
        format!(
            "{:.2}\t{:.6}\t{}\t{}\t{:.4}\t{}\t{}\t{}\t{}",
            s.jump_range,
            s.density,
            s.trials,
            s.successes,
            self.success_rate,
            fixed_or_na(s.mean_hops, 2),
            fixed_or_na(s.mean_efficiency, 4),
            s.exceeded_max_hop,
            s.cancelled,
        )
    }
}

fn fixed_or_na(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| NA.to_string(), |v| format!("{v:.precision$}"))
}

/// Writes results as they arrive in id order
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    field_size: f64,
    stats: Option<SweepStats>,
}

impl<W: Write> Reporter<W> {
    /// `summary` switches from per-trial rows to per-jump-range aggregates.
    pub fn new(out: W, format: OutputFormat, field_size: f64, summary: bool) -> Self {
        Self {
            out,
            format,
            field_size,
            stats: summary.then(|| SweepStats::new(field_size)),
        }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        if self.format == OutputFormat::Tsv {
            let header = if self.stats.is_some() {
                SUMMARY_HEADER
            } else {
                TRIAL_HEADER
            };
            writeln!(self.out, "{header}")?;
        }
        Ok(())
    }

    pub fn record(&mut self, result: &JobResult) -> io::Result<()> {
        match self.stats.as_mut() {
            Some(stats) => match stats.push(result) {
                Some(summary) => self.write_summary(summary),
                None => Ok(()),
            },
            None => {
                let record = TrialRecord::new(result, self.field_size);
                match self.format {
                    OutputFormat::Tsv => writeln!(self.out, "{}", record.tsv()),
                    OutputFormat::Jsonl => self.write_json(&record),
                }
            }
        }
    }

    /// Flush the last open aggregate and the writer, returning the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(summary) = self.stats.as_mut().and_then(SweepStats::finish) {
            self.write_summary(summary)?;
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_summary(&mut self, summary: JumpRangeSummary) -> io::Result<()> {
        let record = SummaryRecord::new(summary);
        match self.format {
            OutputFormat::Tsv => writeln!(self.out, "{}", record.tsv()),
            OutputFormat::Jsonl => self.write_json(&record),
        }
    }

    fn write_json<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jump_sim_core::{FailureReason, Problem};

    fn reached() -> JobResult {
        JobResult::reached(&Problem::new(4, 12.5, 0.002375, 100), 87, 1250.0)
    }

    fn failed() -> JobResult {
        JobResult::failed(&Problem::new(5, 12.5, 0.002375, 100), FailureReason::ExceedMaxHop)
    }

    #[test]
    fn test_trial_tsv_row() {
        assert_eq!(
            TrialRecord::new(&reached(), 1000.0).tsv(),
            "4\tNA\tT\t0.002375\t12.50\t87\t1250.00\t0.8000"
        );
        assert_eq!(
            TrialRecord::new(&failed(), 1000.0).tsv(),
            "5\texceed_max_hop\tF\t0.002375\t12.50\tNA\tNA\tNA"
        );
    }

    #[test]
    fn test_header_matches_row_width() {
        let row = TrialRecord::new(&reached(), 1000.0).tsv();
        assert_eq!(
            TRIAL_HEADER.split('\t').count(),
            row.split('\t').count()
        );
    }

    #[test]
    fn test_tsv_stream() {
        let mut reporter = Reporter::new(Vec::new(), OutputFormat::Tsv, 1000.0, false);
        reporter.write_header().unwrap();
        reporter.record(&reached()).unwrap();
        reporter.record(&failed()).unwrap();
        let text = String::from_utf8(reporter.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TRIAL_HEADER);
        assert!(lines[2].starts_with("5\texceed_max_hop\tF"));
    }

    #[test]
    fn test_jsonl_stream() {
        let mut reporter = Reporter::new(Vec::new(), OutputFormat::Jsonl, 1000.0, false);
        reporter.write_header().unwrap();
        reporter.record(&failed()).unwrap();
        let text = String::from_utf8(reporter.finish().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["id"], 5);
        assert_eq!(value["because"], "exceed_max_hop");
        assert_eq!(value["succ"], false);
        assert!(value["count"].is_null());
    }

    #[test]
    fn test_summary_stream() {
        let mut reporter = Reporter::new(Vec::new(), OutputFormat::Tsv, 1000.0, true);
        reporter.write_header().unwrap();
        reporter.record(&reached()).unwrap();
        reporter.record(&failed()).unwrap();
        let text = String::from_utf8(reporter.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], SUMMARY_HEADER);
        assert_eq!(lines[1], "12.50\t0.002375\t2\t1\t0.5000\t87.00\t0.8000\t1\t0");
        assert_eq!(lines.len(), 2);
    }
}
