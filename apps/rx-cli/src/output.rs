//! CSV snapshot output.

use rx_sim::{Snapshot, SnapshotSink};
use std::cell::Cell;
use std::io::{self, Write};

pub const CSV_HEADER: &str = "time_s,reactor_temp_c,jacket_temp_c,valve,setpoint_c";

pub fn csv_row(s: &Snapshot) -> String {
    format!(
        "{},{},{},{},{}",
        s.sim_time, s.reactor_temp, s.jacket_temp, s.valve_position, s.setpoint
    )
}

/// Writes one CSV row per snapshot.
///
/// The first write error is kept and raises `failed`, which the run hook
/// checks to stop the simulation.
pub struct CsvSink<'a, W: Write> {
    out: W,
    rows: u64,
    error: Option<io::Error>,
    failed: &'a Cell<bool>,
}

impl<'a, W: Write> CsvSink<'a, W> {
    pub fn new(mut out: W, failed: &'a Cell<bool>) -> io::Result<Self> {
        writeln!(out, "{CSV_HEADER}")?;
        Ok(Self {
            out,
            rows: 0,
            error: None,
            failed,
        })
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and report the first write error, if any.
    pub fn finish(mut self) -> io::Result<u64> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.rows)
    }
}

impl<W: Write> SnapshotSink for CsvSink<'_, W> {
    fn accept(&mut self, snapshot: &Snapshot) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.out, "{}", csv_row(snapshot)) {
            Ok(()) => self.rows += 1,
            Err(e) => {
                tracing::error!(error = %e, "failed to write snapshot");
                self.error = Some(e);
                self.failed.set(true);
            }
        }
    }
}
