//! Line-at-a-time driver: read, dissect, filter, project, write.

use std::io::{BufRead, BufWriter, Write};

use log::{debug, trace, warn};
use urify_core::{dissect_with, project, DissectedUrl, FilterSpec, Mode, SuffixList};

use crate::error::CliError;

/// What to write for a URL that passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// The input line itself
    Original,
    /// A projection of the dissected URL
    Mode(Mode),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank input lines
    pub read: usize,
    /// Output lines written
    pub emitted: usize,
    /// URLs rejected by the filter
    pub rejected: usize,
}

pub struct Pipeline<'a> {
    list: &'a SuffixList,
    filter: Option<FilterSpec>,
    output: Output,
}

impl<'a> Pipeline<'a> {
    pub fn new(list: &'a SuffixList, filter: Option<FilterSpec>, output: Output) -> Self {
        Self {
            list,
            filter,
            output,
        }
    }

    /// Process every line of `reader`, writing results to `writer`.
    ///
    /// A closed output pipe ends the run without an error.
    pub fn run<R: BufRead, W: Write>(&self, mut reader: R, writer: W) -> Result<RunStats, CliError> {
        let mut out = BufWriter::new(writer);
        let mut stats = RunStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).map_err(CliError::Read)?;
            if n == 0 {
                break;
            }

            // Invalid UTF-8 is replaced rather than aborting the stream
            let line = String::from_utf8_lossy(&buf);
            let raw = line.trim();
            if raw.is_empty() {
                continue;
            }
            stats.read += 1;

            let url = dissect_with(raw, self.list);
            if let Some(filter) = &self.filter {
                if !filter.matches(&url) {
                    trace!("rejected {:?}", raw);
                    stats.rejected += 1;
                    continue;
                }
            }

            match self.emit(raw, &url, &mut out) {
                Ok(written) => stats.emitted += written,
                Err(e) if e.is_broken_pipe() => {
                    debug!("output closed after {} lines", stats.emitted);
                    return Ok(stats);
                }
                Err(e) => return Err(e),
            }
        }

        match out.flush().map_err(CliError::Write) {
            Err(e) if e.is_broken_pipe() => debug!("output closed during final flush"),
            result => result?,
        }

        debug!(
            "processed {} lines: {} emitted, {} rejected",
            stats.read, stats.emitted, stats.rejected
        );
        Ok(stats)
    }

    fn emit<W: Write>(&self, raw: &str, url: &DissectedUrl, out: &mut W) -> Result<usize, CliError> {
        let mode = match self.output {
            Output::Original => {
                writeln!(out, "{}", raw).map_err(CliError::Write)?;
                return Ok(1);
            }
            Output::Mode(mode) => mode,
        };

        let lines = match project(url, mode) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("skipping {:?}: {}", raw, e);
                return Ok(0);
            }
        };

        let mut written = 0;
        for line in lines {
            writeln!(out, "{}", line).map_err(CliError::Write)?;
            written += 1;
        }
        Ok(written)
    }
}
