//! External collaborators: catalog sorting and interval intersection
//!
//! Both are modelled as traits so the pipeline can run against any
//! implementation; the default ones drive `sort` and `bedtools intersect`
//! as subprocesses.

use crate::core::{io, LineIterator, OverlapParams, PeakError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Command, Stdio};

/// Sorts a catalog by chromosome, start and end, dropping comment lines
pub trait CatalogSorter {
    fn sort(&self, catalog: &Path, sorted: &Path) -> Result<()>;
}

/// Intersects peaks with a sorted catalog
///
/// Must produce one line per satisfying peak/interval pair and one
/// no-match line (catalog start `-1`) for each peak without a partner,
/// handing each line to `on_line` in order.
pub trait OverlapEngine {
    fn intersect(
        &self,
        peaks: &Path,
        catalog: &Path,
        params: &OverlapParams,
        on_line: &mut dyn FnMut(&str) -> Result<()>,
    ) -> Result<()>;
}

/// `LC_ALL=C sort -n -k 1 -k 2 -k 3`
#[derive(Debug, Clone)]
pub struct ExternalSort {
    program: String,
}

impl ExternalSort {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Prefer GNU `gsort` when it is installed, plain `sort` otherwise
    pub fn detect() -> Self {
        let has_gsort = Command::new("gsort")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        Self::new(if has_gsort { "gsort" } else { "sort" })
    }
}

impl CatalogSorter for ExternalSort {
    fn sort(&self, catalog: &Path, sorted: &Path) -> Result<()> {
        let input = File::open(catalog).map_err(|e| PeakError::read(catalog, e))?;
        let output = File::create(sorted).map_err(|e| PeakError::write(sorted, e))?;

        let mut child = Command::new(&self.program)
            .env("LC_ALL", "C")
            .args(["-n", "-k", "1", "-k", "2", "-k", "3"])
            .stdin(Stdio::piped())
            .stdout(Stdio::from(output))
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| PeakError::tool(&self.program, format!("cannot launch: {}", e)))?;

        let feed = match child.stdin.take() {
            Some(stdin) => feed_uncommented(catalog, BufReader::new(input), stdin),
            None => Err(PeakError::tool(&self.program, "stdin not captured")),
        };

        let status = child
            .wait()
            .map_err(|e| PeakError::tool(&self.program, e.to_string()))?;
        feed?;
        if !status.success() {
            return Err(PeakError::tool(&self.program, format!("exited with {}", status)));
        }
        Ok(())
    }
}

/// Copy every line not starting with `#` into `sink`
fn feed_uncommented<R: std::io::BufRead, W: Write>(
    source: &Path,
    reader: R,
    sink: W,
) -> Result<()> {
    let mut lines = LineIterator::new(reader);
    let mut sink = BufWriter::new(sink);
    while let Some(line) = lines.next_line() {
        let line = line.map_err(|e| PeakError::read(source, e))?;
        if line.starts_with('#') {
            continue;
        }
        writeln!(sink, "{}", line).map_err(|e| PeakError::tool("sort", e.to_string()))?;
    }
    sink.flush().map_err(|e| PeakError::tool("sort", e.to_string()))
}

/// `bedtools intersect -a <peaks> -b <catalog> -f F -F F [-e] -wao`
#[derive(Debug, Clone)]
pub struct BedtoolsIntersect {
    program: String,
}

impl BedtoolsIntersect {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments after the program name
    pub fn arguments(&self, peaks: &Path, catalog: &Path, params: &OverlapParams) -> Vec<String> {
        let mut args = vec![
            "intersect".to_string(),
            "-a".to_string(),
            peaks.display().to_string(),
            "-b".to_string(),
            catalog.display().to_string(),
            "-f".to_string(),
            params.min_peak_fraction.to_string(),
            "-F".to_string(),
            params.min_feature_fraction.to_string(),
        ];
        if params.either {
            args.push("-e".to_string());
        }
        args.push("-wao".to_string());
        args
    }
}

impl Default for BedtoolsIntersect {
    fn default() -> Self {
        Self::new("bedtools")
    }
}

impl OverlapEngine for BedtoolsIntersect {
    fn intersect(
        &self,
        peaks: &Path,
        catalog: &Path,
        params: &OverlapParams,
        on_line: &mut dyn FnMut(&str) -> Result<()>,
    ) -> Result<()> {
        let tool = format!("{} intersect", self.program);
        let args = self.arguments(peaks, catalog, params);
        log::debug!("Running {} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| PeakError::tool(&tool, format!("cannot launch: {}", e)))?;

        let consumed = match child.stdout.take() {
            Some(stdout) => {
                let mut lines = LineIterator::new(BufReader::with_capacity(io::DEFAULT_BUFFER_SIZE, stdout));
                let mut result = Ok(());
                while let Some(line) = lines.next_line() {
                    result = line
                        .map_err(|e| PeakError::tool(&tool, e.to_string()))
                        .and_then(|line| on_line(line));
                    if result.is_err() {
                        break;
                    }
                }
                result
            }
            None => Err(PeakError::tool(&tool, "stdout not captured")),
        };

        if consumed.is_err() {
            let _ = child.kill();
        }
        let status = child
            .wait()
            .map_err(|e| PeakError::tool(&tool, e.to_string()))?;
        consumed?;
        if !status.success() {
            return Err(PeakError::tool(&tool, format!("exited with {}", status)));
        }
        Ok(())
    }
}
