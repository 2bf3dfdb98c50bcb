//! Console rendering of scan results.

use std::io::Write;
use anyhow::{Result, Context};

use crate::scanner::types::{ModuleMapping, ScanResult, ScanStats};

/// Write one `filename - tag` line per classified file
pub fn write_listing(out: &mut impl Write, mapping: &ModuleMapping) -> Result<()> {
    for (path, tag) in mapping {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        writeln!(out, "{} - {}", name, tag).context("Failed to write listing")?;
    }
    Ok(())
}

/// Write the scan counters
pub fn write_summary(out: &mut impl Write, stats: &ScanStats) -> Result<()> {
    writeln!(out, "Files found:    {}", stats.total_files)?;
    writeln!(out, "Classified:     {}", stats.classified)?;
    writeln!(out, "Unreadable:     {}", stats.unreadable)?;
    writeln!(out, "Malformed:      {}", stats.malformed)?;
    writeln!(out, "Missing tag:    {}", stats.missing_tag)?;
    writeln!(out, "Moved:          {}", stats.moved)?;
    writeln!(out, "Move failures:  {}", stats.move_failures)?;
    Ok(())
}

/// Write the whole result as pretty-printed JSON
pub fn write_json(out: &mut impl Write, result: &ScanResult) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, result).context("Failed to serialize scan result")?;
    writeln!(out)?;
    Ok(())
}
