use anyhow::{bail, Result};
use std::collections::HashSet;
use tracing::warn;

/// Normalize port entries into a deduplicated list of port strings (1..=65535).
///
/// Supported forms per entry:
/// - single port number: `22`
/// - inclusive range: `2200-2202`
///
/// Invalid entries are skipped with a warning. Order of first appearance is kept.
pub fn normalize_ports(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    for entry in raw {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match parse_port_entry(entry) {
            Ok(ports) => {
                for p in ports {
                    if seen.insert(p) {
                        out.push(p.to_string());
                    }
                }
            }
            Err(e) => warn!("Skipping invalid port entry {entry:?}: {e}"),
        }
    }

    out
}

fn parse_port_entry(entry: &str) -> Result<Vec<u16>> {
    if let Some((a, b)) = entry.split_once('-') {
        let start = parse_port_str(a.trim())?;
        let end = parse_port_str(b.trim())?;
        if start > end {
            bail!("invalid range {start}-{end} (start > end)");
        }
        return Ok((start..=end).collect());
    }
    Ok(vec![parse_port_str(entry)?])
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s.parse::<u32>().map_err(|e| anyhow::anyhow!(e))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
