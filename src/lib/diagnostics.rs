//! Checks on the diagnostic output of the tool that produced the pileup.
//!
//! The pileup itself is generated elsewhere; what reaches us is its stderr
//! text. Known benign messages are dropped, everything else is surfaced as a
//! warning, and the version banner is checked against the oldest release whose
//! output format is supported.

use log::warn;
use std::fmt;

/// Oldest producer version with a supported pileup layout.
pub const MIN_TOOL_VERSION: ToolVersion = ToolVersion {
    major: 0,
    minor: 1,
    patch: 13,
};

/// Stderr lines that are expected and carry no information.
const BENIGN_STDERR_LINES: &[&str] = &["[mpileup] 1 samples in 1 input files", "[fai_load] build FASTA index."];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolVersion {
    /// Parse the first `Version:` banner, e.g. `Version: 0.1.13 (r926:134)`.
    pub fn from_banner<I, S>(lines: I) -> Option<ToolVersion>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let line = lines.into_iter().find(|l| l.as_ref().contains("Version:"))?;
        let version = line
            .as_ref()
            .split_once("Version:")?
            .1
            .split_whitespace()
            .next()?;
        Self::parse(version)
    }

    /// Parse `major.minor[.patch]`; a suffix such as `-r926` on the last part is ignored.
    pub fn parse(version: &str) -> Option<ToolVersion> {
        let mut parts = version.split('.').map(|part| {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        });
        let major = parts.next()??;
        let minor = parts.next()??;
        let patch = parts.next().unwrap_or(Some(0))?;
        Some(ToolVersion { major, minor, patch })
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Find the version banner and warn when it is missing or too old.
pub fn check_tool_version<I, S>(lines: I) -> Option<ToolVersion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match ToolVersion::from_banner(lines) {
        Some(version) if version < MIN_TOOL_VERSION => {
            warn!(
                "Pileup producer version {} looks too old (need at least {}); results may be unreliable",
                version, MIN_TOOL_VERSION
            );
            Some(version)
        }
        Some(version) => Some(version),
        None => {
            warn!("Couldn't determine the pileup producer version");
            None
        }
    }
}

/// Warn about every unexpected stderr line; returns how many there were.
pub fn report_stderr_lines<I, S>(lines: I) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unhandled = 0;
    for line in lines {
        let line = line.as_ref().trim_end();
        if line.trim().is_empty() || BENIGN_STDERR_LINES.contains(&line) {
            continue;
        }
        warn!("Unhandled line on stderr detected: {}", line);
        unhandled += 1;
    }
    unhandled
}
