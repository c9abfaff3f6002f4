use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Profiling data formats the generate endpoint can convert.
///
/// Matches the format identifiers of the server-side converter; `auto`
/// is not a format but a selection mode, see
/// [`FormatChoice`](crate::options::FormatChoice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Prof,
    Pstats,
    Callgrind,
    Perf,
    Collapse,
    Axe,
    Dtrace,
    Hprof,
    Json,
    Sleepy,
    Sysprof,
    Xperf,
}

/// File name prefixes that identify a format regardless of extension.
/// Checked before the extension table (valgrind writes `callgrind.out.<pid>`).
const PREFIX_RULES: &[(&str, SourceFormat)] = &[("callgrind.out", SourceFormat::Callgrind)];

const EXTENSION_RULES: &[(&str, SourceFormat)] = &[
    (".pstats", SourceFormat::Pstats),
    (".prof", SourceFormat::Prof),
    (".hprof", SourceFormat::Hprof),
    (".json", SourceFormat::Json),
    (".collapse", SourceFormat::Collapse),
    (".dtrace", SourceFormat::Dtrace),
    (".perf", SourceFormat::Perf),
    (".callgrind", SourceFormat::Callgrind),
];

impl SourceFormat {
    /// Every format, in the order the format dropdown lists them.
    pub const ALL: [SourceFormat; 12] = [
        SourceFormat::Prof,
        SourceFormat::Pstats,
        SourceFormat::Callgrind,
        SourceFormat::Perf,
        SourceFormat::Collapse,
        SourceFormat::Axe,
        SourceFormat::Dtrace,
        SourceFormat::Hprof,
        SourceFormat::Json,
        SourceFormat::Sleepy,
        SourceFormat::Sysprof,
        SourceFormat::Xperf,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Prof => "prof",
            SourceFormat::Pstats => "pstats",
            SourceFormat::Callgrind => "callgrind",
            SourceFormat::Perf => "perf",
            SourceFormat::Collapse => "collapse",
            SourceFormat::Axe => "axe",
            SourceFormat::Dtrace => "dtrace",
            SourceFormat::Hprof => "hprof",
            SourceFormat::Json => "json",
            SourceFormat::Sleepy => "sleepy",
            SourceFormat::Sysprof => "sysprof",
            SourceFormat::Xperf => "xperf",
        }
    }

    /// Guess the format from a file name, case-insensitively.
    ///
    /// Prefix rules win over extensions; returns `None` when nothing
    /// matches (the server then falls back to its own default).
    pub fn infer_from_filename(filename: &str) -> Option<SourceFormat> {
        let name = filename.to_ascii_lowercase();
        for (prefix, format) in PREFIX_RULES {
            if name.starts_with(prefix) {
                return Some(*format);
            }
        }
        for (ext, format) in EXTENSION_RULES {
            if name.ends_with(ext) {
                return Some(*format);
            }
        }
        None
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// A format identifier the protocol does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown profile format: {}", self.0)
    }
}

impl std::error::Error for UnknownFormat {}
