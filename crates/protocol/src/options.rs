use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::SourceFormat;

/// The format dropdown: either auto-detect from the file name or a fixed
/// [`SourceFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatChoice {
    #[default]
    Auto,
    Fixed(SourceFormat),
}

impl FormatChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            FormatChoice::Auto => "auto",
            FormatChoice::Fixed(format) => format.as_str(),
        }
    }
}

impl fmt::Display for FormatChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatChoice {
    type Err = crate::format::UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            return Ok(FormatChoice::Auto);
        }
        s.parse::<SourceFormat>().map(FormatChoice::Fixed)
    }
}

// On the wire this is a plain string field ("auto", "callgrind", ...).
impl Serialize for FormatChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormatChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Colormap identifiers accepted by the server-side renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Color,
    Bw,
    Gray,
    Pink,
    Print,
}

impl Colormap {
    pub const ALL: [Colormap; 5] = [
        Colormap::Color,
        Colormap::Bw,
        Colormap::Gray,
        Colormap::Pink,
        Colormap::Print,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Colormap::Color => "color",
            Colormap::Bw => "bw",
            Colormap::Gray => "gray",
            Colormap::Pink => "pink",
            Colormap::Print => "print",
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every filter/render option of a generate request.
///
/// An instance is cloned into the request snapshot at dispatch time, so a
/// request never observes an edit made while it was in flight. The text
/// filters are free-form; the server validates them, the client only trims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub format: FormatChoice,
    /// Hide nodes below this percentage of total time (0–100).
    pub node_threshold: f64,
    /// Hide edges below this percentage of total time (0–100).
    pub edge_threshold: f64,
    pub colormap: Colormap,
    /// Strip function parameters, template parameters, and const modifiers.
    pub strip: bool,
    /// Wrap long function names.
    pub wrap: bool,
    pub color_nodes_by_selftime: bool,
    pub show_samples: bool,
    pub root: String,
    pub leaf: String,
    pub depth: String,
    pub skew: String,
    pub path: String,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            format: FormatChoice::Auto,
            node_threshold: 0.5,
            edge_threshold: 0.1,
            colormap: Colormap::Color,
            strip: false,
            wrap: false,
            color_nodes_by_selftime: false,
            show_samples: false,
            root: String::new(),
            leaf: String::new(),
            depth: String::new(),
            skew: String::new(),
            path: String::new(),
        }
    }
}

impl GraphOptions {
    /// The `(key, value)` pairs of the multipart form posted to
    /// `/generate`, excluding the input source field. Text filters are
    /// sent trimmed; booleans as `true`/`false`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("format", self.format.as_str().to_string()),
            ("node_threshold", self.node_threshold.to_string()),
            ("edge_threshold", self.edge_threshold.to_string()),
            ("colormap", self.colormap.as_str().to_string()),
            ("strip", self.strip.to_string()),
            ("wrap", self.wrap.to_string()),
            (
                "color_nodes_by_selftime",
                self.color_nodes_by_selftime.to_string(),
            ),
            ("show_samples", self.show_samples.to_string()),
            ("root", self.root.trim().to_string()),
            ("leaf", self.leaf.trim().to_string()),
            ("depth", self.depth.trim().to_string()),
            ("skew", self.skew.trim().to_string()),
            ("path", self.path.trim().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_defaults() {
        let options = GraphOptions::default();
        assert_eq!(options.format, FormatChoice::Auto);
        assert!((options.node_threshold - 0.5).abs() < f64::EPSILON);
        assert!((options.edge_threshold - 0.1).abs() < f64::EPSILON);
        assert_eq!(options.colormap, Colormap::Color);
        assert!(!options.strip);
    }

    #[test]
    fn form_fields_trim_text_filters() {
        let options = GraphOptions {
            root: "  main  ".into(),
            ..GraphOptions::default()
        };
        let fields = options.form_fields();
        let root = fields.iter().find(|(k, _)| *k == "root").unwrap();
        assert_eq!(root.1, "main");
    }

    #[test]
    fn form_fields_cover_every_option() {
        let fields = GraphOptions::default().form_fields();
        let keys: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [
                "format",
                "node_threshold",
                "edge_threshold",
                "colormap",
                "strip",
                "wrap",
                "color_nodes_by_selftime",
                "show_samples",
                "root",
                "leaf",
                "depth",
                "skew",
                "path",
            ]
        );
    }

    #[test]
    fn format_choice_round_trips_through_json() {
        let json = serde_json::to_string(&FormatChoice::Auto).unwrap();
        assert_eq!(json, "\"auto\"");
        let fixed: FormatChoice = serde_json::from_str("\"perf\"").unwrap();
        assert_eq!(fixed, FormatChoice::Fixed(SourceFormat::Perf));
        assert!(serde_json::from_str::<FormatChoice>("\"bogus\"").is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let options: GraphOptions =
            serde_json::from_str(r#"{"node_threshold": 50.0, "strip": true}"#).unwrap();
        assert!((options.node_threshold - 50.0).abs() < f64::EPSILON);
        assert!(options.strip);
        assert_eq!(options.colormap, Colormap::Color);
    }
}
