use std::sync::Arc;

/// Where the profiling data for a generate request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A server-side path, e.g. the file the CLI was launched with.
    /// Posted as the `file_path` form field.
    Path(String),
    /// A file picked or dropped by the user, uploaded with the request
    /// as the `file` form part.
    Blob { name: String, bytes: Arc<[u8]> },
}

impl InputSource {
    /// Build a path source, rejecting blank input. A whitespace-only path
    /// field means "no source selected", not a source.
    pub fn from_path(path: &str) -> Option<InputSource> {
        let path = path.trim();
        if path.is_empty() {
            None
        } else {
            Some(InputSource::Path(path.to_string()))
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> InputSource {
        InputSource::Blob {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// The bare file name, used for format inference and labels.
    pub fn file_name(&self) -> &str {
        match self {
            InputSource::Path(path) => path
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(path.as_str()),
            InputSource::Blob { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_paths_are_not_sources() {
        assert_eq!(InputSource::from_path(""), None);
        assert_eq!(InputSource::from_path("   "), None);
        assert_eq!(
            InputSource::from_path(" /tmp/out.prof "),
            Some(InputSource::Path("/tmp/out.prof".into()))
        );
    }

    #[test]
    fn file_name_strips_directories() {
        let unix = InputSource::Path("/var/tmp/app.pstats".into());
        assert_eq!(unix.file_name(), "app.pstats");
        let windows = InputSource::Path(r"C:\profiles\app.prof".into());
        assert_eq!(windows.file_name(), "app.prof");
        let blob = InputSource::from_bytes("upload.perf", vec![1, 2, 3]);
        assert_eq!(blob.file_name(), "upload.perf");
    }
}
