use serde::{Deserialize, Serialize};

/// JSON body of a generate response.
///
/// The endpoint always returns both fields; a non-empty `error` means the
/// conversion failed (it also comes with a 4xx status, but error bodies of
/// failed requests parse into the same shape).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub svg: String,
    #[serde(default)]
    pub error: String,
}

impl GenerateResponse {
    /// Split into the SVG markup or the server's error message.
    pub fn into_result(self) -> Result<String, String> {
        if self.error.is_empty() {
            Ok(self.svg)
        } else {
            Err(self.error)
        }
    }
}
