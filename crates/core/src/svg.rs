//! Minimal inspection of the server-rendered SVG markup.
//!
//! The client never rasterizes the graph; that is the display surface's
//! job. It only needs to confirm the payload really is an SVG document
//! and recover the native width/height so fit-to-view has a content size.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SvgError {
    /// The payload's root element is not `<svg>` (or there is no element
    /// at all).
    #[error("document root is not an svg element")]
    NotSvg,
    #[error("{0}")]
    Malformed(String),
}

/// Native dimensions of an SVG document, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgInfo {
    pub width: f64,
    pub height: f64,
}

impl SvgInfo {
    /// Inspect `markup`: skip prolog/doctype/comments, require an `<svg>`
    /// root, and read its size from `width`/`height` attributes (graphviz
    /// emits both, in points) or the `viewBox` as a fallback.
    pub fn parse(markup: &str) -> Result<SvgInfo, SvgError> {
        let tag = root_tag(markup)?;
        if !tag.name.eq_ignore_ascii_case("svg") {
            return Err(SvgError::NotSvg);
        }

        let width = attribute(tag.attrs, "width").and_then(parse_length);
        let height = attribute(tag.attrs, "height").and_then(parse_length);
        if let (Some(width), Some(height)) = (width, height) {
            return Self::checked(width, height);
        }

        if let Some(view_box) = attribute(tag.attrs, "viewBox") {
            let mut parts = view_box.split_ascii_whitespace().skip(2);
            let width = parts.next().and_then(|v| v.parse::<f64>().ok());
            let height = parts.next().and_then(|v| v.parse::<f64>().ok());
            if let (Some(width), Some(height)) = (width, height) {
                return Self::checked(width, height);
            }
        }

        Err(SvgError::Malformed(
            "svg element has no usable width/height or viewBox".into(),
        ))
    }

    fn checked(width: f64, height: f64) -> Result<SvgInfo, SvgError> {
        if width > 0.0 && height > 0.0 {
            Ok(SvgInfo { width, height })
        } else {
            Err(SvgError::Malformed(format!(
                "non-positive dimensions {width}x{height}"
            )))
        }
    }
}

struct RootTag<'a> {
    name: &'a str,
    attrs: &'a str,
}

/// Find the first real element tag, skipping `<?...?>`, `<!DOCTYPE ...>`
/// and comments.
fn root_tag(markup: &str) -> Result<RootTag<'_>, SvgError> {
    let mut rest = markup;
    loop {
        let start = rest.find('<').ok_or(SvgError::NotSvg)?;
        let tail = &rest[start + 1..];
        if let Some(after) = tail.strip_prefix('?') {
            let end = after
                .find("?>")
                .ok_or_else(|| SvgError::Malformed("unterminated processing instruction".into()))?;
            rest = &after[end + 2..];
        } else if let Some(after) = tail.strip_prefix("!--") {
            let end = after
                .find("-->")
                .ok_or_else(|| SvgError::Malformed("unterminated comment".into()))?;
            rest = &after[end + 3..];
        } else if let Some(after) = tail.strip_prefix('!') {
            let end = after
                .find('>')
                .ok_or_else(|| SvgError::Malformed("unterminated doctype".into()))?;
            rest = &after[end + 1..];
        } else {
            let end = tail
                .find('>')
                .ok_or_else(|| SvgError::Malformed("unterminated root tag".into()))?;
            let inside = tail[..end].trim_end_matches('/');
            let name_end = inside
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(inside.len());
            return Ok(RootTag {
                name: &inside[..name_end],
                attrs: &inside[name_end..],
            });
        }
    }
}

/// Pull a `name="value"` attribute out of a tag body.
fn attribute<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = attrs;
    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let quote = after.chars().next()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        let value_end = after[1..].find(quote)?;
        let value = &after[1..1 + value_end];
        if key == name {
            return Some(value);
        }
        rest = &after[1 + value_end + 1..];
    }
    None
}

/// Parse a length attribute. Graphviz writes points (`242pt`); CSS pixels
/// and bare numbers pass through, points convert at 96/72.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(pt) = value.strip_suffix("pt") {
        return pt.trim().parse::<f64>().ok().map(|v| v * 96.0 / 72.0);
    }
    let number = value.strip_suffix("px").unwrap_or(value);
    number.trim().parse::<f64>().ok()
}
