//! The affine view transform applied to the rendered graph.
//!
//! State is a scale plus a translation in container-local pixels. All
//! operations keep the scale inside [`MIN_SCALE`]..=[`MAX_SCALE`] and
//! degrade to no-ops on degenerate geometry instead of producing NaN.

use profgraph_protocol::{Point, Size};

pub const MIN_SCALE: f64 = 0.05;
pub const MAX_SCALE: f64 = 10.0;
/// One zoom step (wheel notch or toolbar button).
pub const ZOOM_FACTOR: f64 = 1.15;
/// Fit-to-view leaves a 5% margin around the content.
const FIT_MARGIN: f64 = 0.95;

/// Which mouse button a pointer-down carried. Only the primary button
/// starts a pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Classification of the element under a pointer-down. Text keeps native
/// selection working inside the rendered graph, so it never starts a pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Text,
    Other,
}

/// A pan in progress: the pointer position and translation captured at
/// pointer-down. Lives only while the pointer is held.
#[derive(Debug, Clone, Copy)]
struct PanSession {
    pointer_x: f64,
    pointer_y: f64,
    translate_x: f64,
    translate_y: f64,
}

#[derive(Debug, Clone)]
pub struct ViewportTransform {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
    pan: Option<PanSession>,
}

impl ViewportTransform {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            pan: None,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> (f64, f64) {
        (self.translate_x, self.translate_y)
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Zoom by `factor` keeping the container-local point `(cx, cy)`
    /// visually fixed: the anchor maps to the same pixel under the old
    /// and the new transform.
    pub fn zoom_at_point(&mut self, cx: f64, cy: f64, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;
        self.translate_x = cx - ratio * (cx - self.translate_x);
        self.translate_y = cy - ratio * (cy - self.translate_y);
        self.scale = new_scale;
    }

    /// One zoom step in, anchored at the container center.
    pub fn zoom_in(&mut self, container: Size) {
        self.zoom_at_point(container.width / 2.0, container.height / 2.0, ZOOM_FACTOR);
    }

    /// One zoom step out, anchored at the container center.
    pub fn zoom_out(&mut self, container: Size) {
        self.zoom_at_point(
            container.width / 2.0,
            container.height / 2.0,
            1.0 / ZOOM_FACTOR,
        );
    }

    /// Back to the identity transform.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.translate_x = 0.0;
        self.translate_y = 0.0;
    }

    /// Scale and center the content inside the container, with a 5% margin.
    ///
    /// `content_on_screen` is the content's size as currently displayed,
    /// i.e. measured after this transform was applied; dividing by the
    /// current scale recovers its native size. Degenerate sizes (content
    /// not mounted or not laid out yet) make this a no-op.
    pub fn fit_to_view(&mut self, container: Size, content_on_screen: Size) {
        if container.is_degenerate() || content_on_screen.is_degenerate() {
            return;
        }
        let width = content_on_screen.width / self.scale;
        let height = content_on_screen.height / self.scale;
        let scale_x = container.width / width;
        let scale_y = container.height / height;
        self.scale = (scale_x.min(scale_y) * FIT_MARGIN).clamp(MIN_SCALE, MAX_SCALE);
        self.translate_x = (container.width - width * self.scale) / 2.0;
        self.translate_y = (container.height - height * self.scale) / 2.0;
    }

    /// Start a pan session. Ignored unless the primary button went down on
    /// a non-text target.
    pub fn begin_pan(&mut self, button: PointerButton, target: PointerTarget, x: f64, y: f64) {
        if button != PointerButton::Primary || target == PointerTarget::Text {
            return;
        }
        self.pan = Some(PanSession {
            pointer_x: x,
            pointer_y: y,
            translate_x: self.translate_x,
            translate_y: self.translate_y,
        });
    }

    /// Move the view by the pointer delta since pan start. No-op without
    /// an active session.
    pub fn update_pan(&mut self, x: f64, y: f64) {
        let Some(pan) = self.pan else {
            return;
        };
        self.translate_x = pan.translate_x + (x - pan.pointer_x);
        self.translate_y = pan.translate_y + (y - pan.pointer_y);
    }

    /// End the pan session. Idempotent: pointer-up and pointer-cancel
    /// both land here.
    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    /// Map a content-local point to container-local pixels.
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.translate_x,
            point.y * self.scale + self.translate_y,
        )
    }

    /// The CSS transform string the display surface applies to the
    /// mounted content.
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at_point(200.0, 150.0, ZOOM_FACTOR);
        vp.update_pan(0.0, 0.0); // no session, must not disturb anything

        // The anchor in container coordinates corresponds to some content
        // point; that content point must land on the anchor again.
        let before = ViewportTransform::new();
        let content_x = (200.0 - before.translate().0) / before.scale();
        let content_y = (150.0 - before.translate().1) / before.scale();
        let mapped = vp.apply(Point::new(content_x, content_y));
        assert_close(mapped.x, 200.0);
        assert_close(mapped.y, 150.0);
    }

    #[test]
    fn zoom_numeric_example() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at_point(100.0, 100.0, 1.15);
        assert_close(vp.scale(), 1.15);
        let (tx, ty) = vp.translate();
        assert_close(tx, -15.0);
        assert_close(ty, -15.0);
    }

    #[test]
    fn zoom_anchor_fixed_from_arbitrary_state() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at_point(50.0, 80.0, 1.7);
        vp.begin_pan(PointerButton::Primary, PointerTarget::Other, 0.0, 0.0);
        vp.update_pan(33.0, -12.0);
        vp.end_pan();

        let anchor = Point::new(310.0, 40.0);
        let content_x = (anchor.x - vp.translate().0) / vp.scale();
        let content_y = (anchor.y - vp.translate().1) / vp.scale();
        vp.zoom_at_point(anchor.x, anchor.y, 1.0 / ZOOM_FACTOR);
        let mapped = vp.apply(Point::new(content_x, content_y));
        assert_close(mapped.x, anchor.x);
        assert_close(mapped.y, anchor.y);
    }

    #[test]
    fn scale_is_clamped() {
        let mut vp = ViewportTransform::new();
        for _ in 0..100 {
            vp.zoom_at_point(0.0, 0.0, ZOOM_FACTOR);
        }
        assert_close(vp.scale(), MAX_SCALE);
        for _ in 0..200 {
            vp.zoom_at_point(0.0, 0.0, 1.0 / ZOOM_FACTOR);
        }
        assert_close(vp.scale(), MIN_SCALE);
        // A huge single factor clamps too.
        vp.zoom_at_point(10.0, 10.0, 1e9);
        assert_close(vp.scale(), MAX_SCALE);
    }

    #[test]
    fn reset_restores_identity() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at_point(123.0, 45.0, 3.0);
        vp.begin_pan(PointerButton::Primary, PointerTarget::Other, 0.0, 0.0);
        vp.update_pan(100.0, 100.0);
        vp.reset();
        assert_close(vp.scale(), 1.0);
        assert_eq!(vp.translate(), (0.0, 0.0));
    }

    #[test]
    fn fit_centers_with_margin() {
        let mut vp = ViewportTransform::new();
        let container = Size::new(1000.0, 500.0);
        // Native 2000x500 content displayed at scale 1.
        vp.fit_to_view(container, Size::new(2000.0, 500.0));
        // Width is the limiting axis: 1000/2000 * 0.95
        assert_close(vp.scale(), 0.475);
        let (tx, ty) = vp.translate();
        assert_close(tx, (1000.0 - 2000.0 * 0.475) / 2.0);
        assert_close(ty, (500.0 - 500.0 * 0.475) / 2.0);
    }

    #[test]
    fn fit_is_idempotent() {
        let mut vp = ViewportTransform::new();
        let container = Size::new(800.0, 600.0);
        let native = Size::new(3000.0, 1200.0);
        vp.fit_to_view(container, native);
        let first = (vp.scale(), vp.translate());

        // Second fit measures the content as displayed by the first.
        let on_screen = Size::new(native.width * vp.scale(), native.height * vp.scale());
        vp.fit_to_view(container, on_screen);
        assert_close(vp.scale(), first.0);
        assert_close(vp.translate().0, first.1 .0);
        assert_close(vp.translate().1, first.1 .1);
    }

    #[test]
    fn fit_ignores_degenerate_geometry() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at_point(10.0, 10.0, 2.0);
        let before = (vp.scale(), vp.translate());
        vp.fit_to_view(Size::new(800.0, 600.0), Size::new(0.0, 400.0));
        vp.fit_to_view(Size::new(0.0, 600.0), Size::new(300.0, 400.0));
        assert_eq!((vp.scale(), vp.translate()), before);
    }

    #[test]
    fn fit_clamps_scale() {
        let mut vp = ViewportTransform::new();
        // Gigantic content: the unclamped fit scale would be below MIN_SCALE.
        vp.fit_to_view(Size::new(100.0, 100.0), Size::new(1e6, 1e6));
        assert_close(vp.scale(), MIN_SCALE);
    }

    #[test]
    fn pan_follows_pointer_delta() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at_point(0.0, 0.0, 2.0);
        let (tx0, ty0) = vp.translate();
        vp.begin_pan(PointerButton::Primary, PointerTarget::Other, 40.0, 60.0);
        vp.update_pan(55.0, 35.0);
        assert_eq!(vp.translate(), (tx0 + 15.0, ty0 - 25.0));
        // Deltas are relative to the anchor, not cumulative.
        vp.update_pan(40.0, 60.0);
        assert_eq!(vp.translate(), (tx0, ty0));
        vp.end_pan();
        assert!(!vp.is_panning());
        vp.end_pan(); // idempotent
    }

    #[test]
    fn pan_requires_primary_button_on_non_text() {
        let mut vp = ViewportTransform::new();
        vp.begin_pan(PointerButton::Secondary, PointerTarget::Other, 0.0, 0.0);
        assert!(!vp.is_panning());
        vp.begin_pan(PointerButton::Primary, PointerTarget::Text, 0.0, 0.0);
        assert!(!vp.is_panning());
        vp.update_pan(50.0, 50.0);
        assert_eq!(vp.translate(), (0.0, 0.0));
    }

    #[test]
    fn css_transform_string() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at_point(100.0, 100.0, 1.15);
        assert_eq!(
            vp.css_transform(),
            format!(
                "translate({}px, {}px) scale({})",
                vp.translate().0,
                vp.translate().1,
                vp.scale()
            )
        );
        assert_eq!(
            ViewportTransform::new().css_transform(),
            "translate(0px, 0px) scale(1)"
        );
    }
}
