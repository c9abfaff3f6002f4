//! Paints the canvas: the transformed bounds of the mounted graph, or the
//! welcome placeholder.
//!
//! The SVG markup itself is rasterized by the display surface of the
//! deployment (the browser page mounts it into the DOM); this egui canvas
//! shows where the graph sits under the current transform.

use eframe::egui;
use profgraph_core::session::MountedGraph;
use profgraph_core::viewport::ViewportTransform;

pub fn paint_graph(
    painter: &egui::Painter,
    canvas: egui::Rect,
    mounted: &MountedGraph,
    viewport: &ViewportTransform,
    source_name: Option<&str>,
) {
    painter.rect_filled(canvas, egui::CornerRadius::ZERO, egui::Color32::from_gray(24));

    let scale = viewport.scale() as f32;
    let (tx, ty) = viewport.translate();
    let min = canvas.min + egui::vec2(tx as f32, ty as f32);
    let size = egui::vec2(mounted.width as f32 * scale, mounted.height as f32 * scale);
    let graph_rect = egui::Rect::from_min_size(min, size);

    painter.rect_filled(graph_rect, egui::CornerRadius::same(2), egui::Color32::from_gray(245));
    painter.rect_stroke(
        graph_rect,
        egui::CornerRadius::same(2),
        egui::Stroke::new(1.0, egui::Color32::from_gray(96)),
        egui::StrokeKind::Outside,
    );

    let label = match source_name {
        Some(name) => format!("{name} — {:.0}×{:.0}", mounted.width, mounted.height),
        None => format!("{:.0}×{:.0}", mounted.width, mounted.height),
    };
    painter.text(
        graph_rect.center(),
        egui::Align2::CENTER_CENTER,
        label,
        egui::FontId::proportional((12.0 * scale).clamp(8.0, 48.0)),
        egui::Color32::from_gray(40),
    );
}

pub fn paint_placeholder(painter: &egui::Painter, canvas: egui::Rect) {
    painter.rect_filled(canvas, egui::CornerRadius::ZERO, egui::Color32::from_gray(24));
    painter.text(
        canvas.center(),
        egui::Align2::CENTER_CENTER,
        "Select a profile file — the rendered call graph appears here",
        egui::FontId::proportional(14.0),
        egui::Color32::from_gray(140),
    );
}
