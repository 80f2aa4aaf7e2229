//! SVG surface and document export.

use crate::canvas::RenderStyle;
use crate::pipeline::{render_elements, render_frame_elements, render_selection};
use crate::renderer::{RenderResult, RenderSurface, RendererError, StrokeParams};
use ::svg::Document;
use ::svg::Node;
use ::svg::node::element::{Ellipse, Path, Rectangle, Text};
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use sketchcollab_core::{DrawingEngine, Element, SerializableColor};

/// Side of the placeholder document written when there is nothing to draw.
const EMPTY_SIZE: f64 = 100.0;

/// Options for [`export_svg`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SvgExportOptions {
    /// Margin around the document bounds in world units.
    pub padding: f64,
    pub style: RenderStyle,
    /// Draw selection outlines as on the canvas.
    pub include_selection: bool,
}

impl Default for SvgExportOptions {
    fn default() -> Self {
        Self {
            padding: 20.0,
            style: RenderStyle::default(),
            include_selection: false,
        }
    }
}

impl SvgExportOptions {
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_selection(mut self, include_selection: bool) -> Self {
        self.include_selection = include_selection;
        self
    }
}

/// Markup for a document with nothing to draw: an empty 100x100 canvas.
pub fn empty_svg() -> String {
    Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set("width", num(EMPTY_SIZE))
        .set("height", num(EMPTY_SIZE))
        .to_string()
}

/// Render the document as a standalone SVG.
///
/// Elements go through the same pipeline as the canvas, so the export
/// matches what is drawn on screen.
pub fn export_svg(engine: &DrawingEngine, options: &SvgExportOptions) -> RenderResult<String> {
    if !(options.padding >= 0.0 && options.padding.is_finite()) {
        return Err(RendererError::InvalidOptions(format!(
            "padding must be a non-negative number, got {}",
            options.padding
        )));
    }
    let Some(bounds) = engine.bounds() else {
        return Ok(empty_svg());
    };
    let view_box = padded_view_box(bounds, options.padding)?;

    let mut surface = SvgSurface::new(view_box);
    surface.clear(options.style.background.into());
    render_elements(&mut surface, engine.elements(), &options.style);
    if options.include_selection {
        render_selection(&mut surface, engine, &options.style, 1.0);
    }
    log::debug!("Exported {} elements to SVG", engine.len());
    Ok(surface.finish())
}

/// Render one animation frame into a fixed view box.
///
/// Elements are drawn in the order given, matching the canvas frame pass.
/// Use [`frame_view_box`] once per timeline so every frame shares a frame
/// of reference.
pub fn export_frame_svg(
    elements: &[Element],
    view_box: Option<Rect>,
    style: &RenderStyle,
) -> RenderResult<String> {
    let Some(view_box) = view_box else {
        return Ok(empty_svg());
    };
    let mut surface = SvgSurface::new(view_box);
    surface.clear(style.background.into());
    render_frame_elements(&mut surface, elements, style);
    Ok(surface.finish())
}

/// The view box of the finished document, shared by all frames.
pub fn frame_view_box(engine: &DrawingEngine, padding: f64) -> RenderResult<Option<Rect>> {
    engine
        .bounds()
        .map(|bounds| padded_view_box(bounds, padding))
        .transpose()
}

fn padded_view_box(bounds: Rect, padding: f64) -> RenderResult<Rect> {
    let view_box = bounds.inflate(padding, padding);
    if !view_box.is_finite() {
        return Err(RendererError::RenderFailed(format!(
            "document bounds are not finite: {bounds:?}"
        )));
    }
    Ok(view_box)
}

#[derive(Debug, Clone, Copy)]
struct SurfaceState {
    transform: Affine,
    alpha: f64,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// Builds an [`svg::Document`](::svg::Document) from surface calls.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    view_box: Rect,
    document: Document,
    state: SurfaceState,
    stack: Vec<SurfaceState>,
}

impl SvgSurface {
    /// A surface whose viewBox and size are `view_box`.
    pub fn new(view_box: Rect) -> Self {
        Self {
            view_box,
            document: Self::blank(view_box),
            state: SurfaceState::default(),
            stack: Vec::new(),
        }
    }

    fn blank(view_box: Rect) -> Document {
        let (x, y, w, h) = (
            num(view_box.x0),
            num(view_box.y0),
            num(view_box.width()),
            num(view_box.height()),
        );
        Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("width", w.as_str())
            .set("height", h.as_str())
            .set("viewBox", format!("{x} {y} {w} {h}"))
    }

    pub fn view_box(&self) -> Rect {
        self.view_box
    }

    /// Close the document and return the markup.
    pub fn finish(self) -> String {
        self.document.to_string()
    }

    /// Append `node` with the current transform and opacity applied.
    fn push<T: Node + 'static>(&mut self, mut node: T) {
        if self.state.transform != Affine::IDENTITY {
            let coeffs = self.state.transform.as_coeffs().map(num);
            node.assign("transform", format!("matrix({})", coeffs.join(" ")));
        }
        if self.state.alpha < 1.0 {
            node.assign("opacity", num(self.state.alpha.max(0.0)));
        }
        self.document.append(node);
    }
}

/// Shortest decimal form with at most three fractional digits.
fn num(value: f64) -> String {
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Paint `color` into `attr` (`fill` or `stroke`), adding `<attr>-opacity`
/// when translucent.
fn paint<T: Node>(node: &mut T, attr: &str, color: Color) {
    let color = SerializableColor::from(color);
    let opaque = SerializableColor::new(color.r, color.g, color.b, 255);
    node.assign(attr, opaque.to_string());
    if color.a != 255 {
        node.assign(format!("{attr}-opacity"), num(color.alpha()));
    }
}

fn filled<T: Node>(mut node: T, color: Color) -> T {
    paint(&mut node, "fill", color);
    node
}

fn stroked<T: Node>(mut node: T, params: &StrokeParams) -> T {
    let stroke = &params.stroke;
    paint(&mut node, "stroke", params.color);
    node.assign("stroke-width", num(stroke.width));
    node.assign("fill", "none");
    match stroke.start_cap {
        Cap::Round => node.assign("stroke-linecap", "round"),
        Cap::Square => node.assign("stroke-linecap", "square"),
        Cap::Butt => {}
    }
    match stroke.join {
        Join::Round => node.assign("stroke-linejoin", "round"),
        Join::Bevel => node.assign("stroke-linejoin", "bevel"),
        Join::Miter => {}
    }
    if !stroke.dash_pattern.is_empty() {
        let dashes: Vec<String> = stroke.dash_pattern.iter().map(|d| num(*d)).collect();
        node.assign("stroke-dasharray", dashes.join(" "));
    }
    node
}

fn rectangle(rect: Rect) -> Rectangle {
    Rectangle::new()
        .set("x", num(rect.x0))
        .set("y", num(rect.y0))
        .set("width", num(rect.width()))
        .set("height", num(rect.height()))
}

fn ellipse(rect: Rect) -> Ellipse {
    let center = rect.center();
    Ellipse::new()
        .set("cx", num(center.x))
        .set("cy", num(center.y))
        .set("rx", num(rect.width() / 2.0))
        .set("ry", num(rect.height() / 2.0))
}

impl RenderSurface for SvgSurface {
    fn clear(&mut self, color: Color) {
        self.document = Self::blank(self.view_box);
        self.document.append(filled(rectangle(self.view_box), color));
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform = self.state.transform * affine;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(filled(rectangle(rect), color));
    }

    fn stroke_rect(&mut self, rect: Rect, params: &StrokeParams) {
        self.push(stroked(rectangle(rect), params));
    }

    fn fill_ellipse(&mut self, rect: Rect, color: Color) {
        self.push(filled(ellipse(rect), color));
    }

    fn stroke_ellipse(&mut self, rect: Rect, params: &StrokeParams) {
        self.push(stroked(ellipse(rect), params));
    }

    fn stroke_path(&mut self, path: &BezPath, params: &StrokeParams) {
        if path.elements().is_empty() {
            return;
        }
        self.push(stroked(Path::new().set("d", path.to_svg()), params));
    }

    fn fill_text(&mut self, origin: Point, text: &str, font_size: f64, color: Color) {
        let node = Text::new(text)
            .set("x", num(origin.x))
            .set("y", num(origin.y))
            .set("font-size", num(font_size))
            .set("font-family", "Arial, sans-serif")
            .set("dominant-baseline", "hanging");
        self.push(filled(node, color));
    }
}
