//! Draws elements onto a [`RenderSurface`].

use crate::canvas::RenderStyle;
use crate::renderer::{RenderSurface, StrokeParams};
use kurbo::BezPath;
use sketchcollab_core::elements::{BoxShape, Freedraw, Group, Text};
use sketchcollab_core::{DrawingEngine, Element, ElementKind, SerializableColor};

/// Stroke width for freehand strokes without one.
const DEFAULT_FREEDRAW_WIDTH: f64 = 2.0;
/// Stroke width for lines and arrows without one.
const DEFAULT_LINE_WIDTH: f64 = 1.0;
/// Gap between an element's bounds and its selection outline.
const SELECTION_PADDING: f64 = 5.0;
const SELECTION_WIDTH: f64 = 2.0;
const SELECTION_DASH: f64 = 5.0;

/// Something that can draw itself onto a surface.
pub trait RenderDocument {
    /// Draw at the given view scale; scale-dependent decorations stay
    /// constant on screen.
    fn render(&self, surface: &mut dyn RenderSurface, style: &RenderStyle, scale: f64);
}

impl RenderDocument for DrawingEngine {
    fn render(&self, surface: &mut dyn RenderSurface, style: &RenderStyle, scale: f64) {
        render_elements(surface, self.elements(), style);
        render_selection(surface, self, style, scale);
    }
}

/// Draw elements by ascending z-order, ties in slice order.
pub fn render_elements(surface: &mut dyn RenderSurface, elements: &[Element], style: &RenderStyle) {
    let mut sorted: Vec<&Element> = elements.iter().collect();
    sorted.sort_by_key(|e| e.z());
    for element in sorted {
        render_element(surface, element, style);
    }
}

/// Draw the elements of an animation frame in the order given.
pub fn render_frame_elements(
    surface: &mut dyn RenderSurface,
    elements: &[Element],
    style: &RenderStyle,
) {
    for element in elements {
        render_element(surface, element, style);
    }
}

/// Draw one element inside its own save scope.
pub fn render_element(surface: &mut dyn RenderSurface, element: &Element, style: &RenderStyle) {
    surface.save();
    if let Some(opacity) = element.opacity {
        surface.set_alpha(opacity);
    }
    match &element.kind {
        ElementKind::Freedraw(stroke) => render_freedraw(surface, element, stroke, style),
        ElementKind::Rectangle(shape) => render_rectangle(surface, element, shape),
        ElementKind::Ellipse(shape) => render_ellipse(surface, element, shape),
        ElementKind::Line(shape) => render_line(surface, element, shape, style),
        ElementKind::Arrow(shape) => render_arrow(surface, element, shape, style),
        ElementKind::Text(text) => render_text(surface, element, text, style),
        ElementKind::Group(group) => render_group(surface, group, style),
    }
    surface.restore();
}

/// Dashed outline around every selected element that is still present.
pub fn render_selection(
    surface: &mut dyn RenderSurface,
    engine: &DrawingEngine,
    style: &RenderStyle,
    scale: f64,
) {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    let params = StrokeParams::new(style.selection_color, SELECTION_WIDTH / scale)
        .dashed(SELECTION_DASH / scale);
    for id in engine.selection() {
        let Some(bounds) = engine.element(id).and_then(Element::bounds) else {
            continue;
        };
        surface.stroke_rect(bounds.inflate(SELECTION_PADDING, SELECTION_PADDING), &params);
    }
}

fn stroke_color(element: &Element, style: &RenderStyle) -> SerializableColor {
    element.stroke_color.unwrap_or(style.default_stroke)
}

/// Width when set and non-zero, else `default`.
fn stroke_width_or(element: &Element, default: f64) -> f64 {
    match element.stroke_width {
        Some(width) if width != 0.0 => width,
        _ => default,
    }
}

/// Outline paint for closed shapes: only when a color and a positive width are set.
fn outline(element: &Element) -> Option<StrokeParams> {
    match (element.stroke_color, element.stroke_width) {
        (Some(color), Some(width)) if width > 0.0 => Some(StrokeParams::new(color, width)),
        _ => None,
    }
}

fn render_freedraw(
    surface: &mut dyn RenderSurface,
    element: &Element,
    stroke: &Freedraw,
    style: &RenderStyle,
) {
    if stroke.len() < 2 {
        return;
    }
    let color = stroke_color(element, style);
    let fallback = stroke_width_or(element, DEFAULT_FREEDRAW_WIDTH);

    if stroke.has_variable_width() {
        for pair in stroke.points.windows(2) {
            let width = match pair[0].width {
                Some(width) if width != 0.0 => width,
                _ => fallback,
            };
            let mut segment = BezPath::new();
            segment.move_to(pair[0].position());
            segment.line_to(pair[1].position());
            surface.stroke_path(&segment, &StrokeParams::new(color, width).round());
        }
    } else {
        surface.stroke_path(&stroke.to_path(), &StrokeParams::new(color, fallback).round());
    }
}

fn render_rectangle(surface: &mut dyn RenderSurface, element: &Element, shape: &BoxShape) {
    let rect = shape.bounds();
    if let Some(fill) = element.background_color.and_then(|f| f.color()) {
        surface.fill_rect(rect, fill.into());
    }
    if let Some(params) = outline(element) {
        surface.stroke_rect(rect, &params);
    }
}

fn render_ellipse(surface: &mut dyn RenderSurface, element: &Element, shape: &BoxShape) {
    let rect = shape.bounds();
    if let Some(fill) = element.background_color.and_then(|f| f.color()) {
        surface.fill_ellipse(rect, fill.into());
    }
    if let Some(params) = outline(element) {
        surface.stroke_ellipse(rect, &params);
    }
}

fn line_params(element: &Element, style: &RenderStyle) -> StrokeParams {
    StrokeParams::new(
        stroke_color(element, style),
        stroke_width_or(element, DEFAULT_LINE_WIDTH),
    )
}

fn render_line(
    surface: &mut dyn RenderSurface,
    element: &Element,
    shape: &BoxShape,
    style: &RenderStyle,
) {
    let mut path = BezPath::new();
    path.move_to(shape.start());
    path.line_to(shape.end());
    surface.stroke_path(&path, &line_params(element, style));
}

fn render_arrow(
    surface: &mut dyn RenderSurface,
    element: &Element,
    shape: &BoxShape,
    style: &RenderStyle,
) {
    let params = line_params(element, style);
    let mut shaft = BezPath::new();
    shaft.move_to(shape.start());
    shaft.line_to(shape.end());
    surface.stroke_path(&shaft, &params);

    let mut head = BezPath::new();
    for wing in shape.arrow_head() {
        head.move_to(wing.p0);
        head.line_to(wing.p1);
    }
    surface.stroke_path(&head, &params);
}

fn render_text(surface: &mut dyn RenderSurface, element: &Element, text: &Text, style: &RenderStyle) {
    surface.fill_text(
        text.anchor(),
        &text.text,
        text.font_size,
        stroke_color(element, style).into(),
    );
}

fn render_group(surface: &mut dyn RenderSurface, group: &Group, style: &RenderStyle) {
    render_elements(surface, group.members(), style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingSurface};
    use kurbo::{PathEl, Point, Rect};
    use sketchcollab_core::{Fill, StrokePoint};

    fn record(element: &Element) -> Vec<DrawCommand> {
        let mut surface = RecordingSurface::new();
        render_element(&mut surface, element, &RenderStyle::default());
        surface.take_commands()
    }

    fn drawing(commands: &[DrawCommand]) -> Vec<&DrawCommand> {
        commands
            .iter()
            .filter(|c| {
                !matches!(
                    c,
                    DrawCommand::Save | DrawCommand::Restore | DrawCommand::SetAlpha(_)
                )
            })
            .collect()
    }

    #[test]
    fn test_opacity_scope() {
        let element = Element::line(0.0, 0.0, 10.0, 0.0).with_opacity(0.25);
        let commands = record(&element);
        assert_eq!(commands[0], DrawCommand::Save);
        assert_eq!(commands[1], DrawCommand::SetAlpha(0.25));
        assert_eq!(commands.last(), Some(&DrawCommand::Restore));

        let opaque = record(&Element::line(0.0, 0.0, 10.0, 0.0));
        assert!(!opaque.iter().any(|c| matches!(c, DrawCommand::SetAlpha(_))));
    }

    #[test]
    fn test_uniform_freedraw_is_one_polyline() {
        let element = Element::freedraw(vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(10.0, 0.0),
            StrokePoint::new(10.0, 10.0),
        ]);
        let commands = record(&element);
        let drawn = drawing(&commands);
        assert_eq!(drawn.len(), 1);
        let DrawCommand::StrokePath { path, stroke } = drawn[0] else {
            panic!("expected a path");
        };
        assert_eq!(path.elements().len(), 3);
        assert_eq!(stroke.width, DEFAULT_FREEDRAW_WIDTH);
        assert!(stroke.round);
        assert_eq!(stroke.color, SerializableColor::white());
    }

    #[test]
    fn test_variable_width_freedraw_segments() {
        let element = Element::freedraw(vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(10.0, 0.0).with_pressure(0.5, 3.0),
            StrokePoint::new(20.0, 0.0).with_pressure(1.0, 4.0),
        ])
        .with_stroke(SerializableColor::black(), 6.0);
        let commands = record(&element);
        let widths: Vec<f64> = drawing(&commands)
            .iter()
            .map(|c| match c {
                DrawCommand::StrokePath { stroke, .. } => stroke.width,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        // First segment starts at a bare point and falls back to the element width.
        assert_eq!(widths, vec![6.0, 3.0]);
    }

    #[test]
    fn test_short_freedraw_draws_nothing() {
        let element = Element::freedraw(vec![StrokePoint::new(0.0, 0.0)]);
        assert!(drawing(&record(&element)).is_empty());
    }

    #[test]
    fn test_rectangle_fill_and_stroke() {
        let element = Element::rectangle(10.0, 10.0, -5.0, 5.0)
            .with_fill(Fill::Color(SerializableColor::black()))
            .with_stroke(SerializableColor::white(), 2.0);
        let commands = record(&element);
        let drawn = drawing(&commands);
        let rect = Rect::new(5.0, 10.0, 10.0, 15.0);
        assert_eq!(
            drawn[0],
            &DrawCommand::FillRect {
                rect,
                color: SerializableColor::black()
            }
        );
        assert!(matches!(drawn[1], DrawCommand::StrokeRect { rect: r, .. } if *r == rect));
    }

    #[test]
    fn test_closed_shape_needs_stroke_color_and_width() {
        let no_width = Element::ellipse(0.0, 0.0, 10.0, 10.0).with_fill(Fill::Transparent);
        assert!(drawing(&record(&no_width)).is_empty());

        let zero_width =
            Element::ellipse(0.0, 0.0, 10.0, 10.0).with_stroke(SerializableColor::white(), 0.0);
        assert!(drawing(&record(&zero_width)).is_empty());

        let stroked =
            Element::ellipse(0.0, 0.0, 10.0, 10.0).with_stroke(SerializableColor::white(), 1.0);
        assert!(matches!(
            drawing(&record(&stroked))[..],
            [DrawCommand::StrokeEllipse { .. }]
        ));
    }

    #[test]
    fn test_line_defaults() {
        let commands = record(&Element::line(0.0, 0.0, 3.0, 4.0));
        let DrawCommand::StrokePath { path, stroke } = drawing(&commands)[0] else {
            panic!("expected a path");
        };
        assert_eq!(stroke.width, DEFAULT_LINE_WIDTH);
        assert_eq!(stroke.color, SerializableColor::white());
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(3.0, 4.0))
            ]
        );
    }

    #[test]
    fn test_arrow_shaft_then_head() {
        let commands = record(&Element::arrow(0.0, 0.0, 100.0, 0.0));
        let drawn = drawing(&commands);
        assert_eq!(drawn.len(), 2);
        let DrawCommand::StrokePath { path, .. } = drawn[1] else {
            panic!("expected the head path");
        };
        // Two wings, each a move plus a line from the tip.
        assert_eq!(path.elements().len(), 4);
        assert_eq!(path.elements()[0], PathEl::MoveTo(Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_text_at_anchor() {
        let element = Element::text(3.0, 4.0, "hello");
        let commands = record(&element);
        assert_eq!(
            drawing(&commands)[0],
            &DrawCommand::FillText {
                origin: Point::new(3.0, 4.0),
                text: "hello".to_string(),
                font_size: 16.0,
                color: SerializableColor::white(),
            }
        );
    }

    #[test]
    fn test_elements_drawn_by_z() {
        let elements = vec![
            Element::text(0.0, 0.0, "top").with_z_index(2),
            Element::text(0.0, 0.0, "bottom").with_z_index(0),
            Element::text(0.0, 0.0, "middle").with_z_index(1),
        ];
        let mut surface = RecordingSurface::new();
        render_elements(&mut surface, &elements, &RenderStyle::default());
        let order: Vec<&str> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["bottom", "middle", "top"]);
    }

    #[test]
    fn test_group_draws_members() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(Element::text(0.0, 0.0, "a"));
        let b = engine.add_element(Element::text(10.0, 10.0, "b"));
        engine.select_element(&a);
        engine.select_element(&b);
        engine.group_selected_elements().unwrap();
        engine.clear_selection();

        let mut surface = RecordingSurface::new();
        engine.render(&mut surface, &RenderStyle::default(), 1.0);
        assert_eq!(surface.count_where(|c| matches!(c, DrawCommand::FillText { .. })), 2);
    }

    #[test]
    fn test_selection_outline_scaled() {
        let mut engine = DrawingEngine::new();
        let id = engine.add_element(Element::rectangle(0.0, 0.0, 10.0, 20.0));
        engine.select_element(&id);

        let mut surface = RecordingSurface::new();
        render_selection(&mut surface, &engine, &RenderStyle::default(), 2.0);
        let DrawCommand::StrokeRect { rect, stroke } = &surface.commands()[0] else {
            panic!("expected a selection rect");
        };
        assert_eq!(*rect, Rect::new(-5.0, -5.0, 15.0, 25.0));
        assert_eq!(stroke.width, 1.0);
        assert_eq!(stroke.dashes, vec![2.5, 2.5]);
        assert_eq!(stroke.color, SerializableColor::new(0x00, 0x7b, 0xff, 255));
    }
}
