//! A surface that records draw calls for later replay or inspection.

use crate::renderer::{RenderSurface, StrokeParams};
use kurbo::{Affine, BezPath, Cap, Point, Rect};
use peniko::Color;
use sketchcollab_core::SerializableColor;

/// Stroke paint and geometry as recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStroke {
    pub color: SerializableColor,
    pub width: f64,
    /// Dash pattern; empty for solid strokes.
    pub dashes: Vec<f64>,
    /// Round caps and joins.
    pub round: bool,
}

impl From<&StrokeParams> for RecordedStroke {
    fn from(params: &StrokeParams) -> Self {
        Self {
            color: params.color.into(),
            width: params.stroke.width,
            dashes: params.stroke.dash_pattern.to_vec(),
            round: params.stroke.start_cap == Cap::Round,
        }
    }
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(SerializableColor),
    Save,
    Restore,
    Transform([f64; 6]),
    SetAlpha(f64),
    FillRect {
        rect: Rect,
        color: SerializableColor,
    },
    StrokeRect {
        rect: Rect,
        stroke: RecordedStroke,
    },
    FillEllipse {
        rect: Rect,
        color: SerializableColor,
    },
    StrokeEllipse {
        rect: Rect,
        stroke: RecordedStroke,
    },
    StrokePath {
        path: BezPath,
        stroke: RecordedStroke,
    },
    FillText {
        origin: Point,
        text: String,
        font_size: f64,
        color: SerializableColor,
    },
}

/// Records every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the surface empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn count_where(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    /// Replay the recorded commands onto another surface.
    pub fn replay(&self, target: &mut dyn RenderSurface) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => target.clear((*color).into()),
                DrawCommand::Save => target.save(),
                DrawCommand::Restore => target.restore(),
                DrawCommand::Transform(coeffs) => target.transform(Affine::new(*coeffs)),
                DrawCommand::SetAlpha(alpha) => target.set_alpha(*alpha),
                DrawCommand::FillRect { rect, color } => target.fill_rect(*rect, (*color).into()),
                DrawCommand::StrokeRect { rect, stroke } => {
                    target.stroke_rect(*rect, &replay_stroke(stroke))
                }
                DrawCommand::FillEllipse { rect, color } => {
                    target.fill_ellipse(*rect, (*color).into())
                }
                DrawCommand::StrokeEllipse { rect, stroke } => {
                    target.stroke_ellipse(*rect, &replay_stroke(stroke))
                }
                DrawCommand::StrokePath { path, stroke } => {
                    target.stroke_path(path, &replay_stroke(stroke))
                }
                DrawCommand::FillText {
                    origin,
                    text,
                    font_size,
                    color,
                } => target.fill_text(*origin, text, *font_size, (*color).into()),
            }
        }
    }
}

fn replay_stroke(recorded: &RecordedStroke) -> StrokeParams {
    let mut params = StrokeParams::new(recorded.color, recorded.width);
    if recorded.round {
        params = params.round();
    }
    if !recorded.dashes.is_empty() {
        params.stroke = params.stroke.with_dashes(0.0, recorded.dashes.iter().copied());
    }
    params
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color.into()));
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn transform(&mut self, affine: Affine) {
        self.commands.push(DrawCommand::Transform(affine.as_coeffs()));
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.commands.push(DrawCommand::SetAlpha(alpha));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: color.into(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, params: &StrokeParams) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            stroke: params.into(),
        });
    }

    fn fill_ellipse(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillEllipse {
            rect,
            color: color.into(),
        });
    }

    fn stroke_ellipse(&mut self, rect: Rect, params: &StrokeParams) {
        self.commands.push(DrawCommand::StrokeEllipse {
            rect,
            stroke: params.into(),
        });
    }

    fn stroke_path(&mut self, path: &BezPath, params: &StrokeParams) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            stroke: params.into(),
        });
    }

    fn fill_text(&mut self, origin: Point, text: &str, font_size: f64, color: Color) {
        self.commands.push(DrawCommand::FillText {
            origin,
            text: text.to_string(),
            font_size,
            color: color.into(),
        });
    }
}
