//! SketchCollab Render Library
//!
//! Draws a SketchCollab document through the [`RenderSurface`] abstraction.
//! Ships a recording surface for hosts that replay draw commands and an SVG
//! surface used for export.

mod canvas;
mod export;
mod pipeline;
mod recording;
mod renderer;

pub use canvas::{CanvasRenderer, GRID_MAX_SPACING, GRID_MIN_SPACING, RenderStyle, grid_spacing};
pub use pipeline::{
    RenderDocument, render_element, render_elements, render_frame_elements, render_selection,
};
pub use recording::{DrawCommand, RecordedStroke, RecordingSurface};
pub use renderer::{GridStyle, RenderResult, RenderSurface, RendererError, StrokeParams};
pub use export::{
    SvgExportOptions, SvgSurface, empty_svg, export_frame_svg, export_svg, frame_view_box,
};
