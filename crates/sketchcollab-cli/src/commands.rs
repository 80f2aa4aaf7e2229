//! Subcommand implementations.

use anyhow::{Context as _, ensure};
use sketchcollab_core::animation::calculate_duration;
use sketchcollab_core::storage::SceneRecord;
use sketchcollab_core::{DrawingEngine, FileStorage, FrameSampler, Scene, SceneStorage, SceneSummary};
use sketchcollab_render::{RenderStyle, SvgExportOptions, export_frame_svg, frame_view_box};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Padding around animation frames, in world units.
const FRAME_PADDING: f64 = 20.0;
/// Highest accepted frame rate for `frames`.
pub const MAX_FPS: f64 = 240.0;

pub fn read_scene(path: &Path) -> anyhow::Result<Scene> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read scene '{}'", path.display()))?;
    Scene::from_json(&json).with_context(|| format!("parse scene '{}'", path.display()))
}

/// Load a scene file into a fresh document.
pub fn load_engine(path: &Path) -> anyhow::Result<DrawingEngine> {
    let mut engine = DrawingEngine::new();
    read_scene(path)?.load_into(&mut engine);
    Ok(engine)
}

/// The render style from a JSON file, or the default style.
pub fn load_style(path: Option<&Path>) -> anyhow::Result<RenderStyle> {
    let Some(path) = path else {
        return Ok(RenderStyle::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read style '{}'", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parse style '{}'", path.display()))
}

fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write '{}'", path.display()))
}

/// Summary printed by `info`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInfo {
    pub elements: usize,
    pub by_type: BTreeMap<&'static str, usize>,
    pub bounds: Option<kurbo::Rect>,
    pub duration_ms: f64,
}

impl fmt::Display for SceneInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "elements: {}", self.elements)?;
        for (name, count) in &self.by_type {
            writeln!(f, "  {name}: {count}")?;
        }
        match self.bounds {
            Some(b) => writeln!(
                f,
                "bounds: {} {} {} x {}",
                b.x0,
                b.y0,
                b.width(),
                b.height()
            )?,
            None => writeln!(f, "bounds: none")?,
        }
        write!(f, "animation: {} ms", self.duration_ms)
    }
}

pub fn scene_info(path: &Path) -> anyhow::Result<SceneInfo> {
    let engine = load_engine(path)?;
    let mut by_type = BTreeMap::new();
    for element in engine.elements() {
        *by_type.entry(element.element_type().name()).or_insert(0) += 1;
    }
    Ok(SceneInfo {
        elements: engine.len(),
        by_type,
        bounds: engine.bounds(),
        duration_ms: calculate_duration(engine.elements()),
    })
}

pub fn export_svg(
    in_path: &Path,
    out_path: &Path,
    style: RenderStyle,
    padding: f64,
) -> anyhow::Result<()> {
    let engine = load_engine(in_path)?;
    let options = SvgExportOptions::default()
        .with_style(style)
        .with_padding(padding);
    let svg = sketchcollab_render::export_svg(&engine, &options)?;
    write_output(out_path, &svg)
}

/// Write one SVG per sampled frame; returns the number written.
pub fn write_frames(
    in_path: &Path,
    out_dir: &Path,
    fps: f64,
    style: &RenderStyle,
) -> anyhow::Result<usize> {
    ensure!(
        fps > 0.0 && fps <= MAX_FPS,
        "fps must be in (0, {MAX_FPS}], got {fps}"
    );
    let engine = load_engine(in_path)?;
    let view_box = frame_view_box(&engine, FRAME_PADDING)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

    let sampler = FrameSampler::new(engine.elements(), fps);
    log::info!(
        "Sampling {} frames over {} ms at {fps} fps",
        sampler.frame_count(),
        sampler.duration()
    );
    let mut written = 0;
    for frame in sampler {
        let svg = export_frame_svg(&frame.elements, view_box, style)?;
        let path = out_dir.join(format!("frame_{:05}.svg", frame.index));
        std::fs::write(&path, svg).with_context(|| format!("write '{}'", path.display()))?;
        written += 1;
    }
    Ok(written)
}

/// Open the scene directory, or the platform default.
pub fn open_storage(dir: Option<PathBuf>) -> anyhow::Result<FileStorage> {
    let storage = match dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    log::debug!("Using scene directory {}", storage.base_path().display());
    Ok(storage)
}

pub fn list_scenes(storage: &dyn SceneStorage) -> anyhow::Result<Vec<SceneSummary>> {
    Ok(pollster::block_on(storage.list())?)
}

pub fn save_scene(
    storage: &dyn SceneStorage,
    name: &str,
    in_path: &Path,
) -> anyhow::Result<SceneRecord> {
    let scene = read_scene(in_path)?;
    Ok(pollster::block_on(storage.save(name, &scene))?)
}

pub fn load_scene(storage: &dyn SceneStorage, id: &str, out_path: &Path) -> anyhow::Result<()> {
    let record = pollster::block_on(storage.load(id))?;
    write_output(out_path, &record.scene.to_json()?)
}

pub fn delete_scene(storage: &dyn SceneStorage, id: &str) -> anyhow::Result<()> {
    Ok(pollster::block_on(storage.delete(id))?)
}
