use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use pcbsolid_compose::{
    Assembly, ComposeConfig, Composer, DocumentBuilder, FsModelLoader, HoleFilter, MODEL_PATH_ENV,
    ModelCache, Part, ShapeBuilder, ShapeKind,
};
use pcbsolid_core::{Board, LayerRef};
use pcbsolid_export::{assembly_to_jscad_v2, shape_to_svg};
use pcbsolid_geometry::Shape;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CliError;

/// Which part of the board to compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum What {
    Board,
    Holes,
    Pads,
    Tracks,
    Zones,
    Copper,
    Coppers,
    Pcb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Summary,
    Jscad,
    Svg,
    Document,
}

pub struct Request {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub what: What,
    pub kind: Option<String>,
    pub layer: Option<String>,
    pub format: Format,
    pub output: Option<PathBuf>,
}

struct Named {
    name: String,
    shape: Shape,
}

struct Composed {
    shapes: Vec<Named>,
    parts: Vec<Part>,
}

pub fn run_render(req: Request) -> Result<(), CliError> {
    let board = load_board(&req.input).map_err(|e| CliError::input(format!("{e:#}")))?;
    let config = match &req.config {
        Some(path) => ComposeConfig::load(path).map_err(|e| CliError::input(e.to_string()))?,
        None => ComposeConfig::default(),
    };
    let kind = match req.kind.as_deref() {
        Some(s) => s
            .parse::<ShapeKind>()
            .map_err(|e| CliError::input(e.to_string()))?,
        None => ShapeKind::Solid,
    };
    let layer = req.layer.as_deref().map(parse_layer);

    let (composed, layer_name, document) = if req.format == Format::Document || config.document {
        let mut c = Composer::with_builder(&board, &config, DocumentBuilder::new());
        if let Some(layer) = layer {
            c.set_layer(layer)?;
        }
        let name = c.layer().name.clone();
        let composed = compose(&mut c, &config, req.what, kind)?;
        (composed, name, Some(c.into_builder().into_document()))
    } else {
        let mut c = Composer::new(&board, &config);
        if let Some(layer) = layer {
            c.set_layer(layer)?;
        }
        let name = c.layer().name.clone();
        (compose(&mut c, &config, req.what, kind)?, name, None)
    };
    info!(
        "composed {} shape(s), {} part(s)",
        composed.shapes.len(),
        composed.parts.len()
    );

    let text = match req.format {
        Format::Summary => {
            let summary = Summary::new(&composed, req.what, kind, &layer_name);
            to_json(&summary)?
        }
        Format::Document => to_json(&document.unwrap_or_default())?,
        Format::Jscad => assembly_to_jscad_v2(&combined(&composed), config.arc_tolerance)?,
        Format::Svg => shape_to_svg(&combined(&composed))?,
    };
    write_output(req.output.as_deref(), &text)
}

fn load_board(path: &Path) -> anyhow::Result<Board> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read board {}", path.display()))?;
    let board = Board::from_json_str(&raw)
        .with_context(|| format!("Invalid board document {}", path.display()))?;
    debug!(
        "board: {} modules, {} segments, {} zones",
        board.module.len(),
        board.segment.len(),
        board.zone.len()
    );
    Ok(board)
}

fn parse_layer(s: &str) -> LayerRef {
    match s.parse() {
        Ok(layer) => layer,
        Err(never) => match never {},
    }
}

fn compose<B: ShapeBuilder>(
    c: &mut Composer<'_, B>,
    config: &ComposeConfig,
    what: What,
    kind: ShapeKind,
) -> Result<Composed, CliError> {
    let single = |name: &str, shape: Option<Shape>| Composed {
        shapes: shape
            .map(|shape| Named {
                name: name.to_string(),
                shape,
            })
            .into_iter()
            .collect(),
        parts: Vec::new(),
    };
    let t = config.copper_thickness;
    Ok(match what {
        What::Board => single("board", c.make_board(kind, None)?),
        What::Holes => single(
            "holes",
            c.make_holes(kind, HoleFilter::from_config(config), None, config.fuse)?,
        ),
        What::Pads => single("pads", c.make_pads(kind, t, config.fuse)?),
        What::Tracks => single("tracks", c.make_tracks(kind, t, config.fuse)?),
        What::Zones => single("zones", c.make_zones(kind, t, config.fuse)?),
        What::Copper => single("copper", c.make_copper(kind, t, true, 0.0)?),
        What::Coppers => Composed {
            shapes: c
                .make_coppers(kind, t, true)?
                .into_iter()
                .enumerate()
                .map(|(i, shape)| Named {
                    name: format!("copper_{i}"),
                    shape,
                })
                .collect(),
            parts: Vec::new(),
        },
        What::Pcb => {
            let assembly = if models_available(config) {
                let mut cache = ModelCache::new();
                c.make(Some(&mut cache))?
            } else {
                c.make::<FsModelLoader>(None)?
            };
            from_assembly(assembly)
        }
    })
}

/// Parts are only loaded when a model directory was configured.
fn models_available(config: &ComposeConfig) -> bool {
    config.model_path.is_some() || std::env::var_os(MODEL_PATH_ENV).is_some_and(|p| !p.is_empty())
}

fn from_assembly(assembly: Assembly) -> Composed {
    let mut shapes = Vec::new();
    if let Some(shape) = assembly.board {
        shapes.push(Named {
            name: "board".to_string(),
            shape,
        });
    }
    for (i, shape) in assembly.coppers.into_iter().enumerate() {
        shapes.push(Named {
            name: format!("copper_{i}"),
            shape,
        });
    }
    Composed {
        shapes,
        parts: assembly.parts,
    }
}

fn combined(composed: &Composed) -> Shape {
    Shape::Compound(composed.shapes.iter().map(|n| n.shape.clone()).collect())
}

#[derive(Serialize)]
struct Summary<'a> {
    what: String,
    kind: &'static str,
    layer: &'a str,
    shapes: Vec<ShapeSummary<'a>>,
    parts: Vec<PartSummary<'a>>,
}

#[derive(Serialize)]
struct ShapeSummary<'a> {
    name: &'a str,
    leaves: usize,
    area: f64,
    volume: f64,
    bbox: Option<BBox>,
}

#[derive(Serialize)]
struct BBox {
    min: [f64; 3],
    max: [f64; 3],
}

#[derive(Serialize)]
struct PartSummary<'a> {
    reference: &'a str,
    value: &'a str,
    models: usize,
    at: [f64; 3],
}

impl<'a> Summary<'a> {
    fn new(composed: &'a Composed, what: What, kind: ShapeKind, layer: &'a str) -> Self {
        let what = what
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        Self {
            what,
            kind: kind.as_str(),
            layer,
            shapes: composed
                .shapes
                .iter()
                .map(|n| ShapeSummary {
                    name: &n.name,
                    leaves: n.shape.leaves().len(),
                    area: n.shape.area(),
                    volume: n.shape.volume(),
                    bbox: n.shape.bounding_box().map(|b| BBox {
                        min: b.min,
                        max: b.max,
                    }),
                })
                .collect(),
            parts: composed
                .parts
                .iter()
                .map(|p| {
                    let v = p.placement.translation.vector;
                    PartSummary {
                        reference: &p.reference,
                        value: &p.value,
                        models: p.models.len(),
                        at: [v.x, v.y, v.z],
                    }
                })
                .collect(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::processing(e.to_string()))
}

fn write_output(output: Option<&Path>, text: &str) -> Result<(), CliError> {
    let Some(path) = output else {
        println!("{text}");
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::processing(e.to_string()))?;
    }
    std::fs::write(path, text).map_err(|e| {
        CliError::processing(format!("Could not write {}: {e}", path.display()))
    })?;
    info!("wrote {}", path.display());
    Ok(())
}
