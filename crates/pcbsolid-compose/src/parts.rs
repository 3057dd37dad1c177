use std::path::{Path, PathBuf};

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use pcbsolid_core::Model;
use pcbsolid_core::layer::{BOTTOM_COPPER, TOP_COPPER};
use tracing::{debug, error, info, info_span, warn};

use crate::builder::ShapeBuilder;
use crate::composer::Composer;
use crate::error::{ComposeError, Result};
use crate::models::{LoadedModel, ModelCache, ModelLoader};

const MODEL_EXTENSIONS: [&str; 4] = ["stp", "STP", "step", "STEP"];
const MODEL_PATH_PREFIX: &str = "${KISYS3DMOD}/";
const MM_PER_INCH: f64 = 25.4;
/// Gap between a part and the board surface it sits on.
const PART_CLEARANCE: f64 = 0.1;

/// A model placed relative to its module.
#[derive(Debug, Clone)]
pub struct PlacedModel {
    pub model: LoadedModel,
    pub placement: Isometry3<f64>,
    pub scale: [f64; 3],
}

/// The loaded models of one module, with the module's board placement.
#[derive(Debug, Clone)]
pub struct Part {
    pub module_index: usize,
    pub reference: String,
    pub value: String,
    pub placement: Isometry3<f64>,
    pub models: Vec<PlacedModel>,
}

impl Part {
    /// Board placement of each model.
    pub fn placements(&self) -> impl Iterator<Item = Isometry3<f64>> + '_ {
        self.models.iter().map(|m| self.placement * m.placement)
    }
}

/// Placement of a model inside its module: offset in inches, rotation given
/// as X, Y, Z degrees and applied in reverse with flipped signs.
#[must_use]
pub fn model_placement(model: &Model) -> Isometry3<f64> {
    let [x, y, z] = model.at;
    let [rx, ry, rz] = model.rotate;
    let rotation = UnitQuaternion::from_euler_angles(
        (-rx).to_radians(),
        (-ry).to_radians(),
        (-rz).to_radians(),
    );
    Isometry3::from_parts(
        Translation3::new(x * MM_PER_INCH, y * MM_PER_INCH, z * MM_PER_INCH),
        rotation,
    )
}

/// Candidate files for a model reference under `dir`, in lookup order.
#[must_use]
pub fn model_candidates(dir: &Path, reference: &str) -> Vec<PathBuf> {
    let relative = Path::new(reference.strip_prefix(MODEL_PATH_PREFIX).unwrap_or(reference));
    MODEL_EXTENSIONS
        .iter()
        .map(|ext| dir.join(relative.with_extension(ext)))
        .collect()
}

impl<B: ShapeBuilder> Composer<'_, B> {
    /// Component models of the modules on the current layer.
    ///
    /// `z` defaults to just above the board top, or just below its bottom on
    /// the back layer where parts are also flipped. Models that cannot be
    /// found are logged and left out.
    pub fn load_parts<L: ModelLoader>(
        &self,
        cache: &mut ModelCache<L>,
        z: Option<f64>,
    ) -> Result<Vec<Part>> {
        let dir = self.config.model_dir();
        if !dir.is_dir() {
            return Err(ComposeError::ModelDirectory(dir));
        }
        let _span = info_span!("parts", layer = %self.layer.name).entered();
        info!("model path: {}", dir.display());

        let at_bottom = self.layer.is_bottom();
        let z = z.unwrap_or(if at_bottom {
            -PART_CLEARANCE
        } else {
            self.board_thickness() + PART_CLEARANCE
        });

        let mut parts = Vec::new();
        for (module_index, m) in self.board.module.iter().enumerate() {
            if m.layer != self.layer.name {
                continue;
            }
            let mut models = Vec::new();
            for (i, model) in m.model.iter().enumerate() {
                debug!("loading model {i}/{} {} {} {}", m.model.len(), m.reference, m.value, model.path);
                let loaded = model_candidates(&dir, &model.path)
                    .into_iter()
                    .find_map(|path| cache.get(&path).ok());
                match loaded {
                    Some(loaded) => models.push(PlacedModel {
                        model: loaded,
                        placement: model_placement(model),
                        scale: model.scale,
                    }),
                    None => warn!("no model for {}: {}", m.reference, model.path),
                }
            }
            if models.is_empty() {
                continue;
            }

            let at = m.at.position();
            let mut placement = Isometry3::from_parts(
                Translation3::new(at.x, at.y, z),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), m.at.angle.to_radians()),
            );
            if at_bottom {
                placement *= Isometry3::rotation(Vector3::x() * std::f64::consts::PI);
            }
            parts.push(Part {
                module_index,
                reference: m.reference.clone(),
                value: m.value.clone(),
                placement,
                models,
            });
        }
        info!("parts: {}", parts.len());
        Ok(parts)
    }

    /// Parts of both outer layers. A side that fails to load is logged and
    /// skipped; the current layer is restored afterwards.
    pub fn load_all_parts<L: ModelLoader>(&mut self, cache: &mut ModelCache<L>) -> Vec<Part> {
        let saved = self.layer.clone();
        let mut out = Vec::new();
        for side in [TOP_COPPER, BOTTOM_COPPER] {
            let loaded = self.set_layer(side).and_then(|()| self.load_parts(cache, None));
            match loaded {
                Ok(parts) => out.extend(parts),
                Err(e) => error!("{e}"),
            }
        }
        self.layer = saved;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComposeConfig;
    use approx::assert_abs_diff_eq;
    use nalgebra::Point3;
    use pcbsolid_core::Board;

    #[test]
    fn candidates_replace_the_extension() {
        let c = model_candidates(Path::new("/m"), "${KISYS3DMOD}/R.3dshapes/R_0603.wrl");
        assert_eq!(c[0], PathBuf::from("/m/R.3dshapes/R_0603.stp"));
        assert_eq!(c[3], PathBuf::from("/m/R.3dshapes/R_0603.STEP"));
    }

    #[test]
    fn model_offset_is_in_inches() {
        let model: Model = serde_json::from_str(
            r#"{ "path": "x.wrl", "at": [1, 0, 0], "rotate": [0, 0, 90] }"#,
        )
        .unwrap();
        let p = model_placement(&model) * Point3::new(1.0, 0.0, 0.0);
        // -90 degrees about Z, then 25.4 along X.
        assert_abs_diff_eq!(p.x, 25.4, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, -1.0, epsilon = 1e-9);
    }

    fn board() -> Board {
        Board::from_json_str(
            r#"{
            "general": { "thickness": 1.6 },
            "layers": [
                { "id": 0, "name": "F.Cu", "kind": "signal" },
                { "id": 31, "name": "B.Cu", "kind": "signal" }
            ],
            "module": [
                { "layer": "F.Cu", "at": [10, 5], "reference": "R1", "value": "10k",
                  "model": [{ "path": "${KISYS3DMOD}/R.3dshapes/R.wrl" }] },
                { "layer": "B.Cu", "at": [3, 4], "reference": "C1",
                  "model": [{ "path": "C.wrl" }] },
                { "layer": "F.Cu", "at": [0, 0], "reference": "U1",
                  "model": [{ "path": "missing.wrl" }] }
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn parts_sit_on_either_side_of_the_board() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("R.3dshapes")).unwrap();
        std::fs::write(dir.path().join("R.3dshapes/R.step"), b"r").unwrap();
        std::fs::write(dir.path().join("C.STP"), b"c").unwrap();

        let board = board();
        let config = ComposeConfig {
            model_path: Some(dir.path().to_path_buf()),
            ..ComposeConfig::default()
        };
        let mut c = Composer::new(&board, &config);
        let mut cache = ModelCache::new();
        let parts = c.load_all_parts(&mut cache);
        assert_eq!(c.layer().index, 0);
        assert_eq!(parts.len(), 2);
        assert_eq!(cache.len(), 2);

        let top = &parts[0];
        assert_eq!((top.module_index, top.value.as_str()), (0, "10k"));
        let t = top.placement.translation.vector;
        assert_abs_diff_eq!(t.z, 1.7, epsilon = 1e-9);
        assert_abs_diff_eq!(t.y, -5.0, epsilon = 1e-9);

        let bottom = &parts[1];
        assert_eq!(bottom.reference, "C1");
        assert_abs_diff_eq!(bottom.placement.translation.vector.z, -0.1, epsilon = 1e-9);
        let up = bottom.placement * Point3::new(0.0, 0.0, 1.0);
        assert_abs_diff_eq!(up.z, -1.1, epsilon = 1e-9);
    }

    #[test]
    fn missing_model_directory_is_an_error() {
        let board = board();
        let config = ComposeConfig {
            model_path: Some(PathBuf::from("/nonexistent/models")),
            ..ComposeConfig::default()
        };
        let c = Composer::new(&board, &config);
        let err = c.load_parts(&mut ModelCache::new(), None).unwrap_err();
        assert!(matches!(err, ComposeError::ModelDirectory(_)));

        let mut c = Composer::new(&board, &config);
        assert!(c.load_all_parts(&mut ModelCache::new()).is_empty());
    }
}
