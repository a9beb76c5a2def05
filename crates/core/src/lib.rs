mod assets;
mod bounds;
mod camera;
mod color;
mod effects;
mod error;
mod fetch;
mod gltf_io;
mod material;
mod material_mode;
mod mesh_primitives;
mod model;
mod normalize;
mod progress;
mod rotation;
mod settings;
mod stage;
mod stats;
mod viewer;

#[cfg(test)]
mod test_fixtures;

pub use assets::{is_blob_key, is_url, load_bytes, release_bytes, store_bytes, ModelSource};
pub use bounds::{bounds_of_positions, Aabb};
pub use camera::{OrbitControls, PerspectiveCamera};
pub use color::{hex_to_linear, mean_channel, srgb_to_linear};
pub use effects::{FrameEffects, ScanLine, SCAN_LINE_LIFETIME};
pub use error::LoadError;
#[cfg(not(target_arch = "wasm32"))]
pub use fetch::fetch_bytes_blocking;
#[cfg(target_arch = "wasm32")]
pub use fetch::fetch_bytes;
pub use gltf_io::{compute_normals, load_model_bytes};
pub use material::{Material, MaterialMode, MaterialTag, ShadingModel};
pub use material_mode::{apply_mode, holo_material, spider_material, MaterialPolicy, SIGNIFICANT_VOLUME};
pub use mesh_primitives::{make_box, make_circle, make_ring};
pub use model::{MeshNode, Model, ModelNode, Transform};
pub use normalize::{normalize_model, Normalization, TARGET_EXTENT};
pub use progress::{logging_sink, LoadProgress, ProgressSink};
pub use rotation::RotationState;
pub use settings::{
    Palette, PaletteColors, RotationSettings, StageSettings, ViewerSettings, SETTINGS_FILE,
};
pub use stage::{build_stage, Stage, StageNode};
pub use stats::{compute_stats, group_thousands, ModelStats, StatsFields, PLACEHOLDER};
pub use viewer::{LoadResolution, LoadTicket, Viewer};
