pub mod loader;

pub use loader::{ModelArtifacts, load_config, load_model_dir};
