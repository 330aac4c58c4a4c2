pub mod dot;
pub mod json;

pub use dot::{DotEngine, RenderArtifacts};
pub use json::JsonRecordWriter;
