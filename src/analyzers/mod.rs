//! Project analysis: directory scanning, file sampling, context assembly

pub mod context;
pub mod directory;
pub mod sampler;

pub use context::{ContextBuilder, ProjectContext};
pub use directory::{DirectoryAnalysis, DirectoryScanner, DirectoryTree, FileMeta};
pub use sampler::FileSampler;
