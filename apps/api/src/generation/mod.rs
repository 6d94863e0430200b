// Generation: pipeline orchestration, the process-wide session and HTTP handlers.
// Generation is CPU-bound; handlers run it inside tokio::task::spawn_blocking.

pub mod generator;
pub mod handlers;
pub mod session;

pub use generator::{default_cloud_config, generate, CloudConfig, GeneratedArtifact};
pub use session::WordCloudSession;
