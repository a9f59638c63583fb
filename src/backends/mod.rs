//! Concrete collaborator implementations behind the engine traits.

mod command;
mod probe;
mod text_layer;

pub use command::{CommandEnhancer, CommandRecognizer, CommandRenderer, NoopEnhancer};
pub use probe::HeuristicLayoutProbe;
pub use text_layer::LopdfTextLayer;
