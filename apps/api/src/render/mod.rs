pub mod blocks;
pub mod docx;
pub mod style;

pub use blocks::{render, ContentBlock};
pub use docx::{assemble, DocumentArtifact};
