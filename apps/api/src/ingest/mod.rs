pub mod extractor;
pub mod normalizer;

pub use extractor::{FileExtractor, SourceExtractor, UploadedFile};
pub use normalizer::{normalize, SourceText};
