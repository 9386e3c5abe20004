//! Range scanner preprocessing.

mod preprocess;

pub use preprocess::{ScanPreprocessor, ScanPreprocessorConfig, SectorWindow};
