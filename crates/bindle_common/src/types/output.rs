use arcstr::ArcStr;

use crate::{FxIndexMap, OutputAsset, OutputChunk};

#[derive(Debug)]
pub enum Output {
  Chunk(Box<OutputChunk>),
  Asset(Box<OutputAsset>),
}

impl Output {
  pub fn filename(&self) -> &str {
    match self {
      Self::Chunk(chunk) => chunk.filename(),
      Self::Asset(asset) => asset.filename(),
    }
  }

  pub fn content_as_bytes(&self) -> &[u8] {
    match self {
      Self::Chunk(chunk) => chunk.content_as_bytes(),
      Self::Asset(asset) => asset.content_as_bytes(),
    }
  }
}

/// The in-flight bundle of one generate call, keyed by final file name.
pub type OutputBundle = FxIndexMap<ArcStr, Output>;
