pub use sourcemap::{SourceMap, SourceMapBuilder};

mod data_url;
mod source;
mod source_joiner;

pub use crate::{
  data_url::{to_data_url, to_json_string},
  source::{Source, SourceMapSource},
  source_joiner::SourceJoiner,
};
