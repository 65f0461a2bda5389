pub mod bundle_output;

use std::sync::Arc;

use bindle_common::NormalizedInputOptions;

pub type SharedOptions = Arc<NormalizedInputOptions>;
