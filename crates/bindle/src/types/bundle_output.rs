use bindle_common::Output;

/// The result of one generate or write call: rendered chunks and finalized
/// assets, ordered entry chunks first, then secondary chunks, then assets.
#[derive(Debug, Default)]
pub struct BundleOutput {
  pub assets: Vec<Output>,
}
