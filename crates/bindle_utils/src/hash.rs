use xxhash_rust::xxh3::xxh3_128;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Short url-safe content digest, used for `[hash]` substitution in output
/// file names and for asset reference ids. Deterministic across platforms
/// and builds for the same input.
pub fn short_hash(input: &[u8], len: usize) -> String {
  let digest = xxh3_128(input).to_le_bytes();
  let mut rendered = base_encode::to_string(&digest, 64, ALPHABET).unwrap();
  rendered.truncate(len);
  rendered
}
