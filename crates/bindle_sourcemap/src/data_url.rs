use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sourcemap::SourceMap;

pub fn to_json_string(map: &SourceMap) -> anyhow::Result<String> {
  let mut buf = Vec::new();
  map.to_writer(&mut buf)?;
  Ok(String::from_utf8(buf)?)
}

pub fn to_data_url(map: &SourceMap) -> anyhow::Result<String> {
  let json = to_json_string(map)?;
  Ok(format!("data:application/json;charset=utf-8;base64,{}", BASE64.encode(json.as_bytes())))
}

#[cfg(test)]
mod tests {
  use sourcemap::SourceMapBuilder;

  #[test]
  fn data_url_prefix() {
    let map = SourceMapBuilder::new(Some("out.js")).into_sourcemap();
    let url = super::to_data_url(&map).unwrap();
    assert!(url.starts_with("data:application/json;charset=utf-8;base64,"));
  }
}
