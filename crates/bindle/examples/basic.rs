use bindle::{bundle, InputOptions, OutputOptions};

#[tokio::main]
async fn main() {
  let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("examples/basic");

  let build = bundle(InputOptions {
    input: vec!["./entry.js".into()],
    cwd: Some(root),
    ..InputOptions::default()
  })
  .await;

  let mut build = match build {
    Ok(build) => build,
    Err(errors) => {
      for error in errors.iter() {
        eprintln!("Error: {error}");
      }
      return;
    }
  };

  if let Err(errors) = build
    .write(OutputOptions {
      format: Some("esm".to_string()),
      dir: Some("dist".to_string()),
      ..OutputOptions::default()
    })
    .await
  {
    for error in errors.iter() {
      eprintln!("Error: {error}");
    }
  }
}
