#[derive(Debug, Clone)]
pub struct FilenameTemplate {
  template: String,
}

#[derive(Debug, Default)]
pub struct FileNameRenderOptions<'me> {
  pub name: Option<&'me str>,
  pub hash: Option<&'me str>,
  /// Extension without the leading dot; substituted for both `[ext]` and
  /// `[extname]`.
  pub ext: Option<&'me str>,
}

impl FilenameTemplate {
  pub fn new(template: String) -> Self {
    Self { template }
  }

  pub fn template(&self) -> &str {
    &self.template
  }

  pub fn has_hash_pattern(&self) -> bool {
    self.template.contains("[hash]")
  }

  pub fn render(&self, options: &FileNameRenderOptions) -> String {
    let mut rendered = self.template.clone();
    if let Some(name) = options.name {
      rendered = rendered.replace("[name]", name);
    }
    if let Some(hash) = options.hash {
      rendered = rendered.replace("[hash]", hash);
    }
    if let Some(ext) = options.ext {
      let extname = if ext.is_empty() { String::new() } else { format!(".{ext}") };
      rendered = rendered.replace("[extname]", &extname);
      rendered = rendered.replace("[ext]", ext);
    }
    rendered
  }
}

impl From<String> for FilenameTemplate {
  fn from(template: String) -> Self {
    Self::new(template)
  }
}
