use std::borrow::Cow;

/// One entry module. Single-entry, list and named-map input shapes all
/// lower to a list of these.
#[derive(Debug, Default, Clone)]
pub struct InputItem {
  pub name: Option<String>,
  pub import: String,
}

impl From<&str> for InputItem {
  fn from(value: &str) -> Self {
    Self { name: None, import: value.to_string() }
  }
}

impl From<String> for InputItem {
  fn from(value: String) -> Self {
    Self { name: None, import: value }
  }
}

impl From<Cow<'_, str>> for InputItem {
  fn from(value: Cow<'_, str>) -> Self {
    Self { name: None, import: value.to_string() }
  }
}

impl From<(&str, &str)> for InputItem {
  fn from((name, import): (&str, &str)) -> Self {
    Self { name: Some(name.to_string()), import: import.to_string() }
  }
}
