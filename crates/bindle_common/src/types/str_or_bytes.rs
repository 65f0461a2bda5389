#[derive(Debug, Clone)]
pub enum StrOrBytes {
  Str(String),
  Bytes(Vec<u8>),
}

impl StrOrBytes {
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Self::Str(inner) => inner.as_bytes(),
      Self::Bytes(inner) => inner,
    }
  }

  pub fn try_into_string(self) -> anyhow::Result<String> {
    match self {
      Self::Str(inner) => Ok(inner),
      Self::Bytes(inner) => Ok(String::from_utf8(inner)?),
    }
  }
}

impl From<String> for StrOrBytes {
  fn from(value: String) -> Self {
    Self::Str(value)
  }
}

impl From<&str> for StrOrBytes {
  fn from(value: &str) -> Self {
    Self::Str(value.to_string())
  }
}

impl From<Vec<u8>> for StrOrBytes {
  fn from(value: Vec<u8>) -> Self {
    Self::Bytes(value)
  }
}
