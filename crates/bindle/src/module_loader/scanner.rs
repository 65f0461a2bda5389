use std::sync::LazyLock;

use bindle_common::{ExportItem, ImportedName};
use regex::Regex;

static IMPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^\s*import\s+(.+?)\s+from\s+['"]([^'"]+)['"]\s*;?\s*$"#).unwrap()
});
static IMPORT_BARE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"^\s*import\s+['"]([^'"]+)['"]\s*;?\s*$"#).unwrap());
static EXPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^\s*export\s+(\{[^}]*\}|\*)\s+from\s+['"]([^'"]+)['"]\s*;?\s*$"#).unwrap()
});
static EXPORT_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*export\s+((?:async\s+)?(?:const|let|var|function\*?|class)\s+([A-Za-z_$][A-Za-z0-9_$]*))").unwrap()
});
static EXPORT_DEFAULT_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\s*export\s+default\b").unwrap());
static EXPORT_LIST_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\s*export\s+\{([^}]*)\}\s*;?\s*$").unwrap());
static DYNAMIC_IMPORT_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"import\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

#[derive(Debug)]
pub struct ScannedImport {
  pub specifier: String,
  pub names: Vec<ImportedName>,
}

/// The module surface extracted by a statement-level scan: static and
/// dynamic import records plus the exported bindings. The scan is
/// line-oriented; module statements are expected on their own lines, which
/// holds for the module dialect this loader accepts.
#[derive(Debug, Default)]
pub struct ScanResult {
  pub imports: Vec<ScannedImport>,
  pub dynamic_imports: Vec<String>,
  pub exports: Vec<ExportItem>,
}

pub fn scan(code: &str, default_binding: &str) -> ScanResult {
  let mut result = ScanResult::default();

  for line in code.lines() {
    if let Some(captures) = IMPORT_FROM_RE.captures(line) {
      result.imports.push(ScannedImport {
        specifier: captures[2].to_string(),
        names: parse_import_clause(&captures[1]),
      });
    } else if let Some(captures) = IMPORT_BARE_RE.captures(line) {
      result.imports.push(ScannedImport { specifier: captures[1].to_string(), names: vec![] });
    } else if let Some(captures) = EXPORT_FROM_RE.captures(line) {
      let clause = &captures[1];
      let names = if clause == "*" {
        vec![]
      } else {
        parse_binding_list(&clause[1..clause.len() - 1])
          .into_iter()
          .map(|(source, target)| ImportedName { imported: source, local: target })
          .collect()
      };
      for name in &names {
        result
          .exports
          .push(ExportItem { exported: name.local.clone(), local: name.local.clone() });
      }
      result.imports.push(ScannedImport { specifier: captures[2].to_string(), names });
    } else if let Some(captures) = EXPORT_DECL_RE.captures(line) {
      let local = captures[2].to_string();
      result.exports.push(ExportItem { exported: local.clone(), local });
    } else if EXPORT_DEFAULT_RE.is_match(line) {
      result.exports.push(ExportItem {
        exported: "default".to_string(),
        local: default_binding.to_string(),
      });
    } else if let Some(captures) = EXPORT_LIST_RE.captures(line) {
      for (local, exported) in parse_binding_list(&captures[1]) {
        result.exports.push(ExportItem { exported, local });
      }
    }
  }

  for captures in DYNAMIC_IMPORT_RE.captures_iter(code) {
    result.dynamic_imports.push(captures[1].to_string());
  }

  result
}

/// What to do with a stripped import statement during rewriting.
pub enum ImportDisposition {
  /// The bindings are already in scope or hoisted to the chunk level.
  Remove,
  /// Replace the statement, e.g. with binding aliases.
  Replace(String),
}

/// Rewrites a module body for inclusion in a chunk: import statements are
/// resolved through `on_import`, export keywords are stripped with the
/// declarations kept in place, and dynamic import specifiers are redirected
/// through `on_dynamic`. Line structure is preserved so output maps stay
/// line-accurate.
pub fn rewrite(
  code: &str,
  default_binding: &str,
  mut on_import: impl FnMut(&str, &[ImportedName]) -> ImportDisposition,
  mut on_dynamic: impl FnMut(&str) -> Option<String>,
) -> String {
  let mut rewritten = String::with_capacity(code.len());

  for line in code.lines() {
    let replacement = if let Some(captures) = IMPORT_FROM_RE.captures(line) {
      match on_import(&captures[2], &parse_import_clause(&captures[1])) {
        ImportDisposition::Remove => String::new(),
        ImportDisposition::Replace(text) => text,
      }
    } else if let Some(captures) = IMPORT_BARE_RE.captures(line) {
      match on_import(&captures[1], &[]) {
        ImportDisposition::Remove => String::new(),
        ImportDisposition::Replace(text) => text,
      }
    } else if let Some(captures) = EXPORT_FROM_RE.captures(line) {
      match on_import(&captures[2], &[]) {
        ImportDisposition::Remove => String::new(),
        ImportDisposition::Replace(text) => text,
      }
    } else if let Some(captures) = EXPORT_DECL_RE.captures(line) {
      line.replacen(&captures[0], &captures[1], 1)
    } else if EXPORT_DEFAULT_RE.is_match(line) {
      EXPORT_DEFAULT_RE.replace(line, format!("var {default_binding} =")).into_owned()
    } else if EXPORT_LIST_RE.is_match(line) {
      String::new()
    } else {
      line.to_string()
    };

    let replacement = DYNAMIC_IMPORT_RE
      .replace_all(&replacement, |captures: &regex::Captures| {
        match on_dynamic(&captures[1]) {
          Some(target) => format!("import('{target}')"),
          None => captures[0].to_string(),
        }
      })
      .into_owned();

    rewritten.push_str(&replacement);
    rewritten.push('\n');
  }

  // Keep the exact line count: `lines()` swallows a trailing newline.
  if !code.ends_with('\n') && rewritten.ends_with('\n') {
    rewritten.pop();
  }
  rewritten
}

/// Parses the clause between `import` and `from`: a default binding, a named
/// group, a namespace binding, or a default combined with either.
fn parse_import_clause(clause: &str) -> Vec<ImportedName> {
  let mut names = Vec::new();
  let clause = clause.trim();

  let (head, named_group) = match clause.find('{') {
    Some(start) => {
      let end = clause.rfind('}').unwrap_or(clause.len());
      (&clause[..start], Some(&clause[start + 1..end]))
    }
    None => (clause, None),
  };

  for part in head.split(',').map(str::trim).filter(|part| !part.is_empty()) {
    if let Some(alias) = part.strip_prefix("* as ") {
      names.push(ImportedName { imported: "*".to_string(), local: alias.trim().to_string() });
    } else {
      names.push(ImportedName { imported: "default".to_string(), local: part.to_string() });
    }
  }

  if let Some(group) = named_group {
    for (source, target) in parse_binding_list(group) {
      names.push(ImportedName { imported: source, local: target });
    }
  }

  names
}

/// Parses `a, b as c` into `(source, target)` pairs.
fn parse_binding_list(list: &str) -> Vec<(String, String)> {
  list
    .split(',')
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .map(|part| match part.split_once(" as ") {
      Some((source, target)) => (source.trim().to_string(), target.trim().to_string()),
      None => (part.to_string(), part.to_string()),
    })
    .collect()
}
