//! Reading and writing `.env`-style files.
//!
//! The generated environment file is the hand-off point between the
//! setup workflow and the application it provisions.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

/// Parses env files into a map of variables.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Quoted: `KEY="value with spaces"` or `KEY='single quoted'`
/// - Exported: `export KEY=value`
/// - Comments: `# This is a comment`
///
/// # Example
///
/// ```
/// use autosetup::config::EnvFileParser;
///
/// let vars = EnvFileParser::parse("# generated\nUC_CATALOG=\"main\"\n").unwrap();
/// assert_eq!(vars.get("UC_CATALOG").map(String::as_str), Some("main"));
/// ```
pub struct EnvFileParser;

impl EnvFileParser {
    /// Parse env file content into a map of variables.
    pub fn parse(content: &str) -> Result<BTreeMap<String, String>> {
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(Self::parse_line)
            .collect())
    }

    fn parse_line(line: &str) -> Option<(String, String)> {
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), Self::unquote(value.trim())))
    }

    fn unquote(value: &str) -> String {
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            Self::unescape(&value[1..value.len() - 1])
        } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
            value[1..value.len() - 1].to_string()
        } else {
            value.to_string()
        }
    }

    /// Reverse the `\\` and `\"` escapes of double-quoted values.
    fn unescape(inner: &str) -> String {
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(next @ ('\\' | '"')) => out.push(next),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                _ => out.push(c),
            }
        }
        out
    }

    /// Load and parse an env file.
    pub fn load(path: &Path) -> Result<BTreeMap<String, String>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    /// Load and parse an env file, returning an empty map if it doesn't exist.
    pub fn load_optional(path: &Path) -> Result<BTreeMap<String, String>> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(BTreeMap::new())
        }
    }
}

/// Writes the generated environment file.
pub struct EnvFileWriter;

impl EnvFileWriter {
    /// Render variables as `KEY="value"` lines under a timestamp header.
    pub fn render(vars: &BTreeMap<String, String>, generated_at: DateTime<Local>) -> String {
        let mut out = format!(
            "# Generated by autosetup on {}\n\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        for (key, value) in vars {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            let _ = writeln!(out, "{}=\"{}\"", key, escaped);
        }
        out
    }

    /// Write variables to `path`, replacing any existing file.
    pub fn write(path: &Path, vars: &BTreeMap<String, String>) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        std::fs::write(path, Self::render(vars, Local::now()))
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn parses_generated_file() {
        let content = r#"
# Generated by autosetup on 2025-01-02 03:04:05

DATABRICKS_HOST="https://example.cloud.databricks.com"
UC_CATALOG="workspace"
MLFLOW_EXPERIMENT_ID="1234"
"#;

        let vars = EnvFileParser::parse(content).unwrap();

        assert_eq!(vars.len(), 3);
        assert_eq!(
            vars.get("DATABRICKS_HOST").map(String::as_str),
            Some("https://example.cloud.databricks.com")
        );
        assert_eq!(vars.get("MLFLOW_EXPERIMENT_ID").map(String::as_str), Some("1234"));
    }

    #[test]
    fn handles_quote_styles_and_export() {
        let vars = EnvFileParser::parse(
            "DOUBLE=\"a b\"\nSINGLE='c d'\nBARE=e f\nexport EXPORTED=g\n",
        )
        .unwrap();

        assert_eq!(vars["DOUBLE"], "a b");
        assert_eq!(vars["SINGLE"], "c d");
        assert_eq!(vars["BARE"], "e f");
        assert_eq!(vars["EXPORTED"], "g");
    }

    #[test]
    fn keeps_equals_in_values() {
        let vars = EnvFileParser::parse("URL=https://h/x?a=b&c=d").unwrap();
        assert_eq!(vars["URL"], "https://h/x?a=b&c=d");
    }

    #[test]
    fn skips_garbage_lines() {
        let vars = EnvFileParser::parse("A=1\nnot a pair\n=orphan\nB=\n").unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["B"], "");
    }

    #[test]
    fn lone_quote_is_kept() {
        let vars = EnvFileParser::parse("Q=\"").unwrap();
        assert_eq!(vars["Q"], "\"");
    }

    #[test]
    fn load_optional_missing_is_empty() {
        let vars = EnvFileParser::load_optional(Path::new("/nonexistent/.env.local")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn render_has_header_and_sorted_quoted_lines() {
        let mut vars = BTreeMap::new();
        vars.insert("UC_SCHEMA".to_string(), "default".to_string());
        vars.insert("LLM_MODEL".to_string(), "databricks-claude-3-7-sonnet".to_string());
        let at = Local.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();

        let text = EnvFileWriter::render(&vars, at);

        assert_eq!(
            text,
            "# Generated by autosetup on 2025-06-01 12:30:00\n\n\
             LLM_MODEL=\"databricks-claude-3-7-sonnet\"\n\
             UC_SCHEMA=\"default\"\n"
        );
    }

    #[test]
    fn write_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(".env.local");
        let mut vars = BTreeMap::new();
        vars.insert("PROMPT_ALIAS".to_string(), "production".to_string());

        EnvFileWriter::write(&path, &vars).unwrap();

        assert_eq!(EnvFileParser::load(&path).unwrap(), vars);
    }

    #[test]
    fn escaped_quotes_and_backslashes_survive_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env.local");
        let mut vars = BTreeMap::new();
        vars.insert("APP_TITLE".to_string(), r#"say "hi" from C:\apps"#.to_string());
        vars.insert("PLAIN".to_string(), r"a\nb".to_string());

        EnvFileWriter::write(&path, &vars).unwrap();

        assert_eq!(EnvFileParser::load(&path).unwrap(), vars);
    }
}
