//! Reader for the `<product>.ini` file written by the updater.
//!
//! The format is a small INI dialect:
//!
//! ```text
//! ; comment
//! [Application]
//! Version = 1.2.3
//! Console = 1
//! ```
//!
//! Parsing never fails on content. Unknown or malformed lines are dropped,
//! key/value lines outside a section are dropped, and a repeated section
//! header resets that section. Only I/O and UTF-8 decoding can fail.

use super::ConfigError;
use camino::Utf8Path;
use indexmap::IndexMap;
use std::fmt;
use std::fs;

/// Keys of a single `[section]`, in file order.
pub type Section = IndexMap<String, String>;

/// Parsed ini file: ordered sections, each an ordered key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    sections: IndexMap<String, Section>,
}

fn trim_ini(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

impl ConfigDocument {
    /// Parse raw file bytes. Fails only when the bytes are not UTF-8.
    pub fn parse(content: &[u8]) -> Result<Self, ConfigError> {
        let text = std::str::from_utf8(content).map_err(|e| ConfigError::Decode {
            valid_up_to: e.valid_up_to(),
        })?;
        // Editors on Windows like to prepend a BOM
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Ok(Self::parse_str(text))
    }

    /// Parse already decoded text.
    pub fn parse_str(text: &str) -> Self {
        let mut sections: IndexMap<String, Section> = IndexMap::new();
        let mut current: Option<String> = None;

        for raw_line in text.split('\n') {
            let line = trim_ini(raw_line);
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
                let name = trim_ini(&line[1..line.len() - 1]).to_string();
                sections.insert(name.clone(), Section::new());
                current = Some(name);
                continue;
            }

            let Some(section_name) = current.as_ref() else {
                tracing::debug!("Dropping ini line outside of any section: {}", line);
                continue;
            };

            match line.split_once('=') {
                Some((key, value)) => {
                    if let Some(section) = sections.get_mut(section_name) {
                        section.insert(trim_ini(key).to_string(), trim_ini(value).to_string());
                    }
                }
                None => tracing::debug!("Skipping malformed ini line: {}", line),
            }
        }

        Self { sections }
    }

    /// Read and parse an ini file from disk.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::parse(&bytes).map_err(|e| match e {
            ConfigError::Decode { valid_up_to } => ConfigError::Undecodable {
                path: path.to_path_buf(),
                valid_up_to,
            },
            other => other,
        })?;

        tracing::debug!(
            "Loaded ini {} with {} section(s)",
            path,
            document.sections.len()
        );
        Ok(document)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    /// Like [`get`](Self::get) but distinguishes a missing section from a missing key.
    pub fn require(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        let values = self
            .section(section)
            .ok_or_else(|| ConfigError::MissingSection(section.to_string()))?;
        values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Serializes back to ini text. Comments and original spacing are not kept.
impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, values) in self.sections() {
            writeln!(f, "[{}]", name)?;
            for (key, value) in values {
                writeln!(f, "{} = {}", key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_application_section() {
        let doc = ConfigDocument::parse(b"[Application]\nVersion=1.2.3\nConsole=1").unwrap();

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("Application", "Version"), Some("1.2.3"));
        assert_eq!(doc.get("Application", "Console"), Some("1"));
    }

    #[test]
    fn test_whitespace_and_comments() {
        let text = "  ; leading comment\r\n\r\n\t[ Application ]  \r\n  Version =  4.0.1 \r\n;Console=1\r\n";
        let doc = ConfigDocument::parse_str(text);

        assert_eq!(doc.get("Application", "Version"), Some("4.0.1"));
        assert_eq!(doc.get("Application", "Console"), None);
    }

    #[test]
    fn test_splits_on_first_equals() {
        let doc = ConfigDocument::parse_str("[S]\nkey = a=b=c\n");
        assert_eq!(doc.get("S", "key"), Some("a=b=c"));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let doc = ConfigDocument::parse_str("[S]\nk=1\nk=2\n");
        assert_eq!(doc.get("S", "k"), Some("2"));
        assert_eq!(doc.section("S").unwrap().len(), 1);
    }

    #[test]
    fn test_reopened_section_is_reset() {
        let doc = ConfigDocument::parse_str("[A]\nx=1\n[B]\ny=2\n[A]\nz=3\n");

        assert_eq!(doc.get("A", "x"), None);
        assert_eq!(doc.get("A", "z"), Some("3"));
        assert_eq!(doc.get("B", "y"), Some("2"));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_no_implicit_global_section() {
        let doc = ConfigDocument::parse_str("Version=1.0\nConsole=1\n");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_keys_before_header_are_dropped() {
        let doc = ConfigDocument::parse_str("Version=0.1\n[Application]\nConsole=1\n");
        assert_eq!(doc.get("Application", "Version"), None);
        assert_eq!(doc.get("Application", "Console"), Some("1"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let doc = ConfigDocument::parse_str("[A]\nthis line has no separator\n[broken\nk=v\n");
        assert_eq!(doc.section("A").unwrap().len(), 1);
        assert_eq!(doc.get("A", "k"), Some("v"));
    }

    #[test]
    fn test_sections_keep_file_order() {
        let doc = ConfigDocument::parse_str("[B]\nk=1\n[A]\nk=2\n");
        let names: Vec<_> = doc.sections().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(doc.to_string(), "[B]\nk = 1\n[A]\nk = 2\n");
    }

    #[test]
    fn test_case_sensitive() {
        let doc = ConfigDocument::parse_str("[application]\nversion=1\n");
        assert!(doc.section("Application").is_none());
        assert_eq!(doc.get("application", "Version"), None);
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let err = ConfigDocument::parse(b"[A]\nk=\xff\xfe\n").unwrap_err();
        assert!(matches!(err, ConfigError::Decode { valid_up_to: 6 }));
    }

    #[test]
    fn test_bom_is_stripped() {
        let doc = ConfigDocument::parse(b"\xef\xbb\xbf[Application]\nVersion=2\n").unwrap();
        assert_eq!(doc.get("Application", "Version"), Some("2"));
    }

    #[test]
    fn test_require_reports_what_is_missing() {
        let doc = ConfigDocument::parse_str("[Application]\nConsole=1\n");

        assert!(matches!(
            doc.require("Other", "Version"),
            Err(ConfigError::MissingSection(ref s)) if s == "Other"
        ));
        assert!(matches!(
            doc.require("Application", "Version"),
            Err(ConfigError::MissingKey { ref key, .. }) if key == "Version"
        ));
        assert_eq!(doc.require("Application", "Console").unwrap(), "1");
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::try_from(temp_dir.path().join("nope.ini")).unwrap();

        let err = ConfigDocument::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    fn token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_.-][A-Za-z0-9_. -]{0,10}[A-Za-z0-9_.-]|[A-Za-z0-9_.-]"
    }

    fn document() -> impl Strategy<Value = ConfigDocument> {
        prop::collection::vec(
            (token(), prop::collection::vec((token(), token()), 0..5)),
            0..5,
        )
        .prop_map(|sections| {
            let mut text = String::new();
            for (name, pairs) in sections {
                text.push_str(&format!("[{}]\n", name));
                for (k, v) in pairs {
                    text.push_str(&format!("{}={}\n", k, v));
                }
            }
            ConfigDocument::parse_str(&text)
        })
    }

    proptest! {
        #[test]
        fn prop_reparse_of_serialized_form_is_equal(doc in document()) {
            let reparsed = ConfigDocument::parse_str(&doc.to_string());
            prop_assert_eq!(reparsed, doc);
        }

        #[test]
        fn prop_parse_never_panics(text in "\\PC*") {
            let _ = ConfigDocument::parse_str(&text);
        }
    }
}
