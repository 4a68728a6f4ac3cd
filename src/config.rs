use std::collections::HashMap;
use std::fs;

/// Minimal INI-style configuration: global `key = value` pairs plus
/// `[Section]` scoped pairs. Lines starting with `#` are comments.
#[derive(Debug)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Error reading file {path}: {e}"))?;
        Ok(Self::parse(&content))
    }

    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                current_section = Some(name.to_string());
                continue;
            }

            if let Some(pos) = line.find('=') {
                let key = line[..pos].trim().to_string();
                let value = line[pos + 1..].trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            globals: HashMap::new(),
            sections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_or_default<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key)
            .or_else(|| self.get_global(key))
            .unwrap_or(default)
    }

    /// Parses a sectioned value as `u64`, falling back to `default` when
    /// missing or malformed.
    #[must_use]
    pub fn get_u64_or(&self, section: &str, key: &str, default: u64) -> u64 {
        self.get_non_empty(section, key)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    const SAMPLE: &str = r#"
# demo configuration
poll_interval_ms = 10

[Camera]
backend = synthetic
serial = "40010001"

[Display]
grab_timeout_ms = 100
"#;

    #[test]
    fn parses_sections_and_globals() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get_global("poll_interval_ms"), Some("10"));
        assert_eq!(cfg.get("Camera", "backend"), Some("synthetic"));
        assert_eq!(cfg.get("Camera", "serial"), Some("40010001"));
        assert_eq!(cfg.get("Missing", "key"), None);
    }

    #[test]
    fn section_lookup_falls_back_to_global() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get_or_default("Display", "poll_interval_ms", "5"), "10");
        assert_eq!(cfg.get_or_default("Display", "unknown", "5"), "5");
    }

    #[test]
    fn numeric_helper_handles_malformed_values() {
        let cfg = Config::parse("[Display]\ngrab_timeout_ms = banana\n");
        assert_eq!(cfg.get_u64_or("Display", "grab_timeout_ms", 100), 100);
        let cfg = Config::parse("[Display]\ngrab_timeout_ms = 250\n");
        assert_eq!(cfg.get_u64_or("Display", "grab_timeout_ms", 100), 250);
    }
}
