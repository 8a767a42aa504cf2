use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_weight() -> f32 {
    1.0
}

/// One row of the moment keyword table: a label and the terms that trigger it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentRule {
    pub label: String,
    /// Case-insensitive, word-boundary matched. Multi-word terms allowed.
    pub terms: Vec<String>,
    /// Relative importance of this moment type, `(0.0, 10.0]`.
    #[serde(default = "default_weight")]
    pub weight: f32,
}

/// The keyword table the classifier runs against.
///
/// Injected into the classifier rather than read from a global so tests and
/// alternate deployments can swap tables freely.
#[derive(Debug, Clone)]
pub struct MomentTable {
    pub rules: Vec<MomentRule>,
}

impl Default for MomentTable {
    /// Built-in table tuned for American-football broadcasts. A deployment
    /// watching a different event ships its own `moments.yaml`.
    fn default() -> Self {
        let rule = |label: &str, terms: &[&str], weight: f32| MomentRule {
            label: label.to_string(),
            terms: terms.iter().map(|t| (*t).to_string()).collect(),
            weight,
        };
        Self {
            rules: vec![
                rule("touchdown", &["touchdown", "td", "scores", "six points"], 1.0),
                rule("fumble", &["fumble", "fumbled", "turnover"], 1.0),
                rule(
                    "interception",
                    &["interception", "picked off", "pick six"],
                    1.0,
                ),
                rule("halftime", &["halftime", "half time", "halftime show"], 0.8),
                rule("commercial", &["commercial", "ad break"], 0.6),
            ],
        }
    }
}

/// Phrases that look like names but never are (venues, slogans, calendar words).
///
/// Lookup is lowercase. Extend via the `stoplist` key in `moments.yaml`.
#[derive(Debug, Clone)]
pub struct Stoplist {
    phrases: HashSet<String>,
}

const DEFAULT_STOP_PHRASES: &[&str] = &[
    "super bowl",
    "happy hour",
    "taco tuesday",
    "monday night",
    "sunday night",
    "prime time",
    "half time",
    "hail mary",
    "field goal",
    "red zone",
    "two minute",
    "hall of fame",
    "world series",
    "grand slam",
    "new york",
    "los angeles",
    "las vegas",
    "kansas city",
    "san francisco",
    "green bay",
    "new england",
    "tampa bay",
    "happy new year",
    "merry christmas",
];

impl Default for Stoplist {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_STOP_PHRASES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }
}

impl Stoplist {
    /// Default stoplist plus extra phrases (already-lowercased entries are fine;
    /// anything else is lowercased on insert).
    #[must_use]
    pub fn with_extra<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut list = Self::default();
        for phrase in extra {
            let normalized = phrase.trim().to_lowercase();
            if !normalized.is_empty() {
                list.phrases.insert(normalized);
            }
        }
        list
    }

    #[must_use]
    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.contains(&phrase.trim().to_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// On-disk shape of `config/moments.yaml`.
#[derive(Debug, Deserialize)]
pub struct MomentsFile {
    pub moments: Vec<MomentRule>,
    #[serde(default)]
    pub stoplist: Vec<String>,
}

impl MomentsFile {
    /// Split into the injected table and stoplist. Rule labels are lowercased
    /// here so downstream ordering compares consistently.
    #[must_use]
    pub fn into_parts(self) -> (MomentTable, Stoplist) {
        let mut rules = self.moments;
        for rule in &mut rules {
            rule.label = rule.label.trim().to_lowercase();
        }
        (MomentTable { rules }, Stoplist::with_extra(self.stoplist))
    }
}

/// Load and validate the moment keyword table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_moments(path: &Path) -> Result<MomentsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MomentsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let moments_file: MomentsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::MomentsFileParse)?;

    validate_moments(&moments_file)?;

    Ok(moments_file)
}

/// Like [`load_moments`], but a missing file is `Ok(None)` so callers can
/// fall back to the built-in table. Unreadable or malformed files still fail.
///
/// # Errors
///
/// Returns `ConfigError` for any failure other than the file not existing.
pub fn load_moments_if_present(path: &Path) -> Result<Option<MomentsFile>, ConfigError> {
    match load_moments(path) {
        Ok(file) => Ok(Some(file)),
        Err(ConfigError::MomentsFileIo { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn validate_moments(moments_file: &MomentsFile) -> Result<(), ConfigError> {
    let mut seen_labels = HashSet::new();

    for rule in &moments_file.moments {
        if rule.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "moment label must be non-empty".to_string(),
            ));
        }

        if rule.terms.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "moment '{}' has no usable terms",
                rule.label
            )));
        }

        if !rule.weight.is_finite() || rule.weight <= 0.0 || rule.weight > 10.0 {
            return Err(ConfigError::Validation(format!(
                "moment '{}' has invalid weight {}; must be in (0, 10]",
                rule.label, rule.weight
            )));
        }

        let lower_label = rule.label.trim().to_lowercase();
        if !seen_labels.insert(lower_label) {
            return Err(ConfigError::Validation(format!(
                "duplicate moment label: '{}'",
                rule.label
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(label: &str, terms: &[&str], weight: f32) -> MomentRule {
        MomentRule {
            label: label.to_string(),
            terms: terms.iter().map(|t| (*t).to_string()).collect(),
            weight,
        }
    }

    #[test]
    fn default_table_has_core_event_labels() {
        let table = MomentTable::default();
        let labels: Vec<&str> = table.rules.iter().map(|r| r.label.as_str()).collect();
        assert!(labels.contains(&"touchdown"));
        assert!(labels.contains(&"fumble"));
        assert!(labels.contains(&"interception"));
    }

    #[test]
    fn stoplist_lookup_is_case_insensitive() {
        let list = Stoplist::default();
        assert!(list.contains("Super Bowl"));
        assert!(list.contains("super bowl"));
        assert!(!list.contains("Patrick Mahomes"));
    }

    #[test]
    fn stoplist_with_extra_merges_and_normalizes() {
        let list = Stoplist::with_extra(vec!["  Flag Day ".to_string(), String::new()]);
        assert!(list.contains("flag day"));
        assert!(list.contains("super bowl"));
        assert!(list.len() > DEFAULT_STOP_PHRASES.len());
    }

    #[test]
    fn validate_rejects_empty_label() {
        let file = MomentsFile {
            moments: vec![rule("  ", &["boom"], 1.0)],
            stoplist: vec![],
        };
        let err = validate_moments(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_rule_without_terms() {
        let file = MomentsFile {
            moments: vec![rule("touchdown", &["", "  "], 1.0)],
            stoplist: vec![],
        };
        let err = validate_moments(&file).unwrap_err();
        assert!(err.to_string().contains("no usable terms"));
    }

    #[test]
    fn validate_rejects_bad_weight() {
        let file = MomentsFile {
            moments: vec![rule("touchdown", &["touchdown"], 0.0)],
            stoplist: vec![],
        };
        let err = validate_moments(&file).unwrap_err();
        assert!(err.to_string().contains("invalid weight"));
    }

    #[test]
    fn validate_rejects_duplicate_label() {
        let file = MomentsFile {
            moments: vec![
                rule("Touchdown", &["touchdown"], 1.0),
                rule("touchdown", &["td"], 1.0),
            ],
            stoplist: vec![],
        };
        let err = validate_moments(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate moment label"));
    }

    #[test]
    fn into_parts_lowercases_labels() {
        let file = MomentsFile {
            moments: vec![rule("TOUCHDOWN", &["touchdown"], 1.0)],
            stoplist: vec!["Media Day".to_string()],
        };
        let (table, stoplist) = file.into_parts();
        assert_eq!(table.rules[0].label, "touchdown");
        assert!(stoplist.contains("media day"));
    }

    #[test]
    fn parse_yaml_applies_default_weight() {
        let yaml = "moments:\n  - label: overtime\n    terms: [overtime, ot]\n";
        let file: MomentsFile = serde_yaml::from_str(yaml).unwrap();
        assert!((file.moments[0].weight - 1.0).abs() < f32::EPSILON);
        assert!(file.stoplist.is_empty());
    }

    #[test]
    fn load_moments_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("moments.yaml");
        assert!(path.exists(), "moments.yaml missing at {path:?}");
        let result = load_moments(&path);
        assert!(result.is_ok(), "failed to load moments.yaml: {result:?}");
        let file = result.unwrap();
        assert!(!file.moments.is_empty());
    }

    #[test]
    fn load_if_present_maps_missing_file_to_none() {
        let path = Path::new("/nonexistent/buzzmint/moments.yaml");
        let result = load_moments_if_present(path);
        assert!(matches!(result, Ok(None)), "expected Ok(None), got {result:?}");
    }

    #[test]
    fn load_if_present_still_fails_on_malformed_yaml() {
        let dir = std::env::temp_dir().join("buzzmint-moments-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.yaml");
        std::fs::write(&path, "moments: [not, a, rule, list").unwrap();
        let result = load_moments_if_present(&path);
        assert!(result.is_err(), "expected parse error, got {result:?}");
        std::fs::remove_file(&path).ok();
    }
}
