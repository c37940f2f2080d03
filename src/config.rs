/// Application configuration
///
/// Values come from the process environment. `main` seeds it from a
/// `.env` file in the working directory before anything reads it.

use std::path::PathBuf;

use crate::state::library::Library;

/// Hosted backend connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    /// Settings are usable only when both values are present
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Option<Self> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let anon_key = anon_key.into().trim().to_string();
        if url.is_empty() || anon_key.is_empty() {
            return None;
        }
        Some(Self { url, anon_key })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs the editor against the local cache only
    pub supabase: Option<SupabaseConfig>,
    pub db_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let supabase = SupabaseConfig::new(
            lookup("SUPABASE_URL").unwrap_or_default(),
            lookup("SUPABASE_ANON_KEY").unwrap_or_default(),
        );

        let db_path = match lookup("PECS_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir).join("pecs-board").join("pecs_board.db"),
            None => Library::default_db_path(),
        };

        Self { supabase, db_path }
    }

    pub fn remote_enabled(&self) -> bool {
        self.supabase.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_remote_requires_url_and_key() {
        let config = AppConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")]));
        assert!(!config.remote_enabled());

        let config = AppConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]));
        let supabase = config.supabase.unwrap();
        assert_eq!(supabase.url, "https://x.supabase.co");
        assert_eq!(supabase.anon_key, "anon");
    }

    #[test]
    fn test_blank_values_disable_remote() {
        assert!(SupabaseConfig::new("  ", "key").is_none());
        assert!(SupabaseConfig::new("https://x", "").is_none());
    }

    #[test]
    fn test_data_dir_override() {
        let config = AppConfig::from_lookup(lookup(&[("PECS_DATA_DIR", "/tmp/pecs")]));
        assert_eq!(config.db_path, PathBuf::from("/tmp/pecs/pecs-board/pecs_board.db"));
    }

    #[test]
    fn test_default_db_path() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert!(config.db_path.ends_with("pecs-board/pecs_board.db"));
    }
}
