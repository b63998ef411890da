//! Runtime configuration read from `QUIZ_*` environment variables.

use std::env;

use quiz_core::partition::PartitionSettings;

use crate::bank_loader::BankSource;
use crate::error::ConfigError;
use crate::sampling::Sampler;

const DEFAULT_BANK: &str = "questions.json";
const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3";

/// Value of `QUIZ_DB_URL` that selects the in-memory store.
pub const IN_MEMORY_DB: &str = "memory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    /// Path or `http(s)` URL of the question bank document.
    pub bank: String,
    /// `SQLite` URL, or `None` for an in-memory store.
    pub db_url: Option<String>,
    pub set_size: u32,
    pub test_size: u32,
    pub test_count: u32,
    /// Fixed seed for test sampling.
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        let layout = PartitionSettings::default();
        Self {
            bank: DEFAULT_BANK.into(),
            db_url: Some(DEFAULT_DB_URL.into()),
            set_size: layout.set_size(),
            test_size: layout.test_size(),
            test_count: layout.test_count(),
            seed: None,
        }
    }
}

impl QuizConfig {
    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNumber` when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNumber` when a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let read = |var: &'static str| {
            lookup(var)
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(bank) = read("QUIZ_BANK") {
            config.bank = bank;
        }
        if let Some(db_url) = read("QUIZ_DB_URL") {
            config.db_url = (db_url != IN_MEMORY_DB).then_some(db_url);
        }
        if let Some(raw) = read("QUIZ_SET_SIZE") {
            config.set_size = parse_positive("QUIZ_SET_SIZE", &raw)?;
        }
        if let Some(raw) = read("QUIZ_TEST_SIZE") {
            config.test_size = parse_positive("QUIZ_TEST_SIZE", &raw)?;
        }
        if let Some(raw) = read("QUIZ_TEST_COUNT") {
            config.test_count = parse_positive("QUIZ_TEST_COUNT", &raw)?;
        }
        if let Some(raw) = read("QUIZ_SEED") {
            let seed = raw.parse().map_err(|_| ConfigError::InvalidNumber {
                var: "QUIZ_SEED",
                raw: raw.clone(),
            })?;
            config.seed = Some(seed);
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Partition` if any size is zero.
    pub fn partition_settings(&self) -> Result<PartitionSettings, ConfigError> {
        Ok(PartitionSettings::new(
            self.set_size,
            self.test_size,
            self.test_count,
        )?)
    }

    #[must_use]
    pub fn bank_source(&self) -> BankSource {
        BankSource::parse(&self.bank)
    }

    #[must_use]
    pub fn sampler(&self) -> Sampler {
        self.seed.map_or(Sampler::Entropy, Sampler::Seeded)
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            var,
            raw: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = QuizConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, QuizConfig::default());
        assert_eq!(config.test_count, 10);
        assert_eq!(config.sampler(), Sampler::Entropy);
    }

    #[test]
    fn variables_override_defaults() {
        let config = QuizConfig::from_lookup(lookup(&[
            ("QUIZ_BANK", "https://example.com/bank.json"),
            ("QUIZ_DB_URL", "memory"),
            ("QUIZ_SET_SIZE", "50"),
            ("QUIZ_TEST_COUNT", " 3 "),
            ("QUIZ_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(config.db_url, None);
        assert_eq!(config.set_size, 50);
        assert_eq!(config.test_size, 100);
        assert_eq!(config.test_count, 3);
        assert_eq!(config.sampler(), Sampler::Seeded(42));
        assert!(matches!(config.bank_source(), BankSource::Url(_)));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let err = QuizConfig::from_lookup(lookup(&[("QUIZ_TEST_SIZE", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { var: "QUIZ_TEST_SIZE", .. }
        ));
        assert!(QuizConfig::from_lookup(lookup(&[("QUIZ_SEED", "abc")])).is_err());
    }

    #[test]
    fn partition_settings_follow_config() {
        let config = QuizConfig {
            set_size: 25,
            ..QuizConfig::default()
        };
        assert_eq!(config.partition_settings().unwrap().set_size(), 25);
    }
}
