//! Word bank and configuration sources.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::WordBankLoader;
use crate::config::GAME_CONFIG_NAME;
use crate::word_bank::{WordBank, WordBankError};

const EMBEDDED_GAME_CONFIG: &str = include_str!("../assets/game.json");
const WORD_BANK_FILE: &str = "word_bank.json";

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parsing error in {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    WordBank(#[from] WordBankError),
}

/// Serves the assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLoader;

impl WordBankLoader for EmbeddedLoader {
    type Error = LoaderError;

    fn load_word_bank(&self) -> Result<WordBank, Self::Error> {
        Ok(WordBank::embedded()?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<Option<T>, Self::Error>
    where
        T: DeserializeOwned,
    {
        let json = match config_name {
            GAME_CONFIG_NAME => EMBEDDED_GAME_CONFIG,
            _ => return Ok(None),
        };
        parse_config(config_name, json).map(Some)
    }
}

/// Reads `word_bank.json` and `<name>.json` configs from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, file: &str) -> Result<Option<String>, LoaderError> {
        let path = self.dir.join(file);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LoaderError::Io { path, source }),
        }
    }
}

impl WordBankLoader for DirectoryLoader {
    type Error = LoaderError;

    fn load_word_bank(&self) -> Result<WordBank, Self::Error> {
        let Some(json) = self.read(WORD_BANK_FILE)? else {
            return Err(LoaderError::Io {
                path: self.dir.join(WORD_BANK_FILE),
                source: ErrorKind::NotFound.into(),
            });
        };
        Ok(WordBank::from_json(&json)?)
    }

    /// A missing file is `Ok(None)`; the caller falls back to defaults.
    fn load_config<T>(&self, config_name: &str) -> Result<Option<T>, Self::Error>
    where
        T: DeserializeOwned,
    {
        self.read(&format!("{config_name}.json"))?
            .map(|json| parse_config(config_name, &json))
            .transpose()
    }
}

fn parse_config<T: DeserializeOwned>(name: &str, json: &str) -> Result<T, LoaderError> {
    serde_json::from_str(json).map_err(|source| LoaderError::Json {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "excludle-loader-{label}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn embedded_assets_match_the_live_game() {
        let bank = EmbeddedLoader.load_word_bank().unwrap();
        assert!(bank.len() >= 76);
        bank.validate().unwrap();

        let config: GameConfig = EmbeddedLoader.load_config(GAME_CONFIG_NAME).unwrap().unwrap();
        assert_eq!(config, GameConfig::default());
        assert!(
            EmbeddedLoader
                .load_config::<GameConfig>("theme")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn directory_loader_reads_bank_and_optional_config() {
        let dir = temp_dir("bank");
        fs::write(
            dir.join("word_bank.json"),
            r#"{"games":[{"category":"Pets","word1":"Dog","word2":"Cat","word3":"Fish","word4":"Hamster","imposter":"Tractor"}]}"#,
        )
        .unwrap();
        let loader = DirectoryLoader::new(&dir);
        assert_eq!(loader.load_word_bank().unwrap().len(), 1);
        assert!(loader.load_config::<GameConfig>("game").unwrap().is_none());

        fs::write(dir.join("game.json"), r#"{"max_mistakes": 5}"#).unwrap();
        let config: GameConfig = loader.load_config("game").unwrap().unwrap();
        assert_eq!(config.max_mistakes, 5);
        assert_eq!(config.rows_per_game, 4);

        fs::write(dir.join("game.json"), "{oops").unwrap();
        assert!(matches!(
            loader.load_config::<GameConfig>("game"),
            Err(LoaderError::Json { .. })
        ));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn directory_loader_requires_a_word_bank() {
        let dir = temp_dir("missing");
        let err = DirectoryLoader::new(&dir).load_word_bank().unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
        let _ = fs::remove_dir_all(dir);
    }
}
