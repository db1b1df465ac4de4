//! Subcommand implementations and the setup they share.

pub mod doctor;
pub mod mistake;
pub mod onboard;
pub mod reports;
pub mod student;

use clap::Args;
use mathdesk_archive::{CorruptPolicy, JsonFileStore};
use mathdesk_config::{AppConfig, OnCorrupt};
use mathdesk_tutor::{Tutor, TutorSettings};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Flags accepted by every subcommand.
pub struct Globals {
    pub config: Option<PathBuf>,
    pub archive: Option<PathBuf>,
}

impl Globals {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(AppConfig::config_path)
    }

    pub fn load_config(&self) -> Result<AppConfig, Box<dyn std::error::Error>> {
        let path = self.config_path();
        let config =
            AppConfig::load_at(&path).map_err(|e| format!("Failed to load config: {e}"))?;
        Ok(config)
    }

    /// `--archive` wins over config and environment.
    pub fn archive_path(&self, config: &AppConfig) -> PathBuf {
        self.archive
            .clone()
            .unwrap_or_else(|| config.archive_path())
    }
}

pub fn store_for(path: &Path, config: &AppConfig) -> JsonFileStore {
    let policy = match config.archive.on_corrupt {
        OnCorrupt::Fail => CorruptPolicy::Fail,
        OnCorrupt::Quarantine => CorruptPolicy::Quarantine,
    };
    JsonFileStore::new(path).with_corrupt_policy(policy)
}

/// Load config, build providers and open the archive.
pub async fn open_tutor(globals: &Globals) -> Result<Tutor, Box<dyn std::error::Error>> {
    let config = globals.load_config()?;

    if !config.has_api_key() {
        warn!(
            provider = %config.default_provider,
            "No API key configured; set MATHDESK_API_KEY or run `mathdesk onboard`"
        );
    }

    let router = mathdesk_providers::router::build_from_config(&config)?;
    let text = router.default().ok_or("No default provider configured")?;
    let store = store_for(&globals.archive_path(&config), &config);

    let mut tutor = Tutor::open(Arc::new(store), text, TutorSettings::from_config(&config)).await?;
    if let Some(vision) = router.vision() {
        tutor = tutor.with_vision(vision);
    }
    Ok(tutor)
}

/// Where a command's text comes from.
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// Text given inline
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Resolve the input text: `--text`, then `--file`, then stdin.
/// Trailing whitespace is dropped so it never reaches the archive.
pub fn read_input(input: &InputArgs) -> Result<String, Box<dyn std::error::Error>> {
    let text = if let Some(text) = &input.text {
        text.clone()
    } else if let Some(path) = &input.file {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?
    } else {
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            eprintln!("📝 Enter the text, then press Ctrl-D:");
        }
        let mut buf = String::new();
        stdin.read_to_string(&mut buf)?;
        buf
    };
    Ok(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_text_wins() {
        let input = InputArgs {
            text: Some("2+2=5".into()),
            file: None,
        };
        assert_eq!(read_input(&input).unwrap(), "2+2=5");
    }

    #[test]
    fn text_is_read_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("exam.txt");
        std::fs::write(&path, "已知抛物线 y=x^2\r\n\n").unwrap();
        let input = InputArgs {
            text: None,
            file: Some(path),
        };
        assert_eq!(read_input(&input).unwrap(), "已知抛物线 y=x^2");
    }

    #[test]
    fn archive_flag_overrides_config() {
        let mut config = AppConfig::default();
        config.archive.path = Some("/srv/mathdesk/archive.json".into());

        let globals = Globals {
            config: None,
            archive: None,
        };
        assert_eq!(
            globals.archive_path(&config),
            PathBuf::from("/srv/mathdesk/archive.json")
        );

        let globals = Globals {
            config: None,
            archive: Some("/tmp/other.json".into()),
        };
        assert_eq!(globals.archive_path(&config), PathBuf::from("/tmp/other.json"));
    }
}
