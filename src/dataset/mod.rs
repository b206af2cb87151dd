//! Per-account dataset layout produced by the scraper.
//!
//! ```text
//! DATASET_PATH/
//!   log.txt
//!   <account>/
//!     <media_id>.jpg | .mp4
//!     bio.json               account biography (JSON string)
//!     info.json              post records
//!     nlp.json               biography aggregation (written here)
//!     didascalia_nlp.json    caption aggregation (written here)
//! ```

mod posts;
mod shortcode;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::nlp::NlpError;

pub use posts::{
    AnnotatedCaption, CaptionDocument, Picture, PictureMetadata, PostInfo, TaggedUser,
};
pub use shortcode::{id_to_shortcode, media_id_from_filename, MAX_MEDIA_ID};

pub const BIO_FILENAME: &str = "bio.json";
pub const INFO_FILENAME: &str = "info.json";
pub const BIO_OUTPUT_FILENAME: &str = "nlp.json";
pub const CAPTIONS_OUTPUT_FILENAME: &str = "didascalia_nlp.json";
pub const ACCOUNT_LIST_FILENAME: &str = "account.txt";

/// A scraped dataset root.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
}

impl Dataset {
    /// Open a dataset directory. Fails if the path is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, NlpError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(NlpError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Dataset directory not found: {}", root.display()),
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All account directories, sorted by name. Plain files are ignored.
    pub fn accounts(&self) -> Result<Vec<Account>, NlpError> {
        let mut accounts = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                debug!("Skipping non-account entry {}", entry.path().display());
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            accounts.push(Account {
                name,
                dir: entry.path(),
            });
        }
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    /// Write `account.txt` listing every account that has an `info.json`.
    ///
    /// Returns the listed account names.
    pub fn scan_accounts_with_info(&self) -> Result<Vec<String>, NlpError> {
        let names: Vec<String> = self
            .accounts()?
            .into_iter()
            .filter(|a| a.info_path().is_file())
            .map(|a| a.name)
            .collect();

        let mut contents = String::new();
        for name in &names {
            contents.push_str(name);
            contents.push('\n');
        }
        std::fs::write(self.root.join(ACCOUNT_LIST_FILENAME), contents)?;
        Ok(names)
    }
}

/// One account directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub dir: PathBuf,
}

impl Account {
    pub fn bio_path(&self) -> PathBuf {
        self.dir.join(BIO_FILENAME)
    }

    pub fn info_path(&self) -> PathBuf {
        self.dir.join(INFO_FILENAME)
    }

    pub fn bio_output_path(&self) -> PathBuf {
        self.dir.join(BIO_OUTPUT_FILENAME)
    }

    pub fn captions_output_path(&self) -> PathBuf {
        self.dir.join(CAPTIONS_OUTPUT_FILENAME)
    }

    /// Read the biography text. `null` means the account has no bio.
    pub async fn read_bio(&self) -> Result<Option<String>, NlpError> {
        let contents = tokio::fs::read_to_string(self.bio_path()).await?;
        Ok(serde_json::from_str::<Option<String>>(&contents)?)
    }

    /// Read the post records.
    pub async fn read_posts(&self) -> Result<Vec<PostInfo>, NlpError> {
        let contents = tokio::fs::read_to_string(self.info_path()).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Media files whose name is a numeric media id, with their shortcodes.
    pub fn media_shortcodes(&self) -> Result<Vec<(String, String)>, NlpError> {
        let mut media = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let file_name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(code) = media_id_from_filename(&file_name).and_then(id_to_shortcode) {
                media.push((file_name, code));
            }
        }
        media.sort();
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_accounts_skip_plain_files() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("zeta")).unwrap();
        std::fs::create_dir(dir.path().join("alpha")).unwrap();
        std::fs::write(dir.path().join("log.txt"), "").unwrap();
        std::fs::write(dir.path().join("dataset_completo.json"), "[]").unwrap();

        let dataset = Dataset::open(dir.path()).unwrap();
        let names: Vec<_> = dataset
            .accounts()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_open_missing_dir_fails() {
        let dir = tempdir().unwrap();
        assert!(Dataset::open(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_scan_accounts_with_info() {
        let dir = tempdir().unwrap();
        for name in ["with_info", "without_info"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("with_info").join(INFO_FILENAME), "[]").unwrap();

        let dataset = Dataset::open(dir.path()).unwrap();
        let listed = dataset.scan_accounts_with_info().unwrap();
        assert_eq!(listed, vec!["with_info"]);

        let written = std::fs::read_to_string(dir.path().join(ACCOUNT_LIST_FILENAME)).unwrap();
        assert_eq!(written, "with_info\n");
    }

    #[test]
    fn test_media_shortcodes() {
        let dir = tempdir().unwrap();
        let account_dir = dir.path().join("acct");
        std::fs::create_dir(&account_dir).unwrap();
        std::fs::write(account_dir.join("2616109190035207246.jpg"), b"").unwrap();
        std::fs::write(account_dir.join("info.json"), "[]").unwrap();

        let account = Account {
            name: "acct".to_string(),
            dir: account_dir,
        };
        assert_eq!(
            account.media_shortcodes().unwrap(),
            vec![(
                "2616109190035207246.jpg".to_string(),
                "CROSXKVrvRO".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_read_bio_string_and_null() {
        let dir = tempdir().unwrap();
        let account = Account {
            name: "a".to_string(),
            dir: dir.path().to_path_buf(),
        };

        std::fs::write(account.bio_path(), r#""Founder @ Acme Corp""#).unwrap();
        assert_eq!(
            account.read_bio().await.unwrap().as_deref(),
            Some("Founder @ Acme Corp")
        );

        std::fs::write(account.bio_path(), "null").unwrap();
        assert_eq!(account.read_bio().await.unwrap(), None);
    }
}
