/*
[INPUT]:  Wallet names and ids chosen in the console
[OUTPUT]: Append-only name,id records in WALLET_IDS.txt
[POS]:    Storage layer - wallet alias registry
[UPDATE]: When the alias file format changes
*/

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{ConsoleError, Result};

const HEADER: &str = "# name,id\n";

/// One saved wallet name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAlias {
    pub name: String,
    pub id: String,
}

/// Trim a user supplied name and replace the field separator
pub fn sanitize_alias_name(raw: &str) -> String {
    raw.trim().replace(',', "_")
}

/// Flat file mapping wallet names to wallet ids
///
/// Records are never updated or removed. A missing file is an empty registry.
#[derive(Debug, Clone)]
pub struct WalletAliasRegistry {
    path: PathBuf,
}

impl WalletAliasRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list_aliases(&self) -> Result<Vec<WalletAlias>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(parse_records(&content))
    }

    pub async fn is_aliased(&self, wallet_id: &str) -> Result<bool> {
        Ok(self
            .list_aliases()
            .await?
            .iter()
            .any(|alias| alias.id == wallet_id))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<WalletAlias>> {
        Ok(self
            .list_aliases()
            .await?
            .into_iter()
            .find(|alias| alias.name == name))
    }

    /// Append `name,id`, rejecting empty or taken names before touching the file
    pub async fn add_alias(&self, name: &str, wallet_id: &str) -> Result<WalletAlias> {
        let name = sanitize_alias_name(name);
        if name.is_empty() {
            return Err(ConsoleError::InvalidInput(
                "wallet name cannot be empty".to_string(),
            ));
        }
        let wallet_id = wallet_id.trim();
        if wallet_id.is_empty() {
            return Err(ConsoleError::InvalidInput(
                "wallet id cannot be empty".to_string(),
            ));
        }
        if self.find_by_name(&name).await?.is_some() {
            return Err(ConsoleError::AliasExists(name));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let is_new = !fs::try_exists(&self.path).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let record = format!("{name},{wallet_id}\n");
        if is_new {
            file.write_all(HEADER.as_bytes()).await?;
        }
        file.write_all(record.as_bytes()).await?;
        file.flush().await?;

        info!(path = %self.path.display(), name = %name, wallet_id, "wallet alias saved");
        Ok(WalletAlias {
            name,
            id: wallet_id.to_string(),
        })
    }
}

fn parse_records(content: &str) -> Vec<WalletAlias> {
    content
        .strip_suffix('\n')
        .unwrap_or(content)
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (name, id) = line.split_once(',')?;
            Some(WalletAlias {
                name: name.to_string(),
                id: id.to_string(),
            })
        })
        .collect()
}
