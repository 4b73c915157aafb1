use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{IdentityProvider, Role, Session};
use crate::error::AuthError;

const USERS_FILE_NAME: &str = "users.json";

/// One account on disk. Older files may predate the role field, so it
/// defaults to plantonista.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserAccount {
    pub username: String,
    pub secret: String,
    #[serde(default)]
    pub role: Role,
}

/// Identity provider backed by a local JSON file. Secrets are stored as-is;
/// this is a stand-in for a hosted auth service, not a replacement for one.
#[derive(Clone)]
pub struct FileIdentityProvider {
    file_path: PathBuf,
}

impl FileIdentityProvider {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let base = match base_dir {
            Some(dir) => dir,
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(".hidrotrack")
            }
        };
        fs::create_dir_all(&base)?;
        let file_path = base.join(USERS_FILE_NAME);
        if !file_path.exists() {
            let mut writer = BufWriter::new(File::create(&file_path)?);
            serde_json::to_writer_pretty(&mut writer, &Vec::<UserAccount>::new())?;
            writer.flush()?;
        }
        Ok(FileIdentityProvider { file_path })
    }

    fn read_accounts(&self) -> Result<Vec<UserAccount>> {
        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);
        let accounts = serde_json::from_reader(reader)
            .with_context(|| format!("corrupt user store at {}", self.file_path.display()))?;
        Ok(accounts)
    }

    fn write_accounts(&self, accounts: &[UserAccount]) -> Result<()> {
        let file = File::create(&self.file_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, accounts)?;
        writer.flush()?;
        Ok(())
    }

    pub fn has_accounts(&self) -> Result<bool> {
        Ok(!self.read_accounts()?.is_empty())
    }

    /// Create the account, or replace the secret/role of an existing one.
    pub fn upsert_account(&self, account: UserAccount) -> Result<()> {
        let mut accounts = self.read_accounts()?;
        if let Some(pos) = accounts
            .iter()
            .position(|a| a.username == account.username)
        {
            accounts[pos] = account;
        } else {
            accounts.push(account);
        }
        self.write_accounts(&accounts)
    }
}

impl IdentityProvider for FileIdentityProvider {
    fn authenticate(&self, username: &str, secret: &str) -> Result<Session, AuthError> {
        let accounts = self.read_accounts().map_err(AuthError::Store)?;
        let account = accounts
            .iter()
            .find(|a| a.username == username && a.secret == secret)
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(Session::new(account.username.clone(), account.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_provider(tag: &str) -> (FileIdentityProvider, PathBuf) {
        let dir = env::temp_dir().join(format!("hidrotrack-users-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let provider = FileIdentityProvider::new(Some(dir.clone())).unwrap();
        (provider, dir)
    }

    #[test]
    fn test_authenticate_known_account() {
        let (provider, dir) = temp_provider("ok");
        provider
            .upsert_account(UserAccount {
                username: "sindico".to_string(),
                secret: "s3nha".to_string(),
                role: Role::Admin,
            })
            .unwrap();

        let session = provider.authenticate("sindico", "s3nha").unwrap();
        assert_eq!(session.role, Role::Admin);
        assert!(session.capabilities.can_view_dashboard);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_bad_credentials_rejected() {
        let (provider, dir) = temp_provider("bad");
        provider
            .upsert_account(UserAccount {
                username: "plantao".to_string(),
                secret: "certa".to_string(),
                role: Role::Plantonista,
            })
            .unwrap();

        assert!(matches!(
            provider.authenticate("plantao", "errada"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            provider.authenticate("ninguem", "certa"),
            Err(AuthError::InvalidCredentials)
        ));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_role_field_defaults_to_plantonista() {
        let (provider, dir) = temp_provider("default-role");
        fs::write(
            dir.join(USERS_FILE_NAME),
            r#"[{"username": "legado", "secret": "x"}]"#,
        )
        .unwrap();

        let session = provider.authenticate("legado", "x").unwrap();
        assert_eq!(session.role, Role::Plantonista);
        assert!(!session.capabilities.can_edit);

        let _ = fs::remove_dir_all(dir);
    }
}
