use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::recovery::CurrentUser;
use crate::models::config::write_private;
use crate::models::user::User;

/// Who is signed in on this device.
///
/// Created once by the host and passed by reference to whatever needs it.
/// When backed by a file, `login` and `logout` persist the change so the
/// next process (including boot recovery) sees it.
#[derive(Debug, Default)]
pub struct SessionContext {
    path: Option<PathBuf>,
    user: Option<User>,
}

impl SessionContext {
    /// Read the session stored at `path`. A missing file means signed out.
    pub fn load(path: &Path) -> Result<Self> {
        let user = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Some(toml::from_str(&contents)?)
        } else {
            None
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            user,
        })
    }

    /// A session that lives only in this process.
    pub fn in_memory(user: Option<User>) -> Self {
        Self { path: None, user }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn login(&mut self, user: User) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            write_private(path, &toml::to_string_pretty(&user)?)?;
        }
        info!(user = %user.uid, "signed in");
        self.user = Some(user);
        Ok(())
    }

    /// Sign out. Returns the user that was signed in, if any.
    pub fn logout(&mut self) -> Result<Option<User>> {
        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        let previous = self.user.take();
        if let Some(u) = &previous {
            info!(user = %u.uid, "signed out");
        }
        Ok(previous)
    }
}

impl CurrentUser for SessionContext {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }
}

impl CurrentUser for Option<User> {
    fn current_user(&self) -> Option<User> {
        self.clone()
    }
}
