pub mod config;
pub mod directory;
pub mod session;

use anyhow::Result;
use vrv_access::{AccessConfig, AccessControl};

pub struct CommandContext {
    pub config: AccessConfig,
    pub access: AccessControl,
}

impl CommandContext {
    pub fn new(config: AccessConfig) -> Result<Self> {
        let access = AccessControl::open(&config)?;
        Ok(Self { config, access })
    }
}
