pub mod zark;

use std::sync::Arc;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;

pub struct BackendManager {}

impl BackendManager {
    pub fn get() -> Result<BackendBox> {
        let backend = zark::Zark::new(&Config::get(ConfigKey::ApiURL))?;
        return Ok(Arc::new(backend));
    }
}
