#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod http;
pub mod mock;

use anyhow::Result;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> Result<BackendBox> {
        match name {
            BackendName::Http => return Ok(Box::<http::Http>::default()),
            BackendName::Mock => return Ok(Box::<mock::Mock>::default()),
        }
    }
}
