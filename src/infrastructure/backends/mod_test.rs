use anyhow::Result;

use super::BackendManager;
use crate::domain::models::BackendName;

#[test]
fn it_builds_every_backend() -> Result<()> {
    for name in [BackendName::Http, BackendName::Mock] {
        assert_eq!(BackendManager::get(name)?.name(), name);
    }

    return Ok(());
}
