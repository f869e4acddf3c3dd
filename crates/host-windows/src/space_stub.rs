use anyhow::{anyhow, Result};
use std::path::Path;

pub fn free_space_bytes(path: &Path) -> Result<u64> {
    Err(anyhow!("free space query for {} requires Windows", path.display()))
}
