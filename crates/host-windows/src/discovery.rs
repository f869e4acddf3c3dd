use reclaim_core::VirtualDiskRecord;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories under `%LOCALAPPDATA%` where WSL and Docker Desktop keep disks.
pub const SEARCH_DIRS: [&str; 2] = ["Packages", "Docker"];

pub fn local_app_data() -> Option<PathBuf> {
    std::env::var_os("LOCALAPPDATA")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::data_local_dir)
}

pub fn search_roots(local_app_data: &Path) -> Vec<PathBuf> {
    SEARCH_DIRS
        .iter()
        .map(|dir| local_app_data.join(dir))
        .filter(|root| root.is_dir())
        .collect()
}

/// Walk the search roots for `*.vhdx` files, largest first (ties by path).
pub fn discover_virtual_disks(local_app_data: &Path) -> Vec<VirtualDiskRecord> {
    let mut disks = Vec::new();
    for root in search_roots(local_app_data) {
        tracing::debug!(root = %root.display(), "searching for virtual disks");
        for entry in WalkDir::new(&root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_vhdx(entry.path()) {
                continue;
            }
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            let label = owner_label(entry.path());
            disks.push(VirtualDiskRecord::new(entry.path(), meta.len(), label));
        }
    }
    disks.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then_with(|| a.path.cmp(&b.path)));
    disks
}

fn is_vhdx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("vhdx"))
}

/// Best guess at which distribution a disk image belongs to, from its path.
pub fn owner_label(path: &Path) -> &'static str {
    let text = path.to_string_lossy();
    let lower = text.to_lowercase();
    if text.contains("Ubuntu") {
        if text.contains("Ubuntu22") || text.contains("Ubuntu-22") {
            "Ubuntu 22.04"
        } else if text.contains("Ubuntu20") || text.contains("Ubuntu-20") {
            "Ubuntu 20.04"
        } else {
            "Ubuntu"
        }
    } else if lower.contains("docker-desktop-data") {
        "Docker Desktop Data"
    } else if lower.contains("docker") {
        "Docker"
    } else {
        "Unknown"
    }
}

/// The numbered list shown by the menus; numbers start at 1.
#[derive(Debug, Default, Clone)]
pub struct DiskInventory {
    disks: Vec<VirtualDiskRecord>,
}

impl DiskInventory {
    pub fn new(disks: Vec<VirtualDiskRecord>) -> Self {
        Self { disks }
    }

    pub fn scan(local_app_data: &Path) -> Self {
        Self::new(discover_virtual_disks(local_app_data))
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn get(&self, number: usize) -> Option<&VirtualDiskRecord> {
        number.checked_sub(1).and_then(|idx| self.disks.get(idx))
    }

    pub fn numbered(&self) -> impl Iterator<Item = (usize, &VirtualDiskRecord)> {
        self.disks.iter().enumerate().map(|(idx, disk)| (idx + 1, disk))
    }

    pub fn disks(&self) -> &[VirtualDiskRecord] {
        &self.disks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path, len: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; len]).unwrap();
    }

    fn layout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Packages/CanonicalGroupLimited.Ubuntu22.04LTS_79rhkp1fndgsc/LocalState/ext4.vhdx"), 300);
        touch(&root.join("Docker/wsl/data/ext4.VHDX"), 500);
        touch(&root.join("Docker/wsl/distro/ext4.vhdx"), 300);
        touch(&root.join("Packages/Other/notes.txt"), 900);
        touch(&root.join("Elsewhere/ignored.vhdx"), 900);
        dir
    }

    #[test]
    fn finds_vhdx_files_largest_first() {
        let dir = layout();
        let disks = discover_virtual_disks(dir.path());
        let sizes: Vec<u64> = disks.iter().map(|disk| disk.size_bytes).collect();
        assert_eq!(sizes, vec![500, 300, 300]);
        assert_eq!(disks[0].owner_label, "Docker");
        assert!(disks.iter().all(|disk| !disk.path.ends_with("ignored.vhdx")));
    }

    #[test]
    fn discovery_is_idempotent() {
        let dir = layout();
        let first = discover_virtual_disks(dir.path());
        let second = discover_virtual_disks(dir.path());
        assert_eq!(first, second);
    }

    #[test]
    fn missing_roots_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_virtual_disks(dir.path()).is_empty());
        assert!(search_roots(dir.path()).is_empty());
    }

    #[test]
    fn labels_owners_from_path() {
        let cases = [
            (r"C:\P\CanonicalGroupLimited.Ubuntu22.04LTS\ext4.vhdx", "Ubuntu 22.04"),
            (r"C:\P\Ubuntu-20.04\ext4.vhdx", "Ubuntu 20.04"),
            (r"C:\P\CanonicalGroupLimited.UbuntuonWindows\ext4.vhdx", "Ubuntu"),
            (r"C:\Docker\wsl\docker-desktop-data\ext4.vhdx", "Docker Desktop Data"),
            (r"C:\Docker\wsl\data\ext4.vhdx", "Docker"),
            (r"C:\P\ubuntu-lower\ext4.vhdx", "Unknown"),
            (r"C:\P\Debian\ext4.vhdx", "Unknown"),
        ];
        for (path, label) in cases {
            assert_eq!(owner_label(Path::new(path)), label, "{}", path);
        }
    }

    #[test]
    fn inventory_numbers_from_one() {
        let inventory = DiskInventory::new(vec![
            VirtualDiskRecord::new("a.vhdx", 2, "Docker"),
            VirtualDiskRecord::new("b.vhdx", 1, "Unknown"),
        ]);
        assert!(inventory.get(0).is_none());
        assert_eq!(inventory.get(2).map(|disk| disk.size_bytes), Some(1));
        assert!(inventory.get(3).is_none());
        assert_eq!(inventory.numbered().map(|(n, _)| n).collect::<Vec<_>>(), vec![1, 2]);
    }
}
