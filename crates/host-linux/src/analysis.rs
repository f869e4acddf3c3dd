use crate::privilege::Privileges;
use crate::shell::quote;
use reclaim_exec::CommandSpec;

pub const DEFAULT_COUNT: u32 = 20;
pub const DEFAULT_DIR_DEPTH: u32 = 2;
pub const DEFAULT_OLD_DAYS: u32 = 180;

pub fn largest_files(privs: &Privileges, path: &str, count: u32) -> CommandSpec {
    CommandSpec::shell(format!(
        "{}find {} -type f -exec du -h {{}} + 2>/dev/null | sort -rh | head -n {}",
        privs.sudo_prefix(path),
        quote(path),
        count
    ))
}

pub fn largest_dirs(privs: &Privileges, path: &str, depth: u32, count: u32) -> CommandSpec {
    CommandSpec::shell(format!(
        "{}du -h --max-depth={} {} 2>/dev/null | sort -rh | head -n {}",
        privs.sudo_prefix(path),
        depth,
        quote(path),
        count
    ))
}

pub fn old_files(privs: &Privileges, path: &str, days: u32) -> CommandSpec {
    CommandSpec::shell(format!(
        "{}find {} -type f -atime +{} -exec ls -lh {{}} \\; 2>/dev/null | head -50",
        privs.sudo_prefix(path),
        quote(path),
        days
    ))
}

/// Listing of matching files and their combined size.
pub fn file_type(privs: &Privileges, path: &str, extension: &str) -> [CommandSpec; 2] {
    let sudo = privs.sudo_prefix(path);
    let path = quote(path);
    let pattern = quote(&format!("*{}", extension));
    [
        CommandSpec::shell(format!(
            "{}find {} -type f -name {} -exec ls -lh {{}} \\; 2>/dev/null | head -50",
            sudo, path, pattern
        )),
        CommandSpec::shell(format!(
            "{}find {} -type f -name {} -exec du -ch {{}} + 2>/dev/null | grep total$",
            sudo, path, pattern
        )),
    ]
}

/// Files that share a byte size; content is not compared.
pub fn duplicate_sizes(privs: &Privileges, path: &str) -> CommandSpec {
    CommandSpec::shell(format!(
        "{}find {} -type f -exec du -b {{}} + 2>/dev/null | sort -n | uniq -d -w 15",
        privs.sudo_prefix(path),
        quote(path)
    ))
}

pub fn directory_growth(privs: &Privileges, path: &str) -> CommandSpec {
    CommandSpec::shell(format!(
        "{}du -h --max-depth=2 {} 2>/dev/null | sort -rh | head -30",
        privs.sudo_prefix(path),
        quote(path)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::script_of;

    #[test]
    fn largest_files_defaults() {
        let privs = Privileges::new(true, "/home/me");
        assert_eq!(
            script_of(&largest_files(&privs, "/", DEFAULT_COUNT)),
            "sudo find / -type f -exec du -h {} + 2>/dev/null | sort -rh | head -n 20"
        );
    }

    #[test]
    fn file_type_quotes_the_glob() {
        let privs = Privileges::new(false, "/home/me");
        let [listing, total] = file_type(&privs, "/home/me", ".log");
        assert_eq!(
            script_of(&listing),
            "find /home/me -type f -name '*.log' -exec ls -lh {} \\; 2>/dev/null | head -50"
        );
        assert!(script_of(&total).ends_with("| grep total$"));
    }

    #[test]
    fn home_scans_skip_sudo() {
        let privs = Privileges::new(true, "/home/me");
        assert!(!script_of(&duplicate_sizes(&privs, "/home/me")).starts_with("sudo"));
        assert!(script_of(&old_files(&privs, "/home", DEFAULT_OLD_DAYS)).starts_with("sudo find /home"));
        assert_eq!(
            script_of(&largest_dirs(&privs, "/srv", DEFAULT_DIR_DEPTH, 5)),
            "sudo du -h --max-depth=2 /srv 2>/dev/null | sort -rh | head -n 5"
        );
    }
}
