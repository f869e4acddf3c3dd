use crate::privilege::Privileges;
use crate::shell::quote;
use reclaim_exec::CommandSpec;

pub const DEFAULT_DU_DEPTH: u32 = 1;
pub const DEFAULT_DUST_DEPTH: u32 = 3;

pub fn ncdu(privs: &Privileges, path: &str) -> CommandSpec {
    CommandSpec::shell(format!("{}ncdu {}", privs.sudo_prefix(path), quote(path)))
}

pub fn du_overview(privs: &Privileges, path: &str, depth: u32) -> CommandSpec {
    CommandSpec::shell(format!(
        "{}du -h -d {} {} 2>/dev/null | sort -hr | head -20",
        privs.sudo_prefix(path),
        depth,
        quote(path)
    ))
}

pub fn df_specs() -> [CommandSpec; 2] {
    [CommandSpec::shell("df -h"), CommandSpec::shell("df -i")]
}

pub fn dust(path: &str, depth: u32) -> CommandSpec {
    CommandSpec::shell(format!("dust -d {} {}", depth, quote(path)))
}

pub fn duf() -> CommandSpec {
    CommandSpec::shell("duf")
}

pub fn top_entries(privs: &Privileges) -> CommandSpec {
    CommandSpec::shell(format!(
        "{}du -ahx / 2>/dev/null | sort -rh | head -20",
        privs.sudo_prefix("/")
    ))
}

/// `du -sh` of one directory, captured so the size can be tabulated.
pub fn dir_size(privs: &Privileges, path: &str) -> CommandSpec {
    CommandSpec::shell(format!(
        "{}du -sh {} 2>/dev/null",
        privs.sudo_prefix(path),
        quote(path)
    ))
    .captured()
}

pub fn home_dirs_usage(privs: &Privileges) -> CommandSpec {
    CommandSpec::shell(format!("{}du -sh /home/* 2>/dev/null", privs.sudo_prefix("/home")))
}

pub fn docker_system_df() -> CommandSpec {
    CommandSpec::shell("docker system df")
}
