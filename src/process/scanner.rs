//! Discovery of process directories under a /proc root.

use std::fs;
use std::path::{Path, PathBuf};

/// A live process directory under a /proc root.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Lists numeric directories under `root` that still have a `stat` file,
/// stopping after `max` entries if given.
pub fn collect_proc_entries(root: &Path, max: Option<usize>) -> Vec<ProcEntry> {
    let Ok(dir) = fs::read_dir(root) else {
        return Vec::new();
    };

    dir.flatten()
        .filter_map(|entry| {
            let pid = entry.file_name().to_str()?.parse::<u32>().ok()?;
            let proc_path = entry.path();
            // Processes that exit mid-scan lose their stat file first
            proc_path
                .join("stat")
                .exists()
                .then_some(ProcEntry { pid, proc_path })
        })
        .take(max.unwrap_or(usize::MAX))
        .collect()
}

/// Short process name: `comm`, else the basename of argv[0] from `cmdline`.
pub fn read_process_name(proc_path: &Path) -> Option<String> {
    if let Ok(comm) = fs::read_to_string(proc_path.join("comm")) {
        let comm = comm.trim();
        if !comm.is_empty() {
            return Some(comm.to_string());
        }
    }

    let cmdline = fs::read(proc_path.join("cmdline")).ok()?;
    let argv0 = cmdline.split(|&b| b == 0).next().filter(|a| !a.is_empty())?;
    let argv0 = std::str::from_utf8(argv0).ok()?;
    Path::new(argv0)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}
