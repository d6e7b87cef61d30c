use std::path::{Path, PathBuf};

use ci_installer::version::detect_major_version;

use crate::error::Result;

pub fn run_detect_version(cwd: &Path, root: Option<PathBuf>) -> Result<()> {
    let root = super::resolve_root(cwd, root);
    println!("{}", detect_major_version(&root));
    Ok(())
}
