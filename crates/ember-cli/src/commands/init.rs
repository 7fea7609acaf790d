//! Show file initialization command

use anyhow::{Context, Result};
use ember_particles::BUILTIN_SHOW;
use std::fs;
use std::path::Path;

pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(path, BUILTIN_SHOW).with_context(|| format!("writing {}", path.display()))?;

    println!("Wrote show file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  ember validate {}", path.display());
    println!("  ember run {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_particles::ShowConfig;

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ember-init-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn writes_loadable_show() {
        let dir = scratch("writes");
        let path = dir.join("shows/main.toml");
        run(&path, false).unwrap();
        let show = ShowConfig::load(&path).unwrap();
        assert_eq!(show.spawners.len(), 5);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = scratch("force");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("show.toml");
        fs::write(&path, "# mine").unwrap();

        assert!(run(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        run(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), BUILTIN_SHOW);
        fs::remove_dir_all(&dir).unwrap();
    }
}
