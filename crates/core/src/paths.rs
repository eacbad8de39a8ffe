//! File locations of a session
//!
//! Derived once from the four host-supplied paths. Per-game files live in the
//! save directory and are named after the rom:
//! - `{save}/{rom_name}.srm`
//! - `{save}/{rom_name}.state{N}` and `{save}/{rom_name}.state{N}.png`
//! - `{save}/{rom_name}.cheats.toml`

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub rom: PathBuf,
    pub core: PathBuf,
    pub system: PathBuf,
    pub save: PathBuf,
    /// Rom file name without extension
    pub rom_name: String,
    /// Rom extension without the dot, empty if none
    pub rom_ext: String,
    /// Directory holding the rom, empty if the path has none
    pub rom_folder: PathBuf,
}

impl Paths {
    pub fn new(
        rom: impl Into<PathBuf>,
        core: impl Into<PathBuf>,
        system: impl Into<PathBuf>,
        save: impl Into<PathBuf>,
    ) -> Self {
        let rom = rom.into();
        let rom_name = rom
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rom_ext = rom
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rom_folder = rom.parent().map(Path::to_path_buf).unwrap_or_default();

        Self {
            rom,
            core: core.into(),
            system: system.into(),
            save: save.into(),
            rom_name,
            rom_ext,
            rom_folder,
        }
    }

    fn in_save_dir(&self, suffix: &str) -> PathBuf {
        self.save.join(format!("{}{}", self.rom_name, suffix))
    }

    pub fn sram(&self) -> PathBuf {
        self.in_save_dir(".srm")
    }

    pub fn state(&self, slot: u32) -> PathBuf {
        self.in_save_dir(&format!(".state{}", slot))
    }

    pub fn state_screenshot(&self, slot: u32) -> PathBuf {
        self.in_save_dir(&format!(".state{}.png", slot))
    }

    pub fn cheats(&self) -> PathBuf {
        self.in_save_dir(".cheats.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_parts() {
        let paths = Paths::new("/roms/nes/Super Game.nes", "/cores/nes.so", "/sys", "/saves");
        assert_eq!(paths.rom_name, "Super Game");
        assert_eq!(paths.rom_ext, "nes");
        assert_eq!(paths.rom_folder, PathBuf::from("/roms/nes"));
    }

    #[test]
    fn test_rom_without_extension_or_folder() {
        let paths = Paths::new("game", "core.so", "sys", "saves");
        assert_eq!(paths.rom_name, "game");
        assert_eq!(paths.rom_ext, "");
        assert_eq!(paths.rom_folder, PathBuf::new());
    }

    #[test]
    fn test_save_files() {
        let paths = Paths::new("/roms/game.sfc", "core.so", "/sys", "/saves");
        assert_eq!(paths.sram(), PathBuf::from("/saves/game.srm"));
        assert_eq!(paths.state(2), PathBuf::from("/saves/game.state2"));
        assert_eq!(paths.state_screenshot(2), PathBuf::from("/saves/game.state2.png"));
        assert_eq!(paths.cheats(), PathBuf::from("/saves/game.cheats.toml"));
    }
}
