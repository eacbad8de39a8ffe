//! Cheat codes
//!
//! Cheats are kept per game in a TOML file of `[[cheat]]` tables and pushed
//! to the Core through `retro_cheat_reset` / `retro_cheat_set`. The Core
//! addresses cheats by position, so the manager keeps insertion order.

use std::path::Path;

use retrorunner_engine::Core;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::config::ConfigResult;

new_key_type! {
    /// Handle to a cheat in a [`CheatManager`]
    pub struct CheatKey;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cheat {
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Cheat {
    pub fn new(description: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            code: code.into(),
            enabled: true,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CheatFile {
    #[serde(default, rename = "cheat")]
    cheats: Vec<Cheat>,
}

#[derive(Debug, Default)]
pub struct CheatManager {
    cheats: SlotMap<CheatKey, Cheat>,
    order: Vec<CheatKey>,
}

impl CheatManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, cheat: Cheat) -> CheatKey {
        let key = self.cheats.insert(cheat);
        self.order.push(key);
        key
    }

    pub fn remove(&mut self, key: CheatKey) -> Option<Cheat> {
        let cheat = self.cheats.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(cheat)
    }

    pub fn get(&self, key: CheatKey) -> Option<&Cheat> {
        self.cheats.get(key)
    }

    /// Returns false for a stale key
    pub fn set_enabled(&mut self, key: CheatKey, enabled: bool) -> bool {
        match self.cheats.get_mut(key) {
            Some(cheat) => {
                cheat.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.cheats.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Cheats in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (CheatKey, &Cheat)> {
        self.order
            .iter()
            .filter_map(|key| self.cheats.get(*key).map(|cheat| (*key, cheat)))
    }

    /// Replace all cheats with the contents of `path`
    pub fn load_file(&mut self, path: &Path) -> ConfigResult<usize> {
        let content = std::fs::read_to_string(path)?;
        let file: CheatFile = toml::from_str(&content)?;
        self.clear();
        for cheat in file.cheats {
            self.add(cheat);
        }
        tracing::debug!("Loaded {} cheats from {:?}", self.len(), path);
        Ok(self.len())
    }

    pub fn save_file(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = CheatFile {
            cheats: self.iter().map(|(_, cheat)| cheat.clone()).collect(),
        };
        std::fs::write(path, toml::to_string_pretty(&file)?)?;
        tracing::debug!("Saved {} cheats to {:?}", file.cheats.len(), path);
        Ok(())
    }

    /// Reset the Core's cheats and push every enabled one
    ///
    /// Returns false when the Core has no cheat support.
    pub fn apply(&self, core: &Core) -> bool {
        if !core.cheat_reset() {
            tracing::debug!("Core does not support cheats");
            return false;
        }
        for (index, (_, cheat)) in self.iter().enumerate() {
            if cheat.enabled && !core.cheat_set(index as u32, true, &cheat.code) {
                tracing::warn!("Cheat {:?} rejected", cheat.description);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_survives_removal() {
        let mut manager = CheatManager::new();
        let first = manager.add(Cheat::new("Lives", "AAAA-BBBB"));
        let second = manager.add(Cheat::new("Ammo", "CCCC-DDDD"));
        let third = manager.add(Cheat::new("Time", "EEEE-FFFF"));

        assert_eq!(manager.remove(second).map(|c| c.code), Some("CCCC-DDDD".to_string()));
        assert!(manager.remove(second).is_none());
        let keys: Vec<_> = manager.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![first, third]);

        let fourth = manager.add(Cheat::new("Speed", "1234"));
        let keys: Vec<_> = manager.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![first, third, fourth]);
    }

    #[test]
    fn test_stale_key_cannot_be_toggled() {
        let mut manager = CheatManager::new();
        let key = manager.add(Cheat::new("Lives", "AAAA"));
        assert!(manager.set_enabled(key, false));
        assert!(!manager.get(key).unwrap().enabled);
        manager.remove(key);
        assert!(!manager.set_enabled(key, true));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("retrorunner-cheats-{}", std::process::id()))
            .join("game.cheats.toml");

        let mut manager = CheatManager::new();
        manager.add(Cheat::new("Lives", "AAAA"));
        let ammo = manager.add(Cheat::new("Ammo", "BBBB"));
        manager.set_enabled(ammo, false);
        manager.save_file(&path).unwrap();

        let mut loaded = CheatManager::new();
        loaded.add(Cheat::new("stale", "0000"));
        assert_eq!(loaded.load_file(&path).unwrap(), 2);
        let cheats: Vec<_> = loaded.iter().map(|(_, c)| c.clone()).collect();
        assert_eq!(cheats[0], Cheat::new("Lives", "AAAA"));
        assert!(!cheats[1].enabled);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_enabled_defaults_to_true() {
        let file: CheatFile = toml::from_str("[[cheat]]\ncode = \"ABCD\"\n").unwrap();
        assert_eq!(file.cheats.len(), 1);
        assert!(file.cheats[0].enabled);
        assert!(file.cheats[0].description.is_empty());
    }
}
