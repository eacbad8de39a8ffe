//! Core option variables
//!
//! A Core declares each option as `key -> "Description; first|second|third"`.
//! The first option is the default. The live value survives re-declaration,
//! and a value the host set before the declaration wins over the default.

use std::collections::HashMap;
use std::ffi::{c_char, CString};

/// One declared option
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Variable {
    pub key: String,
    /// Live value handed to the Core
    pub value: String,
    pub description: String,
    pub options: Vec<String>,
}

impl Variable {
    /// Parse a `"Description; a|b|c"` declaration
    pub fn parse(key: &str, declaration: &str) -> Self {
        let (description, options) = match declaration.split_once(';') {
            Some((description, options)) => (description, options.trim_start()),
            None => (declaration, ""),
        };
        let options: Vec<String> = if options.is_empty() {
            Vec::new()
        } else {
            options.split('|').map(str::to_string).collect()
        };

        Self {
            key: key.to_string(),
            value: options.first().cloned().unwrap_or_default(),
            description: description.trim().to_string(),
            options,
        }
    }
}

#[derive(Debug, Default)]
pub struct VariableStore {
    variables: HashMap<String, Variable>,
    /// Host values for keys the Core has not declared yet
    pending: HashMap<String, String>,
    /// NUL-terminated copies of live values handed out by `GET_VARIABLE`
    c_values: HashMap<String, CString>,
    dirty: bool,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration from the Core
    pub fn declare(&mut self, key: &str, declaration: &str) {
        let mut declared = Variable::parse(key, declaration);
        if let Some(existing) = self.variables.get(key) {
            if !existing.value.is_empty() {
                declared.value = existing.value.clone();
            }
        }
        if let Some(value) = self.pending.remove(key) {
            declared.value = value;
        }
        tracing::debug!("Variable {} = {:?} ({})", key, declared.value, declared.description);
        self.c_values.remove(key);
        self.variables.insert(key.to_string(), declared);
    }

    /// Set a live value from the host
    ///
    /// Unknown keys are remembered until the Core declares them. With
    /// `notify_core` the Core sees the change on its next update poll.
    pub fn set(&mut self, key: &str, value: &str, notify_core: bool) {
        match self.variables.get_mut(key) {
            Some(variable) => {
                variable.value = value.to_string();
                self.c_values.remove(key);
            }
            None => {
                self.pending.insert(key.to_string(), value.to_string());
            }
        }
        if notify_core {
            self.dirty = true;
        }
    }

    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.variables.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|v| v.value.as_str())
    }

    /// Pointer to the live value, valid until the value changes
    pub fn value_ptr(&mut self, key: &str) -> Option<*const c_char> {
        let variable = self.variables.get(key)?;
        if !self.c_values.contains_key(key) {
            let value = CString::new(variable.value.as_str()).ok()?;
            self.c_values.insert(key.to_string(), value);
        }
        self.c_values.get(key).map(|v| v.as_ptr())
    }

    /// Report and clear the changed flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_parse_declaration() {
        let v = Variable::parse("nes_palette", "Color Palette; default|raw|custom");
        assert_eq!(v.description, "Color Palette");
        assert_eq!(v.options, vec!["default", "raw", "custom"]);
        assert_eq!(v.value, "default");
    }

    #[test]
    fn test_parse_without_options() {
        let v = Variable::parse("x", "Just a label");
        assert_eq!(v.description, "Just a label");
        assert!(v.options.is_empty());
        assert_eq!(v.value, "");
    }

    #[test]
    fn test_redeclaration_keeps_live_value() {
        let mut store = VariableStore::new();
        store.declare("speed", "Speed; normal|fast");
        store.set("speed", "fast", false);
        store.declare("speed", "Speed; normal|fast|turbo");
        assert_eq!(store.value("speed"), Some("fast"));
        assert_eq!(store.get("speed").unwrap().options.len(), 3);
    }

    #[test]
    fn test_pending_host_value_wins_over_default() {
        let mut store = VariableStore::new();
        store.set("region", "PAL", true);
        assert!(store.get("region").is_none());
        store.declare("region", "Region; NTSC|PAL");
        assert_eq!(store.value("region"), Some("PAL"));
    }

    #[test]
    fn test_dirty_flag_reported_once() {
        let mut store = VariableStore::new();
        store.declare("a", "A; 1|2");
        assert!(!store.take_dirty());
        store.set("a", "2", false);
        assert!(!store.take_dirty());
        store.set("a", "1", true);
        assert!(store.take_dirty());
        assert!(!store.take_dirty());
    }

    #[test]
    fn test_value_ptr_tracks_changes() {
        let mut store = VariableStore::new();
        store.declare("a", "A; one|two");
        let ptr = store.value_ptr("a").unwrap();
        assert_eq!(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap(), "one");

        store.set("a", "two", true);
        let ptr = store.value_ptr("a").unwrap();
        assert_eq!(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap(), "two");
        assert!(store.value_ptr("missing").is_none());
    }
}
