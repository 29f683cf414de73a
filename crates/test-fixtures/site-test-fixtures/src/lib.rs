use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    configs: HashMap<String, String>,
    layouts: HashMap<String, String>,
    scripts: HashMap<String, ScriptEntry>,
}

/// Scripts may name the layout they were recorded against.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        layout: Option<String>,
    },
}

impl ScriptEntry {
    fn as_path(&self) -> &str {
        match self {
            ScriptEntry::Path(path) => path,
            ScriptEntry::Detailed { path, .. } => path,
        }
    }

    fn layout(&self) -> Option<&str> {
        match self {
            ScriptEntry::Path(_) => None,
            ScriptEntry::Detailed { layout, .. } => layout.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        super::load_json(rel)
    }
}

pub mod layouts {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.layouts.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.layouts, "layout", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.layouts, "layout", name)?;
        super::load_json(rel)
    }
}

pub mod scripts {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.scripts.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        super::load_json(entry.as_path())
    }

    /// Layout fixture name the script was recorded against, if any.
    pub fn layout(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        Ok(entry.layout().map(str::to_string))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}
