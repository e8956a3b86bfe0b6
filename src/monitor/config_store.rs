use crate::error::QueryError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub trait ConfigStore {
    fn get(&self, section: &str, key: &str) -> Result<String, QueryError>;
}

/// The CLI's `pvpn-cli.cfg`, re-read on every lookup.
pub struct IniConfigStore {
    path: PathBuf,
}

impl IniConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ConfigStore for IniConfigStore {
    fn get(&self, section: &str, key: &str) -> Result<String, QueryError> {
        let content = fs::read_to_string(&self.path).map_err(|source| QueryError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_ini(&content)
            .remove(&(section.to_string(), key.to_lowercase()))
            .ok_or_else(|| QueryError::NotFound {
                section: section.to_string(),
                key: key.to_string(),
            })
    }
}

/// Sections are case-sensitive, keys are not.
fn parse_ini(content: &str) -> HashMap<(String, String), String> {
    let mut values = HashMap::new();
    let mut section: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = Some(name.trim().to_string());
            continue;
        }
        let Some(current) = &section else {
            continue;
        };
        let Some(split) = line.find(['=', ':']) else {
            continue;
        };
        let (key, value) = line.split_at(split);
        values.insert(
            (current.clone(), key.trim().to_lowercase()),
            value[1..].trim().to_string(),
        );
    }

    values
}
