//! Command implementations for the CLI.

pub mod build;
pub mod init;
pub mod watch;

use anyhow::Context;

use crate::Reve;
use crate::config::Settings;

/// Create a `Reve` for the settings and register every configured resource.
pub fn reve_from_settings(settings: &Settings) -> anyhow::Result<Reve> {
    let base = settings.base_location();
    let mut reve = Reve::with_settings(&base, settings);

    for (name, source) in &settings.resources {
        reve.add_resource(name, source).with_context(|| format!("invalid resource `{name}`"))?;
    }

    Ok(reve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::path::PathBuf;

    fn resources(entries: &[(&str, &str)]) -> IndexMap<String, PathBuf> {
        entries
            .iter()
            .map(|(name, source)| (name.to_string(), PathBuf::from(source)))
            .collect()
    }

    #[test]
    fn test_registers_configured_resources() {
        let settings = Settings {
            base_dir: Some(PathBuf::from("/project")),
            resources: resources(&[("logo", "./logo.png"), ("font", "font.woff2")]),
            ..Settings::default()
        };

        let reve = reve_from_settings(&settings).unwrap();
        let names: Vec<_> = reve.registry().names().collect();
        assert_eq!(names, vec!["logo", "font"]);
        assert_eq!(
            reve.registry().source("font"),
            Some(std::path::Path::new("/project/font.woff2"))
        );
    }

    #[test]
    fn test_collision_is_reported() {
        let settings = Settings {
            base_dir: Some(PathBuf::from("/project")),
            resources: resources(&[("a b", "./a"), ("a_b", "./b")]),
            ..Settings::default()
        };

        let err = reve_from_settings(&settings).unwrap_err();
        assert!(format!("{err:#}").contains("same file name as `a b`"));
    }
}
