use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::models::{MasterStore, RoleRegistry};
use crate::theme::SchemeCatalogue;

/// Read-only inputs shared by every emission. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub master: Arc<MasterStore>,
    pub roles: Arc<RoleRegistry>,
    pub schemes: Arc<SchemeCatalogue>,
}

impl AppState {
    /// Loads the master store, role registry and scheme catalogue named by
    /// `config`.
    pub fn load(config: Config) -> Result<Self> {
        let master = MasterStore::load(&config.master_path).context("Failed to load master store")?;
        let roles = RoleRegistry::load(&config.roles_path).context("Failed to load role configuration")?;
        let schemes = match &config.schemes_dir {
            Some(dir) => SchemeCatalogue::load_dir(dir).context("Failed to load color schemes")?,
            None => SchemeCatalogue::builtin(),
        };
        info!(
            name = %master.contact.name,
            roles = roles.len(),
            schemes = schemes.len(),
            "Inputs loaded"
        );
        Ok(Self::new(config, master, roles, schemes))
    }

    pub fn new(
        config: Config,
        master: MasterStore,
        roles: RoleRegistry,
        schemes: SchemeCatalogue,
    ) -> Self {
        Self {
            config: Arc::new(config),
            master: Arc::new(master),
            roles: Arc::new(roles),
            schemes: Arc::new(schemes),
        }
    }

    /// File name prefix: the configured one, else the contact name as a
    /// lowercase `first_last` slug.
    pub fn base_name(&self) -> String {
        let configured = self.config.base_name.as_deref().map(str::trim);
        match configured {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let slug = slug::slugify(&self.master.contact.name).replace('-', "_");
                if slug.is_empty() {
                    "resume".to_string()
                } else {
                    slug
                }
            }
        }
    }

    /// Roles to emit: the configured list (each checked against the
    /// registry) or every registered role.
    pub fn selected_roles(&self) -> Result<Vec<String>> {
        if self.config.roles.is_empty() {
            return Ok(self.roles.keys().map(str::to_string).collect());
        }
        for role in &self.config.roles {
            self.roles.get(role).context("Role selection is invalid")?;
        }
        Ok(self.config.roles.clone())
    }

    /// Schemes to emit: the configured list (each checked against the
    /// catalogue) or the whole catalogue.
    pub fn selected_schemes(&self) -> Result<Vec<String>> {
        if self.config.schemes.is_empty() {
            return Ok(self.schemes.keys().map(str::to_string).collect());
        }
        for scheme in &self.config.schemes {
            self.schemes.get(scheme).context("Scheme selection is invalid")?;
        }
        Ok(self.config.schemes.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{make_master, make_roles};

    fn make_state(config: Config) -> AppState {
        AppState::new(config, make_master(), make_roles(), SchemeCatalogue::builtin())
    }

    #[test]
    fn test_base_name_from_contact() {
        let state = make_state(Config::default());
        assert_eq!(state.base_name(), "jordan_rivera");
    }

    #[test]
    fn test_base_name_configured() {
        let state = make_state(Config {
            base_name: Some("JR".to_string()),
            ..Config::default()
        });
        assert_eq!(state.base_name(), "JR");
    }

    #[test]
    fn test_selection_defaults_to_everything() {
        let state = make_state(Config::default());
        assert_eq!(state.selected_roles().unwrap().len(), state.roles.len());
        assert_eq!(state.selected_schemes().unwrap().len(), 8);
    }

    #[test]
    fn test_unknown_selection_rejected() {
        let state = make_state(Config {
            roles: vec!["astronaut".to_string()],
            ..Config::default()
        });
        assert!(state.selected_roles().is_err());

        let state = make_state(Config {
            schemes: vec!["mauve".to_string()],
            ..Config::default()
        });
        assert!(state.selected_schemes().is_err());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let master_path = dir.path().join("master.json");
        let roles_path = dir.path().join("roles.json");
        std::fs::write(&master_path, serde_json::to_string(&make_master()).unwrap()).unwrap();
        std::fs::write(
            &roles_path,
            r#"{"backend": {"include_positions": ["initech"]}}"#,
        )
        .unwrap();

        let state = AppState::load(Config {
            master_path,
            roles_path,
            ..Config::default()
        })
        .unwrap();
        assert_eq!(state.master.contact.name, "Jordan Rivera");
        assert_eq!(state.selected_roles().unwrap(), vec!["backend".to_string()]);
    }

    #[test]
    fn test_load_missing_master_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppState::load(Config {
            master_path: dir.path().join("absent.json"),
            ..Config::default()
        });
        let err = result.err().unwrap();
        assert!(format!("{err:#}").contains("master store"));
    }
}
