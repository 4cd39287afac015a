//! Configuration store: settings plus profiles, pages and buttons.
//!
//! Everything lives in a single YAML document, `deckforge.yaml`, under the
//! data directory. The dispatch side only ever reads a snapshot through
//! [`ConfigStore`]; mutations go through [`DeckData`] and are persisted with
//! [`FileStore::update`].
//!
//! Profiles and pages are addressed by a *key*: either the id or the name.

use crate::error::{DeckError, Result};
use crate::types::{ActionKind, ButtonConfig, Page, Profile, Settings, BUTTON_COUNT};
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Read access to the configuration, as needed at trigger time.
pub trait ConfigStore: Send + Sync {
    fn active_profile(&self) -> Result<Option<Profile>>;
}

// ---------------------------------------------------------------------------
// DeckData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckData {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl DeckData {
    /// One "Default" profile holding one 18-button page, both active.
    pub fn with_defaults() -> Self {
        let profile = Profile::new("Default");
        let settings = Settings {
            active_profile_id: profile.id.clone(),
            ..Settings::default()
        };
        Self {
            settings,
            profiles: vec![profile],
        }
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.id == self.settings.active_profile_id)
    }

    pub fn profile(&self, key: &str) -> Result<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.profiles.iter().find(|p| p.name == key))
            .ok_or_else(|| DeckError::ProfileNotFound(key.to_string()))
    }

    fn profile_index(&self, key: &str) -> Result<usize> {
        self.profiles
            .iter()
            .position(|p| p.id == key)
            .or_else(|| self.profiles.iter().position(|p| p.name == key))
            .ok_or_else(|| DeckError::ProfileNotFound(key.to_string()))
    }

    /// `None` selects the active profile.
    fn target_profile_mut(&mut self, key: Option<&str>) -> Result<&mut Profile> {
        let key = key.unwrap_or(self.settings.active_profile_id.as_str()).to_string();
        let idx = self.profile_index(&key)?;
        Ok(&mut self.profiles[idx])
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    pub fn add_profile(&mut self, name: &str) -> &Profile {
        self.profiles.push(Profile::new(name));
        &self.profiles[self.profiles.len() - 1]
    }

    /// Remove a profile. The last one cannot go; removing the active one
    /// activates the first that remains.
    pub fn delete_profile(&mut self, key: &str) -> Result<Profile> {
        let idx = self.profile_index(key)?;
        if self.profiles.len() <= 1 {
            return Err(DeckError::LastProfile);
        }
        let removed = self.profiles.remove(idx);
        if self.settings.active_profile_id == removed.id {
            self.settings.active_profile_id = self.profiles[0].id.clone();
        }
        Ok(removed)
    }

    pub fn rename_profile(&mut self, key: &str, name: &str) -> Result<()> {
        let idx = self.profile_index(key)?;
        self.profiles[idx].name = name.to_string();
        Ok(())
    }

    pub fn use_profile(&mut self, key: &str) -> Result<()> {
        let idx = self.profile_index(key)?;
        self.settings.active_profile_id = self.profiles[idx].id.clone();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pages
    // -----------------------------------------------------------------------

    pub fn add_page(&mut self, profile: Option<&str>, name: &str) -> Result<&Page> {
        let profile = self.target_profile_mut(profile)?;
        profile.pages.push(Page::new(name));
        Ok(&profile.pages[profile.pages.len() - 1])
    }

    /// Remove a page. The last page of a profile cannot go; removing the
    /// active page activates the first that remains.
    pub fn delete_page(&mut self, profile: Option<&str>, page: &str) -> Result<Page> {
        let profile = self.target_profile_mut(profile)?;
        let idx = page_index(profile, page)?;
        if profile.pages.len() <= 1 {
            return Err(DeckError::LastPage(profile.name.clone()));
        }
        let removed = profile.pages.remove(idx);
        if profile.active_page_id == removed.id {
            profile.active_page_id = profile.pages[0].id.clone();
        }
        Ok(removed)
    }

    pub fn rename_page(&mut self, profile: Option<&str>, page: &str, name: &str) -> Result<()> {
        let profile = self.target_profile_mut(profile)?;
        let idx = page_index(profile, page)?;
        profile.pages[idx].name = name.to_string();
        Ok(())
    }

    pub fn use_page(&mut self, profile: Option<&str>, page: &str) -> Result<()> {
        let profile = self.target_profile_mut(profile)?;
        let idx = page_index(profile, page)?;
        profile.active_page_id = profile.pages[idx].id.clone();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Buttons
    // -----------------------------------------------------------------------

    /// Mutable access to a button on the given page (active profile and page
    /// when `None`). A page with a broken layout is repaired first.
    pub fn button_mut(
        &mut self,
        profile: Option<&str>,
        page: Option<&str>,
        id: u32,
    ) -> Result<&mut ButtonConfig> {
        if !(1..=BUTTON_COUNT).contains(&id) {
            return Err(DeckError::InvalidButtonId(id));
        }
        let profile = self.target_profile_mut(profile)?;
        let page_key = page.unwrap_or(profile.active_page_id.as_str()).to_string();
        let idx = page_index(profile, &page_key)?;
        let page = &mut profile.pages[idx];
        if page.button(id).is_none() {
            page.normalize_layout();
        }
        page.button_mut(id)
            .ok_or_else(|| DeckError::PageNotFound(page_key.clone()))
    }

    /// Replace a button wholesale. The button keeps the slot's id.
    pub fn set_button(
        &mut self,
        profile: Option<&str>,
        page: Option<&str>,
        id: u32,
        mut button: ButtonConfig,
    ) -> Result<()> {
        let slot = self.button_mut(profile, page, id)?;
        button.id = id;
        *slot = button;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<StoreWarning> {
        let mut warnings = Vec::new();

        if self.profiles.is_empty() {
            warnings.push(StoreWarning::new("no profiles defined"));
        } else if self.active_profile().is_none() {
            warnings.push(StoreWarning::new(format!(
                "active profile '{}' does not exist",
                self.settings.active_profile_id
            )));
        }

        for profile in &self.profiles {
            if profile.pages.is_empty() {
                warnings.push(StoreWarning::new(format!(
                    "profile '{}' has no pages",
                    profile.name
                )));
            } else if profile.active_page().is_none() {
                warnings.push(StoreWarning::new(format!(
                    "profile '{}': active page '{}' does not exist",
                    profile.name, profile.active_page_id
                )));
            }

            for page in &profile.pages {
                if !page.has_full_layout() {
                    warnings.push(StoreWarning::new(format!(
                        "page '{}' in profile '{}' does not hold exactly {BUTTON_COUNT} buttons numbered 1..{BUTTON_COUNT}",
                        page.name, profile.name
                    )));
                }
                for button in &page.buttons {
                    for action in &button.actions {
                        if action.kind.parse::<ActionKind>().is_err() {
                            warnings.push(StoreWarning::new(format!(
                                "button {} on page '{}' uses unknown action '{}'",
                                button.id, page.name, action.kind
                            )));
                        }
                    }
                }
            }
        }

        warnings
    }
}

fn page_index(profile: &Profile, key: &str) -> Result<usize> {
    profile
        .pages
        .iter()
        .position(|p| p.id == key)
        .or_else(|| profile.pages.iter().position(|p| p.name == key))
        .ok_or_else(|| DeckError::PageNotFound(key.to_string()))
}

impl ConfigStore for DeckData {
    fn active_profile(&self) -> Result<Option<Profile>> {
        Ok(DeckData::active_profile(self).cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreWarning {
    pub message: String,
}

impl StoreWarning {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// `deckforge.yaml` on disk. Every read goes to the file, so a trigger always
/// sees the latest saved configuration.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir` (the file is `dir/deckforge.yaml`).
    pub fn open(dir: &Path) -> Self {
        Self {
            path: paths::data_file(dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, writing the defaults first if it does not exist yet.
    pub fn load(&self) -> Result<DeckData> {
        if !self.path.exists() {
            let data = DeckData::with_defaults();
            self.save(&data)?;
            tracing::info!(path = %self.path.display(), "created default configuration");
            return Ok(data);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(DeckData::with_defaults());
        }
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn save(&self, data: &DeckData) -> Result<()> {
        let yaml = serde_yaml::to_string(data)?;
        io::atomic_write(&self.path, yaml.as_bytes())
    }

    /// Load, apply `f`, and save only if `f` succeeds.
    pub fn update<T>(&self, f: impl FnOnce(&mut DeckData) -> Result<T>) -> Result<T> {
        let mut data = self.load()?;
        let out = f(&mut data)?;
        self.save(&data)?;
        Ok(out)
    }
}

impl ConfigStore for FileStore {
    fn active_profile(&self) -> Result<Option<Profile>> {
        Ok(self.load()?.active_profile().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionDescriptor;
    use tempfile::TempDir;

    #[test]
    fn defaults_have_one_active_profile_and_page() {
        let data = DeckData::with_defaults();
        let profile = data.active_profile().unwrap();
        assert_eq!(profile.name, "Default");
        let page = profile.active_page().unwrap();
        assert_eq!(page.name, "Page 1");
        assert_eq!(page.buttons.len(), 18);
        assert!(data.validate().is_empty());
    }

    #[test]
    fn first_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path());
        assert!(!store.path().exists());
        let first = store.load().unwrap();
        assert!(store.path().exists());
        let second = store.load().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn update_persists_and_failed_update_does_not() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path());
        store
            .update(|d| {
                d.add_profile("Streaming");
                Ok(())
            })
            .unwrap();
        assert_eq!(store.load().unwrap().profiles.len(), 2);

        let err = store
            .update(|d| {
                d.add_profile("Ghost");
                d.use_profile("missing")
            })
            .unwrap_err();
        assert!(matches!(err, DeckError::ProfileNotFound(_)));
        assert_eq!(store.load().unwrap().profiles.len(), 2);
    }

    #[test]
    fn last_profile_cannot_be_deleted() {
        let mut data = DeckData::with_defaults();
        let err = data.delete_profile("Default").unwrap_err();
        assert!(matches!(err, DeckError::LastProfile));
    }

    #[test]
    fn deleting_active_profile_activates_first_remaining() {
        let mut data = DeckData::with_defaults();
        let work_id = data.add_profile("Work").id.clone();
        data.use_profile("Default").unwrap();
        data.delete_profile("Default").unwrap();
        assert_eq!(data.settings.active_profile_id, work_id);
    }

    #[test]
    fn last_page_cannot_be_deleted() {
        let mut data = DeckData::with_defaults();
        let err = data.delete_page(None, "Page 1").unwrap_err();
        assert!(matches!(err, DeckError::LastPage(ref name) if name == "Default"));
    }

    #[test]
    fn deleting_active_page_activates_first_remaining() {
        let mut data = DeckData::with_defaults();
        let page2 = data.add_page(None, "Page 2").unwrap().id.clone();
        data.use_page(None, "Page 1").unwrap();
        data.delete_page(None, "Page 1").unwrap();
        let profile = data.active_profile().unwrap();
        assert_eq!(profile.active_page_id, page2);
        assert_eq!(profile.pages.len(), 1);
    }

    #[test]
    fn rename_by_id_or_name() {
        let mut data = DeckData::with_defaults();
        let id = data.profiles[0].id.clone();
        data.rename_profile(&id, "Main").unwrap();
        data.rename_page(Some("Main"), "Page 1", "Home").unwrap();
        assert_eq!(data.profiles[0].name, "Main");
        assert_eq!(data.profiles[0].pages[0].name, "Home");
    }

    #[test]
    fn set_button_checks_id_range() {
        let mut data = DeckData::with_defaults();
        let err = data
            .set_button(None, None, 19, ButtonConfig::new(19))
            .unwrap_err();
        assert!(matches!(err, DeckError::InvalidButtonId(19)));

        let mut button = ButtonConfig::new(0);
        button.label = "Mute".into();
        button
            .actions
            .push(ActionDescriptor::bare(ActionKind::MediaMute));
        data.set_button(None, None, 4, button).unwrap();
        let page = data.active_profile().unwrap().active_page().unwrap();
        let stored = page.button(4).unwrap();
        assert_eq!(stored.id, 4);
        assert_eq!(stored.label, "Mute");
    }

    #[test]
    fn button_mut_repairs_broken_layout() {
        let mut data = DeckData::with_defaults();
        data.profiles[0].pages[0].buttons.retain(|b| b.id != 7);
        data.button_mut(None, None, 7).unwrap().enabled = false;
        let page = &data.profiles[0].pages[0];
        assert!(page.has_full_layout());
        assert!(!page.button(7).unwrap().enabled);
    }

    #[test]
    fn validate_reports_problems() {
        let mut data = DeckData::with_defaults();
        data.profiles[0].pages[0].buttons.pop();
        data.profiles[0].pages[0].buttons[0]
            .actions
            .push(ActionDescriptor::new("launch-rocket", Default::default()));
        data.settings.active_profile_id = "nope".into();
        let messages: Vec<String> = data.validate().into_iter().map(|w| w.message).collect();
        assert_eq!(messages.len(), 3, "{messages:?}");
        assert!(messages.iter().any(|m| m.contains("active profile 'nope'")));
        assert!(messages.iter().any(|m| m.contains("launch-rocket")));
        assert!(messages.iter().any(|m| m.contains("exactly 18 buttons")));
    }

    #[test]
    fn yaml_uses_camel_case_keys() {
        let yaml = serde_yaml::to_string(&DeckData::with_defaults()).unwrap();
        assert!(yaml.contains("activeProfileId:"));
        assert!(yaml.contains("activePageId:"));
        assert!(yaml.contains("bridgePort: 9271"));
    }
}
