use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use toml_edit::DocumentMut;

use crate::{
    domain::sort_policy::SortMode,
    infra::{config, error::AppError},
    usecases::contracts::SettingsGateway,
};

const SETTINGS_SORT_MODE_SAVED: &str = "SETTINGS_SORT_MODE_SAVED";
const CHAT_LIST_SECTION: &str = "chat_list";
const SORT_MODE_KEY: &str = "sort_mode";

/// Sort mode stored as `chat_list.sort_mode` in the TOML config file.
/// Saving rewrites only that key; comments and other settings are kept.
#[derive(Debug, Clone)]
pub struct TomlSettingsGateway {
    path: PathBuf,
}

impl TomlSettingsGateway {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: config::resolve_path(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<DocumentMut, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(AppError::ConfigRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        raw.parse::<DocumentMut>()
            .map_err(|source| AppError::ConfigEdit {
                path: self.path.clone(),
                source,
            })
    }

    fn write_sort_mode(&self, mode: SortMode) -> Result<(), AppError> {
        let mut document = self.read_document()?;

        document
            .entry(CHAT_LIST_SECTION)
            .or_insert(toml_edit::table())
            .as_table_like_mut()
            .ok_or_else(|| AppError::ConfigShape {
                path: self.path.clone(),
                section: CHAT_LIST_SECTION,
            })?
            .insert(SORT_MODE_KEY, toml_edit::value(mode.as_str()));

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| AppError::ConfigWrite {
                path: self.path.clone(),
                source,
            })?;
        }

        fs::write(&self.path, document.to_string()).map_err(|source| AppError::ConfigWrite {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsGateway for TomlSettingsGateway {
    fn load_sort_mode(&self) -> Result<SortMode> {
        Ok(config::load(Some(&self.path))?.chat_list.sort_mode)
    }

    fn save_sort_mode(&mut self, mode: SortMode) -> Result<()> {
        self.write_sort_mode(mode)?;

        tracing::info!(
            code = SETTINGS_SORT_MODE_SAVED,
            path = %self.path.display(),
            sort_mode = %mode,
            "sort mode persisted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_default_mode() {
        let dir = tempfile::tempdir().expect("temp dir must be creatable");
        let gateway = TomlSettingsGateway::new(Some(&dir.path().join("config.toml")));

        let mode = gateway.load_sort_mode().expect("load must succeed");

        assert_eq!(mode, SortMode::Recency);
    }

    #[test]
    fn save_creates_file_and_round_trips_mode() {
        let dir = tempfile::tempdir().expect("temp dir must be creatable");
        let path = dir.path().join("nested").join("config.toml");
        let mut gateway = TomlSettingsGateway::new(Some(&path));

        gateway
            .save_sort_mode(SortMode::UnreadFirst)
            .expect("save must succeed");

        assert_eq!(
            gateway.load_sort_mode().expect("load must succeed"),
            SortMode::UnreadFirst
        );
        let raw = fs::read_to_string(&path).expect("file must exist");
        assert!(raw.contains("[chat_list]"));
        assert!(raw.contains("sort_mode = \"unread_first\""));
    }

    #[test]
    fn save_preserves_comments_and_other_settings() {
        let dir = tempfile::tempdir().expect("temp dir must be creatable");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            concat!(
                "# user settings\n",
                "[logging]\n",
                "level = \"debug\" # noisy\n",
                "\n",
                "[chat_list]\n",
                "sort_mode = \"unread_first\"\n",
            ),
        )
        .expect("must write test config");
        let mut gateway = TomlSettingsGateway::new(Some(&path));

        gateway
            .save_sort_mode(SortMode::Recency)
            .expect("save must succeed");

        let raw = fs::read_to_string(&path).expect("file must exist");
        assert!(raw.starts_with("# user settings\n"));
        assert!(raw.contains("level = \"debug\" # noisy"));
        assert!(raw.contains("sort_mode = \"recency\""));
        assert!(!raw.contains("unread_first"));

        let config = config::load(Some(&path)).expect("config must load");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.chat_list.sort_mode, SortMode::Recency);
    }

    #[test]
    fn save_rejects_non_table_section() {
        let dir = tempfile::tempdir().expect("temp dir must be creatable");
        let path = dir.path().join("config.toml");
        fs::write(&path, "chat_list = 3\n").expect("must write test config");
        let gateway = TomlSettingsGateway::new(Some(&path));

        let error = gateway
            .write_sort_mode(SortMode::UnreadFirst)
            .expect_err("scalar section must be rejected");

        assert!(matches!(error, AppError::ConfigShape { .. }));
    }
}
