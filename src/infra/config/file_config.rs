use serde::Deserialize;

use crate::{
    domain::sort_policy::SortMode,
    infra::config::{AppConfig, ChatListConfig, LogConfig},
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub chat_list: Option<FileChatListConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(chat_list) = self.chat_list {
            chat_list.merge_into(&mut config.chat_list);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileChatListConfig {
    pub sort_mode: Option<SortMode>,
}

impl FileChatListConfig {
    fn merge_into(self, config: &mut ChatListConfig) {
        if let Some(sort_mode) = self.sort_mode {
            config.sort_mode = sort_mode;
        }
    }
}
