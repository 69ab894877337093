//! User-facing text, selected by locale.
//!
//! Every supported locale is one row of [`CATALOGS`]. Adding a language means adding a row;
//! no control flow changes.

use crate::services::prerequisite::RuntimeComponent;
use std::collections::BTreeSet;
use std::env;

pub const DEFAULT_LOCALE: &str = "en-US";

/// All text for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCatalog {
    pub error_title: &'static str,
    pub warning_title: &'static str,
    /// `{components}` is replaced by the missing runtime names
    pub missing_runtimes: &'static str,
    pub tooling_unavailable: &'static str,
    /// `{path}` is replaced by the config file path
    pub config_unreadable: &'static str,
    /// `{section}` is replaced by the section name
    pub missing_section: &'static str,
    /// `{section}` and `{key}` are replaced
    pub missing_key: &'static str,
    /// `{path}` is replaced by the expected executable path
    pub executable_not_found: &'static str,
    /// `{code}` and `{message}` are replaced with the OS error
    pub spawn_failed: &'static str,
    pub list_separator: &'static str,
    pub documentation_url: &'static str,
}

pub const CATALOGS: &[(&str, MessageCatalog)] = &[
    (
        "en-US",
        MessageCatalog {
            error_title: "LumiTracker - Error",
            warning_title: "LumiTracker - Warning",
            missing_runtimes: "The following runtime is not installed: {components}.\n\nPress OK to open the download page.",
            tooling_unavailable: "The .NET runtime could not be found on this computer.\n\nPress OK to open the download page and install the .NET Desktop Runtime 8.",
            config_unreadable: "Failed to read the configuration file:\n{path}",
            missing_section: "No '{section}' section found in the configuration file.",
            missing_key: "No '{key}' specified in the '{section}' section of the configuration file.",
            executable_not_found: "The application executable was not found:\n{path}\n\nPlease reinstall the application.",
            spawn_failed: "Failed to start the application (error {code}):\n{message}",
            list_separator: ", ",
            documentation_url: "https://dotnet.microsoft.com/en-us/download/dotnet/8.0",
        },
    ),
    (
        "zh-CN",
        MessageCatalog {
            error_title: "LumiTracker - 错误",
            warning_title: "LumiTracker - 警告",
            missing_runtimes: "未安装以下运行时：{components}。\n\n点击“确定”打开下载页面。",
            tooling_unavailable: "未在此电脑上找到 .NET 运行时。\n\n点击“确定”打开下载页面，并安装 .NET 桌面运行时 8。",
            config_unreadable: "无法读取配置文件：\n{path}",
            missing_section: "配置文件中缺少“{section}”节。",
            missing_key: "配置文件的“{section}”节中缺少“{key}”。",
            executable_not_found: "未找到应用程序：\n{path}\n\n请重新安装。",
            spawn_failed: "启动应用程序失败（错误 {code}）：\n{message}",
            list_separator: "、",
            documentation_url: "https://dotnet.microsoft.com/zh-cn/download/dotnet/8.0",
        },
    ),
];

/// Catalog for a locale tag, falling back to [`DEFAULT_LOCALE`].
pub fn catalog_for(locale: &str) -> &'static MessageCatalog {
    CATALOGS
        .iter()
        .find(|(tag, _)| *tag == locale)
        .or_else(|| CATALOGS.iter().find(|(tag, _)| *tag == DEFAULT_LOCALE))
        .map(|(_, catalog)| catalog)
        .unwrap_or(&CATALOGS[0].1)
}

/// Map a raw locale string (`zh_CN.UTF-8`, `zh-Hans`, `en_GB`) to a supported tag.
pub fn normalize_locale(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("zh") {
        return Some("zh-CN");
    }
    if lowered.starts_with("en") {
        return Some("en-US");
    }
    None
}

/// Detect the user's locale from the environment, then the OS.
pub fn detect_locale() -> &'static str {
    for env_key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = env::var(env_key) {
            if let Some(locale) = normalize_locale(&value) {
                return locale;
            }
        }
    }

    if let Some(locale) = system_locale().as_deref().and_then(normalize_locale) {
        return locale;
    }

    DEFAULT_LOCALE
}

#[cfg(windows)]
fn system_locale() -> Option<String> {
    use windows::Win32::Globalization::GetUserDefaultLocaleName;

    // LOCALE_NAME_MAX_LENGTH
    let mut buffer = [0u16; 85];
    // SAFETY: the buffer is valid for its whole length
    let len = unsafe { GetUserDefaultLocaleName(&mut buffer) };
    if len <= 1 {
        return None;
    }
    Some(String::from_utf16_lossy(&buffer[..(len as usize - 1)]))
}

#[cfg(not(windows))]
fn system_locale() -> Option<String> {
    None
}

impl MessageCatalog {
    pub fn missing_runtimes(&self, missing: &BTreeSet<RuntimeComponent>) -> String {
        let components = missing
            .iter()
            .map(|c| c.display_name())
            .collect::<Vec<_>>()
            .join(self.list_separator);
        self.missing_runtimes.replace("{components}", &components)
    }

    pub fn config_unreadable(&self, path: &str) -> String {
        self.config_unreadable.replace("{path}", path)
    }

    pub fn missing_section(&self, section: &str) -> String {
        self.missing_section.replace("{section}", section)
    }

    pub fn missing_key(&self, section: &str, key: &str) -> String {
        self.missing_key
            .replace("{section}", section)
            .replace("{key}", key)
    }

    pub fn executable_not_found(&self, path: &str) -> String {
        self.executable_not_found.replace("{path}", path)
    }

    pub fn spawn_failed(&self, code: Option<i32>, message: &str) -> String {
        let code = code.map_or_else(|| "?".to_string(), |c| c.to_string());
        self.spawn_failed
            .replace("{code}", &code)
            .replace("{message}", message)
    }
}
