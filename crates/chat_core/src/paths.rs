use std::path::PathBuf;

/// 获取应用数据目录 (~/.chat_shell)
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".chat_shell")
}

/// 获取 config.json 路径
pub fn config_json_path() -> PathBuf {
    app_dir().join("config.json")
}

/// 默认的会话数据目录
pub fn default_data_dir() -> PathBuf {
    app_dir().join("data")
}

