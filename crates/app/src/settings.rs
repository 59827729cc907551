use bursa_core::config::ClientConfig;
use config::{Config, ConfigError, Environment, File, Source};

/// 默认配置文件名（不带扩展名），文件不存在时使用内置默认值
const CONFIG_FILE: &str = "bursa";

/// # Summary
/// 加载客户端配置。
///
/// # Logic
/// 1. 读取工作目录下可选的 `bursa.{toml,yaml,json}`。
/// 2. 叠加 `BURSA_` 前缀的环境变量，层级以 `__` 分隔，例如 `BURSA_BACKEND__BASE_URL`。
/// 3. 未出现的字段回落到各配置段的默认值。
pub fn load() -> Result<ClientConfig, ConfigError> {
    build(File::with_name(CONFIG_FILE).required(false))
}

fn build<S>(file: S) -> Result<ClientConfig, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("BURSA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
