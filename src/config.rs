use crate::error::{Error, Result};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};

pub const DEFAULT_PARAM_FILE: &str = "./param.cfg";
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";

const STACK_NAME: &str = "StackName";
const CODE_S3_BUCKET: &str = "CodeS3Bucket";
const CODE_S3_PREFIX: &str = "CodeS3Prefix";

/// Deployment parameters read from a line oriented `key=value` file.
///
/// `StackName`, `CodeS3Bucket` and `CodeS3Prefix` are pulled out into their own
/// fields. Every other line is kept whole, in file order, and handed to
/// `cloudformation deploy` as a parameter override.
#[derive(Serialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct ParamConfig {
    pub stack_name: String,
    pub code_s3_bucket: String,
    pub code_s3_prefix: String,
    pub parameters: Vec<String>,
}

impl ParamConfig {
    /// Reads and parses `path`. Bytes that are not valid UTF-8 are replaced
    /// rather than rejected.
    pub fn load(path: &Path) -> Result<ParamConfig> {
        let bytes = std::fs::read(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let config = ParamConfig::parse(&String::from_utf8_lossy(&bytes));
        debug!("param config: {}", json!(config));

        Ok(config)
    }

    pub fn parse(contents: &str) -> ParamConfig {
        let mut config = ParamConfig::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some(pair) => pair,
                None => {
                    warn!("Warning, invalid format of cfg file: '{line}'");
                    continue;
                }
            };

            match key {
                STACK_NAME => config.stack_name = value.to_string(),
                CODE_S3_BUCKET => config.code_s3_bucket = value.to_string(),
                CODE_S3_PREFIX => config.code_s3_prefix = value.to_string(),
                _ => config.parameters.push(line.to_string()),
            }
        }

        config
    }
}

/// Picks the parameter file: an explicit path wins, then `CONFIG_FILE`, then `./param.cfg`.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    resolve_path_from(explicit, std::env::var(CONFIG_FILE_ENV).ok())
}

fn resolve_path_from(explicit: Option<&Path>, from_env: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    match from_env {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => {
            info!("{CONFIG_FILE_ENV} is not available, use '{DEFAULT_PARAM_FILE}' instead");
            PathBuf::from(DEFAULT_PARAM_FILE)
        }
    }
}
