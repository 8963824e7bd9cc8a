use crate::config;
use crate::function::{self, FunctionDescriptor};
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET: &str = "x86_64-unknown-linux-musl";
pub const DEFAULT_CAPABILITIES: &str = "CAPABILITY_IAM";

/// Everything the pipeline needs to know up front. Built once in `main` and
/// never mutated afterwards.
///
/// Relative paths are relative to `root`, which is also the working directory
/// of every external command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub functions: Vec<FunctionDescriptor>,
    pub output_dir: PathBuf,
    pub target: String,
    pub target_dir: PathBuf,
    pub template_file: PathBuf,
    pub output_template_file: PathBuf,
    pub config_file: Option<PathBuf>,
    pub capabilities: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            root: PathBuf::from("."),
            functions: function::default_functions(),
            output_dir: PathBuf::from("build"),
            target: DEFAULT_TARGET.to_string(),
            target_dir: PathBuf::from("target"),
            template_file: PathBuf::from("./template.yml"),
            output_template_file: PathBuf::from("./sam.yml"),
            config_file: None,
            capabilities: DEFAULT_CAPABILITIES.to_string(),
        }
    }
}

impl Settings {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Where the build step leaves the binary for `function`.
    pub fn output_path(&self, function: &FunctionDescriptor) -> PathBuf {
        self.output_dir().join(&function.name)
    }

    /// Where cargo writes the cross compiled binary for `function`.
    pub fn artifact_path(&self, function: &FunctionDescriptor) -> PathBuf {
        self.resolve(&self.target_dir)
            .join(&self.target)
            .join("release")
            .join(&function.name)
    }

    /// The parameter file to read, re-evaluated on every call so `CONFIG_FILE`
    /// is picked up fresh.
    pub fn param_file(&self) -> PathBuf {
        self.resolve(&config::resolve_path(self.config_file.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted() {
        let settings = Settings {
            root: PathBuf::from("/work/app"),
            ..Default::default()
        };
        let function = FunctionDescriptor::new("reader", "./functions/reader");

        assert_eq!(settings.output_path(&function), PathBuf::from("/work/app/build/reader"));
        assert_eq!(
            settings.artifact_path(&function),
            PathBuf::from("/work/app/target/x86_64-unknown-linux-musl/release/reader")
        );
    }

    #[test]
    fn explicit_param_file_is_rooted() {
        let settings = Settings {
            root: PathBuf::from("/work/app"),
            config_file: Some(PathBuf::from("prod.cfg")),
            ..Default::default()
        };

        assert_eq!(settings.param_file(), PathBuf::from("/work/app/prod.cfg"));
    }

    #[test]
    fn absolute_param_file_is_kept() {
        let settings = Settings {
            root: PathBuf::from("/work/app"),
            config_file: Some(PathBuf::from("/etc/deploy/param.cfg")),
            ..Default::default()
        };

        assert_eq!(settings.param_file(), PathBuf::from("/etc/deploy/param.cfg"));
    }
}
