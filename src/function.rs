use crate::error::Error;
use serde::Serialize;
use std::{path::PathBuf, str::FromStr};

/// A deployable lambda: the binary name and the directory of its cargo package.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub path: PathBuf,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        FunctionDescriptor {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join("Cargo.toml")
    }
}

/// Parses `name=path`, as accepted by `--function`.
impl FromStr for FunctionDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
                Ok(FunctionDescriptor::new(name.trim(), path.trim()))
            }
            _ => Err(Error::InvalidFunction(s.to_string())),
        }
    }
}

pub fn default_functions() -> Vec<FunctionDescriptor> {
    vec![FunctionDescriptor::new("myfunc", "./functions/myfunc")]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_path() {
        let function: FunctionDescriptor = "email_index_writer=./functions/writer".parse().unwrap();

        assert_eq!(function.name, "email_index_writer");
        assert_eq!(function.path, PathBuf::from("./functions/writer"));
        assert_eq!(
            function.manifest_path(),
            PathBuf::from("./functions/writer/Cargo.toml")
        );
    }

    #[test]
    fn rejects_incomplete_descriptors() {
        for input in ["writer", "=./functions/writer", "writer=", " = "] {
            assert!(
                matches!(input.parse::<FunctionDescriptor>(), Err(Error::InvalidFunction(_))),
                "{input} should be rejected"
            );
        }
    }
}
