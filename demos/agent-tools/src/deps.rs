//! Process-wide values the loader registers before building tools.

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub project_name: String,
    pub max_iterations: u32,
    #[serde(default)]
    pub debug_mode: bool,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config(project={}, max_iter={})",
            self.project_name, self.max_iterations
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Runtime {
    pub model_name: String,
    pub api_endpoint: String,
    pub timeout: u64,
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime(model={}, timeout={}s)", self.model_name, self.timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Approval {
    pub yolo_mode: bool,
}

impl fmt::Display for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.yolo_mode {
            f.write_str("Approval(YOLO (auto-approve))")
        } else {
            f.write_str("Approval(Manual approval)")
        }
    }
}

/// Selects one of the dependency types on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dependency {
    Config,
    Runtime,
    Approval,
}
