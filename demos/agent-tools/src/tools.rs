use std::sync::Arc;

use tioc::{BasicContainer, Injectable, ResolutionError};
use tracing::{info, warn};

use crate::deps::{Approval, Config, Runtime};

/// A loaded tool, runnable with its sample input.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn run_sample(&self) -> String;

    /// Injected dependencies, rendered for display.
    fn dependencies(&self) -> Vec<String>;
}

#[derive(Injectable)]
pub struct ReadFileTool {
    pub config: Arc<Config>,
    pub approval: Arc<Approval>,
}

impl ReadFileTool {
    pub fn execute(&self, filepath: &str) -> String {
        format!(
            "[ReadFile] Reading {}... (approved={})",
            filepath, self.approval.yolo_mode
        )
    }
}

impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "ReadFileTool"
    }

    fn dependencies(&self) -> Vec<String> {
        vec![self.config.to_string(), self.approval.to_string()]
    }

    fn run_sample(&self) -> String {
        self.execute("example.txt")
    }
}

#[derive(Injectable)]
pub struct WriteFileTool {
    pub config: Arc<Config>,
    pub approval: Arc<Approval>,
    pub runtime: Arc<Runtime>,
}

impl WriteFileTool {
    pub fn execute(&self, filepath: &str, _content: &str) -> String {
        if !self.approval.yolo_mode {
            return format!("[WriteFile] Approval required for {}", filepath);
        }
        format!(
            "[WriteFile] Writing to {}... (timeout={}s)",
            filepath, self.runtime.timeout
        )
    }
}

impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "WriteFileTool"
    }

    fn dependencies(&self) -> Vec<String> {
        vec![
            self.config.to_string(),
            self.approval.to_string(),
            self.runtime.to_string(),
        ]
    }

    fn run_sample(&self) -> String {
        self.execute("output.txt", "Hello World")
    }
}

#[derive(Injectable)]
pub struct SearchTool {
    pub config: Arc<Config>,
    pub runtime: Arc<Runtime>,
}

impl SearchTool {
    pub fn execute(&self, query: &str) -> String {
        format!("[Search] Searching '{}' with {}", query, self.runtime.model_name)
    }
}

impl Tool for SearchTool {
    fn name(&self) -> &'static str {
        "SearchTool"
    }

    fn dependencies(&self) -> Vec<String> {
        vec![self.config.to_string(), self.runtime.to_string()]
    }

    fn run_sample(&self) -> String {
        self.execute("dependency injection")
    }
}

#[derive(Injectable)]
pub struct SimpleTool;

impl SimpleTool {
    pub fn execute(&self) -> String {
        "[SimpleTool] No dependencies needed!".to_string()
    }
}

impl Tool for SimpleTool {
    fn name(&self) -> &'static str {
        "SimpleTool"
    }

    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn run_sample(&self) -> String {
        self.execute()
    }
}

/// Outcome of loading every known tool. Tools whose dependencies are missing
/// are skipped, the rest still load.
#[derive(Default)]
pub struct Loaded {
    pub tools: Vec<Box<dyn Tool>>,
    pub failures: Vec<ResolutionError>,
}

pub fn load_all(container: &BasicContainer) -> Loaded {
    let mut loaded = Loaded::default();
    load::<ReadFileTool>(container, &mut loaded);
    load::<WriteFileTool>(container, &mut loaded);
    load::<SearchTool>(container, &mut loaded);
    load::<SimpleTool>(container, &mut loaded);
    loaded
}

fn load<T: Injectable + Tool>(container: &BasicContainer, loaded: &mut Loaded) {
    let descriptor = T::descriptor();
    match container.construct::<T>() {
        Ok(tool) => {
            info!(signature = %descriptor, "loaded tool");
            loaded.tools.push(Box::new(tool));
        }
        Err(err) => {
            warn!(error = %err, "skipping tool");
            loaded.failures.push(err);
        }
    }
}
