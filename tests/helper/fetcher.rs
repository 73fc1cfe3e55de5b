//! Network and packaging test doubles

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use la_image_builder::build::packager::Packager;
use la_image_builder::build::task::ResolvedBuildTask;
use la_image_builder::error::BuildError;
use la_image_builder::version::error::RegistryError;
use la_image_builder::version::fetcher::Fetcher;

/// Fetcher that answers from fixed responses and records every request
#[derive(Default)]
pub struct ScriptedFetcher {
    bodies: HashMap<String, String>,
    reachable: HashSet<String>,
    gets: Mutex<Vec<String>>,
    probes: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_reachable(mut self, url: &str) -> Self {
        self.reachable.insert(url.to_string());
        self
    }

    /// Number of GET requests made for `url`
    pub fn get_count(&self, url: &str) -> usize {
        let gets = self.gets.lock().unwrap();
        gets.iter().filter(|u| *u == url).count()
    }

    /// Probed URLs, sorted
    pub fn probed(&self) -> Vec<String> {
        let mut probed = self.probes.lock().unwrap().clone();
        probed.sort();
        probed
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, RegistryError> {
        self.gets.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(url.to_string()))
    }

    async fn probe(&self, url: &str) -> Result<(), RegistryError> {
        self.probes.lock().unwrap().push(url.to_string());
        if self.reachable.contains(url) {
            Ok(())
        } else {
            Err(RegistryError::NotFound(url.to_string()))
        }
    }
}

/// Packager that keeps the tasks it receives
#[derive(Default)]
pub struct RecordingPackager {
    tasks: Mutex<Vec<ResolvedBuildTask>>,
}

impl RecordingPackager {
    pub fn tasks(&self) -> Vec<ResolvedBuildTask> {
        self.tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl Packager for RecordingPackager {
    async fn package(&self, task: &ResolvedBuildTask) -> Result<(), BuildError> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(())
    }
}
