#![allow(dead_code)]

pub mod fetcher;
pub mod workspace;

pub use fetcher::{RecordingPackager, ScriptedFetcher};
pub use workspace::{GITHUB_API, NEXUS, Workspace, metadata, metadata_url, request, war_url};
