pub mod config_service;
pub mod paths;
pub mod state_repository;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::CaseBuddyPaths;
pub use crate::state_repository::TomlClientStateRepository;
