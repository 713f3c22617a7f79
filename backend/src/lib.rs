pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod openapi;

pub mod analytics {
    pub mod bias;
    pub mod clusters;
    pub mod controller;
    pub mod engine;
    pub mod reducers;
    pub mod repository;
    pub mod sequence;
    pub mod usecase;

    pub use engine::AnalyticsEngine;
    pub use reducers::StatSort;
    pub use repository::{AttemptRepository, CsvAttemptRepository, InMemoryAttemptRepository};
    pub use usecase::AnalyticsUseCase;

    #[cfg(test)]
    mod fixtures;

    #[cfg(test)]
    mod reducers_tests;

    #[cfg(test)]
    mod bias_tests;

    #[cfg(test)]
    mod sequence_tests;

    #[cfg(test)]
    mod clusters_tests;

    #[cfg(test)]
    mod usecase_tests;

    #[cfg(test)]
    mod controller_tests;
}

// Unit test modules only
#[cfg(test)]
mod error_tests;
