pub mod environment;
pub mod initialization;

pub use environment::{
    get_environment, initialize_logging_system, load_environment_variables, AggregationPolicy,
    ApiConfig, Environment, EnvironmentConfig, SessionConfig,
};
pub use initialization::{initialize_client, InitializationResult};
