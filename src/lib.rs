pub mod app;
pub mod config;
pub mod conversation;
pub mod handler;
pub mod logging;
pub mod transport;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{Config, TransportKind};
pub use conversation::{Conversation, Message, Phase, Role, SubmitOutcome};
pub use transport::{AIMessage, GraphQLClient, HealthStatus, RestClient, ServiceStatus, StatusSnapshot, Transport, TransportError};
