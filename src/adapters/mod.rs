// Adapters layer: concrete implementations of the domain ports (ticket storage,
// the completion service, credential sources).

pub mod credentials;
pub mod openai;
pub mod sqlite_store;

pub use credentials::{EnvCredential, StaticCredential};
pub use openai::OpenAiClient;
pub use sqlite_store::SqliteTicketStore;
