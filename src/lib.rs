mod config;
mod error;
mod extract;
mod render;
mod rules;
mod server;

pub use config::Config;
pub use error::Error;
pub use extract::{eval_field, eval_field_in, eval_list, extract};
pub use render::RenderClient;
pub use rules::{FieldRule, ListRule, RuleSet, ValueKind};
pub use server::{app, AppState, ExtractionResponse};
