//! AI-facing side of the storefront: the Gemini text generator, the prompt
//! templates sent to it, and the permissive parser for what comes back.

pub mod disabled_generator;
pub mod gemini_api_agent;
pub mod prompts;
pub mod response_parser;

pub use disabled_generator::DisabledGenerator;
pub use gemini_api_agent::GeminiApiAgent;
pub use prompts::PromptRenderer;
pub use response_parser::{ParseError, parse_id_list, strip_code_fences};
