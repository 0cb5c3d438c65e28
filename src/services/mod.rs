pub mod assistant;
pub mod controller;
pub mod instruction;
pub mod markdown;
pub mod sessions;
pub mod settings;
pub mod speech;
pub mod translations;

pub use assistant::{AssistantConfig, AssistantService};
pub use controller::{ChatController, OutgoingMessage};
pub use settings::{AppSettings, SettingsService};
pub use speech::{CommandSpeechEngine, SpeechCapture};
