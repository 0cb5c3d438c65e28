pub const APP_ID: &str = "pt.ipam.OrientAi";
pub const APP_NAME: &str = "OrientAi";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";
pub const ENV_MODEL: &str = "ORIENTAI_MODEL";
pub const ENV_API_BASE: &str = "ORIENTAI_API_BASE";
pub const ENV_SPEECH_CMD: &str = "ORIENTAI_SPEECH_CMD";
pub const ENV_SPEECH_LANG: &str = "ORIENTAI_SPEECH_LANG";
pub const ENV_LOCALE: &str = "ORIENTAI_LOCALE";
