//! Adapters for the university's public course schedule (OBS).
//!
//! - `ProgramCatalog`: program code -> provider id, loaded once at startup
//! - `ObsClient`: seat counts of one section, scraped from the schedule table

mod catalog;
mod client;
mod fallback;
mod parser;

pub use catalog::{CatalogOrigin, ProgramCatalog};
pub use client::ObsClient;
pub use fallback::FALLBACK_PROGRAMS;
pub use parser::{parse_program_options, parse_seat_table};

use serde::{Deserialize, Serialize};

/// Upstream URLs and request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObsEndpoints {
    /// Landing page holding the program dropdown
    #[serde(default = "default_program_list_url")]
    pub program_list_url: String,

    /// Schedule search endpoint, queried per program
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Registration page linked from availability messages
    #[serde(default = "default_registration_url")]
    pub registration_url: String,

    /// Program level key (`LS` = undergraduate)
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_program_list_url() -> String {
    "https://obs.itu.edu.tr/public/DersProgram".to_string()
}

fn default_search_url() -> String {
    "https://obs.itu.edu.tr/public/DersProgram/DersProgramSearch".to_string()
}

fn default_registration_url() -> String {
    "https://obs.itu.edu.tr/ogrenci/DersKayitIslemleri/DersKayit".to_string()
}

fn default_level() -> String {
    "LS".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for ObsEndpoints {
    fn default() -> Self {
        Self {
            program_list_url: default_program_list_url(),
            search_url: default_search_url(),
            registration_url: default_registration_url(),
            level: default_level(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
