use serde::{Deserialize, Serialize};

/// Single app-wide settings document. Read and replaced wholesale; updates
/// overwrite whole fields, there is no per-field merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub terms_and_conditions: String,
    pub privacy_policy: String,
    pub faqs: Vec<FaqEntry>,
    pub contact_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}
