pub const DEFAULT_SOURCE_URL: &str = "https://srijandubey.github.io/campus-api-mock/SRM-C1-25.json";
pub const PAYLOAD_FILE_NAME: &str = "doctors.json";

pub const UNKNOWN_DOCTOR_NAME: &str = "Unknown Doctor";
pub const CURRENCY_PREFIX: &str = "₹ ";
pub const DEFAULT_FEES: &str = "0";
pub const DEFAULT_FEES_WITH_SYMBOL: &str = "₹ 0";
pub const DEFAULT_EXPERIENCE_TEXT: &str = "0 Years of experience";
pub const FALLBACK_SPECIALTY_LINE: &str = "General Physician";
pub const PLACEHOLDER_PHOTO_URL: &str = "https://via.placeholder.com/80";

pub const SUGGESTION_LIMIT: usize = 5;
pub const MAX_SUGGESTION_LIMIT: usize = 20;
