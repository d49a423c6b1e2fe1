// src/config/consts.rs

// Local workspace
pub const OUTPUT_DIR: &str = ".tmp";
pub const LISTINGS_FILE: &str = "listings.json";
pub const NEW_LISTINGS_FILE: &str = "new_listings.json";
pub const SEEN_FILE: &str = "seen_listings.json";
pub const SHEET_ID_FILE: &str = "sheet_id.txt";
pub const SHEET_PREVIEW_FILE: &str = "sheet_preview.csv";
pub const LOG_FILE: &str = "debug.log";
pub const SECRETS_FILE: &str = "secrets.toml";
pub const CREDENTIALS_FILE: &str = "token.json";

// Scraper (Apify)
pub const APIFY_BASE: &str = "https://api.apify.com";
pub const ACTOR_ID: &str = "dhrumil/rightmove-scraper";
pub const MAX_ITEMS_PER_AREA: u32 = 100;
pub const RUN_WAIT_SECS: u64 = 60; // server-side long-poll per request
pub const RUN_MAX_POLLS: u32 = 30;

// Listing source
pub const RIGHTMOVE_SEARCH: &str = "https://www.rightmove.co.uk/property-for-sale/find.html";
pub const SOURCE_NAME: &str = "rightmove";
pub const DESCRIPTION_MAX_CHARS: usize = 300;
pub const MAX_IMAGES: usize = 3;
pub const UNKNOWN: &str = "Unknown";

// Messaging (Twilio WhatsApp)
pub const TWILIO_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_WHATSAPP_FROM: &str = "whatsapp:+14155238886";
pub const TEST_MESSAGE: &str = "Test: London Home Search working!";

// Spreadsheet (Google Sheets)
pub const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
];
pub const DEFAULT_SHEET_TITLE: &str = "London Home Search";

// Network
pub const HTTP_TIMEOUT_SECS: u64 = 90; // must outlive RUN_WAIT_SECS
pub const USER_AGENT: &str = concat!("home_search/", env!("CARGO_PKG_VERSION"));

// Concurrency
pub const WORKERS: usize = 3;
pub const REQUEST_PAUSE_MS: u64 = 250; // be polite
pub const JITTER_MS: u64 = 100; // extra 0..100 ms
