//! Text post-processing for recognition transcripts.
//!
//! - `matcher`: line-based pattern matching with residual text
//! - `fields`: email, phone and site URL extractors
//! - `entities`: grouping of analyzed entities by type

mod entities;
mod fields;
mod matcher;

pub use entities::{classify, Entity, EntityBucket, WANTED_ENTITY_TYPES};
pub use fields::{
    extract_contacts, extract_email, extract_phone, extract_site_url, ContactFields,
    SiteUrlPattern, EMAIL_PATTERN, PHONE_PATTERN,
};
pub use matcher::{
    compile, remove_by_regex, remove_by_regex_with_mode, remove_matches, ExtractionResult,
    FoundMatch, LineHit, LinePattern, PatternError, RemovalMode,
};
