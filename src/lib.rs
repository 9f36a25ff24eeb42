//! cardscan - contact and entity extraction from business cards and voice notes.
//!
//! Uploaded images are sent to an OCR service and uploaded audio to a speech
//! recognition service; the returned text is mined for email addresses,
//! phone numbers, site URLs and named entities.

pub mod cli;
pub mod config;
pub mod extract;
pub mod server;
pub mod services;
