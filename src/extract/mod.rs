// src/extract/mod.rs
// =============================================================================
// This module turns a fetched page into contact signals.
//
// Submodules:
// - html: Parses HTML and exposes links, visible text and markup
// - contact: The fixed pattern table (emails, phones, social links)
// - address: Street / state / zip detection
//
// Extraction is purely pattern-based: no NLP, no JavaScript, no guessing
// about what a piece of text "means".
// =============================================================================

mod address;
mod contact;
mod html;

pub use address::Address;
pub use contact::{ContentExtractor, SocialLinks};
pub use html::{Anchor, ParsedPage};
