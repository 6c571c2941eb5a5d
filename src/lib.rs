//! Image Forensics
//!
//! Accepts an uploaded photo, runs it through remote classification,
//! colourisation and storage services, records its EXIF metadata, persists
//! the combined result in a local cache backed by durable object storage and
//! emails the submitter a link to it.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
