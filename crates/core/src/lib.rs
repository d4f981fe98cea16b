//! Core library for the NAMASTE terminology console
//!
//! This crate implements the **Functional Core** of the console, following the
//! Functional Core - Imperative Shell pattern:
//!
//! - **`namaste_core`** (this crate): domain models, request validation and
//!   view-state transitions with zero I/O
//! - **`namaste`**: HTTP calls, timers, clipboard, downloads and the CLI (the
//!   Imperative Shell)
//!
//! Every page of the console keeps its state in a plain struct from this crate.
//! The shell feeds those structs the outcome of a network call and renders
//! whatever they report, so all the interesting branching (empty input,
//! empty translation sets, stale results after a failure) is testable with
//! fixture data.
//!
//! # Module Organization
//!
//! - [`terminology`]: code systems, translation and search payloads
//! - [`translation`]: translation page state machine
//! - [`admin`]: CSV upload state, sample CSV template, content preview
//! - [`fhir`]: CodeSystem / ConceptMap panels and bundle parsing
//! - [`statistics`]: statistics and health payloads, summary cards
//! - [`query`]: query cache keys and request status
//! - [`notification`]: transient user notifications
//!
//! # Example Usage
//!
//! ```rust
//! use namaste_core::terminology::CodeSystem;
//! use namaste_core::translation::TranslationState;
//!
//! let mut state = TranslationState::default();
//! state.set_input("  AY001 ");
//!
//! let request = state.begin_submit().unwrap();
//! assert_eq!(request.code, "AY001");
//! assert_eq!(request.system, CodeSystem::Namaste);
//! ```

pub mod admin;
pub mod error;
pub mod fhir;
pub mod notification;
pub mod query;
pub mod statistics;
pub mod terminology;
pub mod translation;

pub use error::Error;
