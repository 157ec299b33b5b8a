//! Backbenchers - client library for the Poornima Backbenchers student portal
//!
//! This library holds the portal's client-side logic: authentication and role
//! routing, notes browsing and downloads, bookmarks, personal to-dos and
//! reminders, courses, and the administrator tools. All data lives in a hosted
//! backend-as-a-service reached through the [`backend::Backend`] trait.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`config`] - Application configuration management
//! * [`backend`] - Hosted backend client and the in-memory stand-in
//! * [`auth`] - Sign-in, sign-up and session persistence
//! * [`routing`] - Route resolution and access guards
//! * [`services`] - Notes, admin, dashboard, profile and course services
//! * [`state`] - Optimistic to-do, reminder and bookmark stores
//! * [`filters`] - Pure list filtering and derived data
//! * [`utils`] - Utility functions and helpers

/// Sign-in, sign-up and session handling
pub mod auth;

/// Backend abstraction layer over the hosted service
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Login and download counters with a fallback path
pub mod counters;

/// Typed row models for backend tables
pub mod entities;

/// Client-side validation errors
pub mod error;

/// Pure filtering and derivations over loaded rows
pub mod filters;

/// Logging bootstrap and in-memory log buffer
pub mod logger;

/// Toast notifications
pub mod notifications;

/// Weekly study plans
pub mod planner;

/// Repository layer for table access
pub mod repositories;

/// Route resolution and guards
pub mod routing;

/// Portal services and the shared `Portal` context
pub mod services;

/// Optimistic client-side stores
pub mod state;

/// Utility functions for date/time handling and other helpers
pub mod utils;

pub use error::ValidationError;
pub use services::Portal;
