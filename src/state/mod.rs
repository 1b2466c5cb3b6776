/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The in-memory capture collection and selection (library.rs)
/// - Code screenshot composition parameters (composer.rs)
/// - Lifecycle of in-flight asynchronous actions (activity.rs)

pub mod activity;
pub mod composer;
pub mod data;
pub mod library;
