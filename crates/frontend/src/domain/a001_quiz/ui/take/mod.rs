//! Quiz taking UI Module
//!
//! MVVM split:
//! - model.rs: runner construction against the backend
//! - view_model.rs: session state, capture board, countdown timer
//! - view.rs: Leptos components (pure UI)

mod model;
mod view;
mod view_model;

pub use view::QuizTake;
pub use view_model::QuizTakeViewModel;
