//! Session state and command handlers for applying a remote model's predictions to a labeled
//! project.
//!
//! The host feeds [`Invocation`]s to a [`Dispatcher`], which runs the matching handler against
//! the [`SessionContext`] and pushes the resulting UI fields back through the [`Platform`].

pub mod annotation;
pub mod cache;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod gallery;
pub mod handlers;
pub mod meta;
pub mod platform;
pub mod postprocess;
pub mod session;
pub mod settings;
pub mod ui;

#[cfg(test)]
mod mock;

pub use annotation::{Annotation, Label, Tag};
pub use cache::AnnotationCache;
pub use command::{Command, Event, Invocation, InvocationContext};
pub use dispatcher::Dispatcher;
pub use error::RuntimeError;
pub use meta::{ModelMeta, ObjClass, ProjectMeta, TagMeta};
pub use platform::Platform;
pub use session::{SessionConfig, SessionContext};
pub use settings::InferenceSettings;
pub use ui::{AddMode, UiState, UiUpdate};
