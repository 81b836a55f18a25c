use std::time::Instant;

use crate::command::{Command, Event, Invocation};
use crate::error::RuntimeError;
use crate::handlers;
use crate::platform::Platform;
use crate::session::{SessionConfig, SessionContext};
use crate::ui::UiUpdate;

type Handler<P> = fn(&mut SessionContext, &P, &Invocation) -> Result<UiUpdate, RuntimeError>;

fn handler_for<P: Platform>(command: Command) -> Handler<P> {
    match command {
        Command::Connect => handlers::connect,
        Command::Disconnect => handlers::disconnect,
        Command::SelectAllClasses => handlers::select_all_classes,
        Command::DeselectAllClasses => handlers::deselect_all_classes,
        Command::SelectAllTags => handlers::select_all_tags,
        Command::DeselectAllTags => handlers::deselect_all_tags,
        Command::Inference => handlers::inference,
        Command::Preview => handlers::preview,
    }
}

/// Runs commands against the session and pushes the resulting UI updates.
///
/// Invocations are handled one at a time; the dispatcher holds the only handle to the session.
pub struct Dispatcher<P: Platform> {
    platform: P,
    session: SessionContext,
}

impl<P: Platform> Dispatcher<P> {
    pub fn new(platform: P, session: SessionContext) -> Self {
        Self { platform, session }
    }

    /// Load the session from the platform and publish the initial UI.
    pub fn start(platform: P, config: SessionConfig) -> Result<Self, RuntimeError> {
        let session = SessionContext::load(&platform, config)?;
        let dispatcher = Self::new(platform, session);
        dispatcher.publish_initial_ui()?;
        Ok(dispatcher)
    }

    pub fn publish_initial_ui(&self) -> Result<(), RuntimeError> {
        let (data, state) = self.session.startup_ui()?;
        let update = UiUpdate::new().set("data", data).set("state", state);
        self.platform
            .set_fields(self.session.task_id(), update.into_fields())?;
        Ok(())
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Resolve a raw host event and run it.
    pub fn dispatch_event(&mut self, event: Event) -> Result<(), RuntimeError> {
        let invocation = Invocation::try_from(event).inspect_err(|e| {
            log::error!("Rejected event: {e}");
        })?;
        self.dispatch(&invocation)
    }

    pub fn dispatch(&mut self, invocation: &Invocation) -> Result<(), RuntimeError> {
        let command = invocation.command;
        let handler = handler_for::<P>(command);

        log::debug!("Starting execution of '{command}'");
        let started = Instant::now();

        let result = handler(&mut self.session, &self.platform, invocation).and_then(|update| {
            if !update.is_empty() {
                self.platform
                    .set_fields(self.session.task_id(), update.into_fields())?;
            }
            Ok(())
        });

        let elapsed = started.elapsed();
        match result {
            Ok(()) => {
                log::info!("'{command}' finished in {:.3}s", elapsed.as_secs_f64());
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Error executing handler '{command}' after {:.3}s: {e}",
                    elapsed.as_secs_f64()
                );
                if let RuntimeError::Platform(client_error) = &e {
                    if client_error.is_login_error() {
                        log::error!("The platform rejected the API token, check API_TOKEN");
                    }
                }
                Err(e)
            }
        }
    }
}
