//! One handler per [`Command`](crate::command::Command).
//!
//! Handlers read and mutate the session, talk to the platform, and return the UI fields to push.
//! Pushing is left to the dispatcher.

use serde_json::{Value, json};

use crate::annotation::Annotation;
use crate::command::Invocation;
use crate::error::RuntimeError;
use crate::gallery::Gallery;
use crate::meta::{ModelMeta, ProjectMeta};
use crate::platform::Platform;
use crate::postprocess::{Reconciled, reconcile};
use crate::session::SessionContext;
use crate::settings::InferenceSettings;
use crate::ui::{AddMode, UiState, UiUpdate};

pub const SESSION_INFO_REQUEST: &str = "get_session_info";
pub const MODEL_META_REQUEST: &str = "get_output_classes_and_tags";
pub const INFERENCE_REQUEST: &str = "inference_image_id";

pub fn connect<P: Platform>(
    session: &mut SessionContext,
    platform: &P,
    invocation: &Invocation,
) -> Result<UiUpdate, RuntimeError> {
    let session_id = invocation.session_id()?;

    let info = platform.send_request(session_id, SESSION_INFO_REQUEST, json!({}))?;
    log::info!("Session info: {info}");

    let meta_json = platform.send_request(session_id, MODEL_META_REQUEST, json!({}))?;
    let model_meta = ModelMeta::from_json(meta_json.clone())?;

    let classes = vec![true; model_meta.classes.len()];
    let tags = vec![true; model_meta.tags.len()];
    session.connect(model_meta);

    Ok(UiUpdate::new()
        .set("data.connected", json!(true))
        .set("data.connectionError", json!(""))
        .set("data.modelInfo", info)
        .set("data.modelMeta", meta_json)
        .set("state.classes", json!(classes))
        .set("state.tags", json!(tags)))
}

pub fn disconnect<P: Platform>(
    session: &mut SessionContext,
    _platform: &P,
    _invocation: &Invocation,
) -> Result<UiUpdate, RuntimeError> {
    session.disconnect();

    let (data, state) = SessionContext::reset_ui()?;
    Ok(UiUpdate::new().append("data", data).append("state", state))
}

fn class_flags(session: &SessionContext, selected: bool) -> Result<UiUpdate, RuntimeError> {
    let count = session.model_meta()?.classes.len();
    Ok(UiUpdate::new().set("state.classes", json!(vec![selected; count])))
}

fn tag_flags(session: &SessionContext, selected: bool) -> Result<UiUpdate, RuntimeError> {
    let count = session.model_meta()?.tags.len();
    Ok(UiUpdate::new().set("state.tags", json!(vec![selected; count])))
}

pub fn select_all_classes<P: Platform>(
    session: &mut SessionContext,
    _platform: &P,
    _invocation: &Invocation,
) -> Result<UiUpdate, RuntimeError> {
    class_flags(session, true)
}

pub fn deselect_all_classes<P: Platform>(
    session: &mut SessionContext,
    _platform: &P,
    _invocation: &Invocation,
) -> Result<UiUpdate, RuntimeError> {
    class_flags(session, false)
}

pub fn select_all_tags<P: Platform>(
    session: &mut SessionContext,
    _platform: &P,
    _invocation: &Invocation,
) -> Result<UiUpdate, RuntimeError> {
    tag_flags(session, true)
}

pub fn deselect_all_tags<P: Platform>(
    session: &mut SessionContext,
    _platform: &P,
    _invocation: &Invocation,
) -> Result<UiUpdate, RuntimeError> {
    tag_flags(session, false)
}

/// Combine the ground truth with the reconciled prediction.
pub fn combine(ground_truth: &Annotation, prediction: Annotation, mode: AddMode) -> Annotation {
    match mode {
        AddMode::Merge => ground_truth.merge(&prediction),
        AddMode::Replace => prediction,
    }
}

/// Per-invocation inputs of the prediction pipeline.
struct Pipeline<'a, P> {
    platform: &'a P,
    project_id: u64,
    session_id: u64,
    model_meta: ModelMeta,
    settings: InferenceSettings,
    state: &'a UiState,
}

impl<'a, P: Platform> Pipeline<'a, P> {
    fn new(
        session: &SessionContext,
        platform: &'a P,
        invocation: &'a Invocation,
        project_id: u64,
    ) -> Result<Self, RuntimeError> {
        let model_meta = session.model_meta()?.clone();
        let session_id = invocation.session_id()?;
        let settings = InferenceSettings::from_state(invocation.state.settings.as_deref());
        if let Some(reason) = settings.fallback_reason() {
            log::warn!(
                "Session {session_id}: invalid inference settings, using empty settings: {reason}"
            );
        }

        Ok(Self {
            platform,
            project_id,
            session_id,
            model_meta,
            settings,
            state: &invocation.state,
        })
    }

    fn ground_truth(
        &self,
        image_id: u64,
        project_meta: &ProjectMeta,
    ) -> Result<Annotation, RuntimeError> {
        let json = self.platform.download_annotation(image_id)?;
        Ok(Annotation::from_json(json, project_meta)?)
    }

    /// Ask the model for a prediction on `image_id` and express it in the project's schema.
    fn predict(
        &self,
        image_id: u64,
        project_meta: &ProjectMeta,
    ) -> Result<Reconciled, RuntimeError> {
        let settings: &Value = &self.settings;
        let response = self.platform.send_request(
            self.session_id,
            INFERENCE_REQUEST,
            json!({
                "image_id": image_id,
                "settings": settings,
            }),
        )?;
        let prediction = Annotation::from_json(response, &self.model_meta)?;
        log::debug!(
            "Model returned {} labels for image {image_id}",
            prediction.labels.len()
        );

        reconcile(
            self.platform,
            self.project_id,
            prediction,
            project_meta,
            &self.model_meta,
            self.state,
        )
    }
}

/// Apply the model's prediction to the image the user has open and save the result.
pub fn inference<P: Platform>(
    session: &mut SessionContext,
    platform: &P,
    invocation: &Invocation,
) -> Result<UiUpdate, RuntimeError> {
    let image_id = invocation.image_id()?;
    let project_id = invocation
        .context
        .project_id
        .unwrap_or(session.config().project_id);
    let pipeline = Pipeline::new(session, platform, invocation, project_id)?;

    let project_meta = ProjectMeta::from_json(platform.project_meta(project_id)?)?;

    let ground_truth = session
        .cache_mut()
        .get_or_fetch(image_id, |id| pipeline.ground_truth(id, &project_meta))?;

    let reconciled = pipeline.predict(image_id, &project_meta)?;
    let result = combine(&ground_truth, reconciled.annotation, invocation.state.add_mode);

    platform.upload_annotation(image_id, result.to_json()?)?;
    log::info!(
        "Image {image_id} updated ({:?}): {} labels before, {} after",
        invocation.state.add_mode,
        ground_truth.labels.len(),
        result.labels.len()
    );

    if project_id == session.config().project_id {
        session.set_project_meta(reconciled.project_meta);
    }

    Ok(UiUpdate::new()
        .set("data.rollbackIds", json!(session.cache().keys()))
        .set("state.processing", json!(false)))
}

/// Run the pipeline on a random project image and show the outcome without saving it.
pub fn preview<P: Platform>(
    session: &mut SessionContext,
    platform: &P,
    invocation: &Invocation,
) -> Result<UiUpdate, RuntimeError> {
    let project_id = session.config().project_id;
    let pipeline = Pipeline::new(session, platform, invocation, project_id)?;

    let image = session.sample_image()?;
    log::info!("Previewing on image '{}' (id: {})", image.name, image.id);

    // Schema as loaded at startup or by the last inference; not re-read here.
    let project_meta = session.project_meta().clone();

    let ground_truth = pipeline.ground_truth(image.id, &project_meta)?;
    let reconciled = pipeline.predict(image.id, &project_meta)?;
    let result = combine(&ground_truth, reconciled.annotation, invocation.state.add_mode);

    let gallery = Gallery::comparison(
        &reconciled.project_meta,
        image.full_storage_url.as_deref(),
        &ground_truth,
        &result,
    )?;
    session.set_project_meta(reconciled.project_meta);

    Ok(UiUpdate::new()
        .set("state.processing", json!(false))
        .set("data.gallery", gallery.to_json()?))
}
