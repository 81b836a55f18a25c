use nn_apply_api::schemas::{ImageInfoSchema, ProjectInfoSchema};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde_json::Value;

use crate::cache::AnnotationCache;
use crate::error::RuntimeError;
use crate::meta::{ModelMeta, ProjectMeta};
use crate::platform::Platform;
use crate::ui::{SessionData, StartupData, UiState};

/// Identifiers the application is started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub owner_id: u64,
    pub team_id: u64,
    pub project_id: u64,
    /// Task whose UI fields receive the updates.
    pub task_id: u64,
}

/// Everything the handlers share between invocations.
///
/// Built once at startup and mutated only through the transition methods below.
pub struct SessionContext {
    config: SessionConfig,
    project: ProjectInfoSchema,
    project_meta: ProjectMeta,
    project_images: Vec<ImageInfoSchema>,
    model_meta: Option<ModelMeta>,
    cache: AnnotationCache,
    rng: StdRng,
}

impl SessionContext {
    pub fn new(
        config: SessionConfig,
        project: ProjectInfoSchema,
        project_meta: ProjectMeta,
        project_images: Vec<ImageInfoSchema>,
    ) -> Self {
        Self {
            config,
            project,
            project_meta,
            project_images,
            model_meta: None,
            cache: AnnotationCache::default(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Read the project, its schema and the images of every dataset.
    pub fn load<P: Platform>(platform: &P, config: SessionConfig) -> Result<Self, RuntimeError> {
        let project = platform.project_info(config.project_id)?;
        log::info!("Loading project '{}' (id: {})", project.name, project.id);

        let mut project_images = Vec::new();
        for dataset in platform.datasets(config.project_id)? {
            let images = platform.images(dataset.id)?;
            log::debug!("Dataset '{}' has {} images", dataset.name, images.len());
            project_images.extend(images);
        }

        let project_meta = ProjectMeta::from_json(platform.project_meta(config.project_id)?)?;

        log::info!(
            "Project loaded: {} images, {} classes, {} tags",
            project_images.len(),
            project_meta.classes.len(),
            project_meta.tags.len()
        );

        Ok(Self::new(config, project, project_meta, project_images))
    }

    /// Use a deterministic image sampler.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn task_id(&self) -> u64 {
        self.config.task_id
    }

    pub fn project(&self) -> &ProjectInfoSchema {
        &self.project
    }

    pub fn project_images(&self) -> &[ImageInfoSchema] {
        &self.project_images
    }

    /// Schema as last read from the platform.
    pub fn project_meta(&self) -> &ProjectMeta {
        &self.project_meta
    }

    pub fn set_project_meta(&mut self, meta: ProjectMeta) {
        self.project_meta = meta;
    }

    pub fn is_connected(&self) -> bool {
        self.model_meta.is_some()
    }

    pub fn model_meta(&self) -> Result<&ModelMeta, RuntimeError> {
        self.model_meta.as_ref().ok_or(RuntimeError::ModelNotConnected)
    }

    pub fn connect(&mut self, model_meta: ModelMeta) {
        log::info!(
            "Model connected: {} classes, {} tags",
            model_meta.classes.len(),
            model_meta.tags.len()
        );
        self.model_meta = Some(model_meta);
    }

    pub fn disconnect(&mut self) {
        if self.model_meta.take().is_some() {
            log::info!("Model disconnected");
        }
    }

    pub fn cache(&self) -> &AnnotationCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AnnotationCache {
        &mut self.cache
    }

    /// Pick a project image uniformly at random.
    pub fn sample_image(&mut self) -> Result<ImageInfoSchema, RuntimeError> {
        self.project_images
            .choose(&mut self.rng)
            .cloned()
            .ok_or(RuntimeError::EmptyProject)
    }

    /// Data and state published when the application starts.
    pub fn startup_ui(&self) -> Result<(Value, Value), RuntimeError> {
        let data = StartupData::new(self.config.owner_id, self.config.team_id, &self.project);
        Ok((
            serde_json::to_value(data)?,
            serde_json::to_value(UiState::default())?,
        ))
    }

    /// Data and state restored on disconnect.
    pub fn reset_ui() -> Result<(Value, Value), RuntimeError> {
        Ok((
            serde_json::to_value(SessionData::default())?,
            serde_json::to_value(UiState::default())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::ObjClass;
    use serde_json::json;

    fn project() -> ProjectInfoSchema {
        serde_json::from_value(json!({"id": 10, "name": "roads"})).unwrap()
    }

    fn image(id: u64) -> ImageInfoSchema {
        serde_json::from_value(json!({"id": id, "name": format!("{id}.jpg"), "datasetId": 1}))
            .unwrap()
    }

    fn config() -> SessionConfig {
        SessionConfig {
            owner_id: 1,
            team_id: 2,
            project_id: 10,
            task_id: 99,
        }
    }

    #[test]
    fn model_meta_requires_connect() {
        let mut session = SessionContext::new(config(), project(), ProjectMeta::default(), vec![]);
        assert!(matches!(
            session.model_meta(),
            Err(RuntimeError::ModelNotConnected)
        ));

        session.connect(ProjectMeta::new(vec![ObjClass::new("a", "rectangle")], vec![]));
        assert_eq!(session.model_meta().unwrap().classes.len(), 1);

        session.disconnect();
        assert!(!session.is_connected());
    }

    #[test]
    fn sampling_an_empty_project_fails() {
        let mut session = SessionContext::new(config(), project(), ProjectMeta::default(), vec![]);
        assert!(matches!(
            session.sample_image(),
            Err(RuntimeError::EmptyProject)
        ));
    }

    #[test]
    fn sampling_only_returns_project_images() {
        let images = vec![image(1), image(2), image(3)];
        let mut session =
            SessionContext::new(config(), project(), ProjectMeta::default(), images.clone())
                .with_seed(7);

        for _ in 0..20 {
            let picked = session.sample_image().unwrap();
            assert!(images.contains(&picked));
        }
    }

    #[test]
    fn reset_ui_restores_defaults() {
        let (data, state) = SessionContext::reset_ui().unwrap();
        assert_eq!(data["connected"], false);
        assert_eq!(data["gallery"], Value::Null);
        assert_eq!(state["addMode"], "merge");
        assert_eq!(state["classes"], json!([]));
    }
}
