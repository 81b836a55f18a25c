//! Reconciles a prediction made in the model's schema with the project's schema.

use std::collections::HashMap;

use crate::annotation::Annotation;
use crate::error::RuntimeError;
use crate::meta::{ModelMeta, ProjectMeta};
use crate::platform::Platform;
use crate::ui::UiState;

/// Prediction expressed in the project's (possibly extended) schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub annotation: Annotation,
    pub project_meta: ProjectMeta,
}

fn selection(flags: &[bool], len: usize, what: &str) -> Result<Vec<bool>, RuntimeError> {
    match flags.len() {
        0 => Ok(vec![true; len]),
        n if n == len => Ok(flags.to_vec()),
        n => Err(RuntimeError::InvalidState(format!(
            "{n} {what} flags for a model with {len} {what}"
        ))),
    }
}

/// Map the selected model classes and tags onto the project schema.
///
/// A model class maps onto a project class with the same title and shape. Same title with a
/// different shape maps onto `"{title}-{suffix}"`, added if missing. Anything else is added as
/// is. Tag metas follow the same rule on `value_type`. Unselected classes and tags are dropped
/// from the prediction. The project schema on the platform is updated once if it grew.
pub fn reconcile<P: Platform>(
    platform: &P,
    project_id: u64,
    prediction: Annotation,
    project_meta: &ProjectMeta,
    model_meta: &ModelMeta,
    state: &UiState,
) -> Result<Reconciled, RuntimeError> {
    let class_flags = selection(&state.classes, model_meta.classes.len(), "classes")?;
    let tag_flags = selection(&state.tags, model_meta.tags.len(), "tags")?;

    let mut res_meta = project_meta.clone();
    let mut class_mapping = HashMap::new();
    let mut tag_mapping = HashMap::new();

    let selected_classes = model_meta
        .classes
        .iter()
        .zip(class_flags)
        .filter_map(|(class, selected)| selected.then_some(class));

    for class in selected_classes {
        let title = match res_meta.obj_class(&class.title) {
            None => {
                res_meta.classes.push(class.clone());
                class.title.clone()
            }
            Some(existing) if existing.shape == class.shape => class.title.clone(),
            Some(_) => {
                let renamed = format!("{}-{}", class.title, state.suffix);
                match res_meta.obj_class(&renamed) {
                    None => res_meta.classes.push(class.renamed(&renamed)),
                    Some(existing) if existing.shape == class.shape => {}
                    Some(existing) => {
                        return Err(RuntimeError::SchemaConflict(format!(
                            "class '{renamed}' already exists with shape '{}', model class '{}' has shape '{}'",
                            existing.shape, class.title, class.shape
                        )));
                    }
                }
                renamed
            }
        };
        class_mapping.insert(class.title.clone(), title);
    }

    let selected_tags = model_meta
        .tags
        .iter()
        .zip(tag_flags)
        .filter_map(|(tag, selected)| selected.then_some(tag));

    for tag in selected_tags {
        let name = match res_meta.tag_meta(&tag.name) {
            None => {
                res_meta.tags.push(tag.clone());
                tag.name.clone()
            }
            Some(existing) if existing.value_type == tag.value_type => tag.name.clone(),
            Some(_) => {
                let renamed = format!("{}-{}", tag.name, state.suffix);
                match res_meta.tag_meta(&renamed) {
                    None => res_meta.tags.push(tag.renamed(&renamed)),
                    Some(existing) if existing.value_type == tag.value_type => {}
                    Some(existing) => {
                        return Err(RuntimeError::SchemaConflict(format!(
                            "tag '{renamed}' already exists with value type '{}', model tag '{}' has value type '{}'",
                            existing.value_type, tag.name, tag.value_type
                        )));
                    }
                }
                renamed
            }
        };
        tag_mapping.insert(tag.name.clone(), name);
    }

    if res_meta != *project_meta {
        log::info!(
            "Extending project schema: {} -> {} classes, {} -> {} tags",
            project_meta.classes.len(),
            res_meta.classes.len(),
            project_meta.tags.len(),
            res_meta.tags.len()
        );
        platform.update_project_meta(project_id, res_meta.to_json()?)?;
    }

    Ok(Reconciled {
        annotation: prediction.remap(&class_mapping, &tag_mapping),
        project_meta: res_meta,
    })
}
