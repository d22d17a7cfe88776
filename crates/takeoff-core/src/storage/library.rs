//! Template library and project files (JSON).

use std::path::Path;

use takeoff_engine::engine::normalize;

use crate::error::{Result, TakeoffError};
use crate::estimate::Project;
use crate::template::{Template, TemplateRecord};

const MAX_LIBRARY_FILE_BYTES: u64 = 8 * 1_048_576; // 8 MiB

fn read_capped(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_LIBRARY_FILE_BYTES {
        return Err(TakeoffError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max: MAX_LIBRARY_FILE_BYTES,
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse a library: a JSON array of templates or seed records.
pub fn parse_templates(json: &str) -> Result<Vec<Template>> {
    let records: Vec<TemplateRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Template::from).collect())
}

pub fn load_templates(path: &Path) -> Result<Vec<Template>> {
    let templates = parse_templates(&read_capped(path)?)?;
    tracing::info!(path = %path.display(), count = templates.len(), "loaded template library");
    Ok(templates)
}

/// Look a template up by name or id.
///
/// Exact names win over case-insensitive ones, which win over names that
/// only agree once normalized ("interior_wall" finds "Interior Wall").
pub fn find_template<'a>(templates: &'a [Template], name: &str) -> Result<&'a Template> {
    let wanted = name.trim();
    let ident = normalize(wanted);
    templates
        .iter()
        .find(|t| t.display_name() == wanted || t.id == wanted)
        .or_else(|| {
            templates
                .iter()
                .find(|t| t.display_name().eq_ignore_ascii_case(wanted))
        })
        .or_else(|| {
            templates
                .iter()
                .find(|t| !ident.is_empty() && normalize(t.display_name()).eq_ignore_ascii_case(&ident))
        })
        .ok_or_else(|| TakeoffError::TemplateNotFound(wanted.to_string()))
}

pub fn parse_project(json: &str) -> Result<Project> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_project(path: &Path) -> Result<Project> {
    let project = parse_project(&read_capped(path)?)?;
    tracing::info!(
        path = %path.display(),
        markups = project.markups.len(),
        "loaded project"
    );
    Ok(project)
}
