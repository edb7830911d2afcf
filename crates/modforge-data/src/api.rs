//! Loading of API templates into an [`ApiRegistry`].

use crate::loader::{DataLoadError, read_list};
use crate::schema::{ApiMemberData, ApiTemplateData, MemberTypeData, RawField};
use modforge_core::nyan::{ApiRegistry, ApiRegistryBuilder, MemberDef, MemberType, NyanValue};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

impl From<MemberTypeData> for MemberType {
    fn from(ty: MemberTypeData) -> Self {
        match ty {
            MemberTypeData::Int => MemberType::Int,
            MemberTypeData::Float => MemberType::Float,
            MemberTypeData::Bool => MemberType::Bool,
            MemberTypeData::Text => MemberType::Text,
            MemberTypeData::File => MemberType::File,
            MemberTypeData::Object => MemberType::Object,
            MemberTypeData::Set => MemberType::Set,
        }
    }
}

/// Convert a default value. `"inf"` is infinity for numeric members; text
/// defaults of object members name the object.
fn default_value(ty: MemberType, field: &RawField) -> Option<NyanValue> {
    let value = match field {
        RawField::Null | RawField::Record(_) => return None,
        RawField::Bool(v) => NyanValue::Bool(*v),
        RawField::Int(v) => NyanValue::Int(*v),
        RawField::Float(v) => NyanValue::Float(*v),
        RawField::Text(s) if s == "inf" && matches!(ty, MemberType::Int | MemberType::Float) => {
            NyanValue::Inf
        }
        RawField::Text(s) => match ty {
            MemberType::File => NyanValue::File(s.clone()),
            MemberType::Object => NyanValue::Object(s.clone()),
            _ => NyanValue::Text(s.clone()),
        },
        RawField::List(items) => NyanValue::Set(
            items
                .iter()
                .map(|item| default_value(MemberType::Object, item))
                .collect::<Option<_>>()?,
        ),
    };
    Some(value)
}

fn member_def(template: &str, member: &ApiMemberData) -> Result<MemberDef, DataLoadError> {
    let ty = MemberType::from(member.member_type);
    match &member.default {
        None => Ok(MemberDef::new(&member.name, ty)),
        Some(field) => {
            let default = default_value(ty, field).ok_or_else(|| DataLoadError::InvalidDefault {
                template: template.to_string(),
                member: member.name.clone(),
            })?;
            Ok(MemberDef::with_default(&member.name, ty, default))
        }
    }
}

/// Build a registry from template definitions.
///
/// Definitions may appear in any order; each pass registers every template
/// whose parents are already known. A pass without progress leaves only
/// templates with unknown (or cyclic) parents.
pub fn build_registry(
    templates: &[ApiTemplateData],
    file: &Path,
) -> Result<ApiRegistry, DataLoadError> {
    let mut seen = HashSet::new();
    for template in templates {
        if !seen.insert(template.name.as_str()) {
            return Err(DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: template.name.clone(),
            });
        }
    }

    let mut builder = ApiRegistryBuilder::new();
    let mut pending: Vec<&ApiTemplateData> = templates.iter().collect();
    while !pending.is_empty() {
        let (ready, waiting): (Vec<_>, Vec<_>) = pending.into_iter().partition(|t| {
            t.parents
                .iter()
                .all(|p| builder.template_id(p).is_some())
        });
        if ready.is_empty() {
            return Err(DataLoadError::UnresolvedTemplates {
                templates: waiting.iter().map(|t| t.name.clone()).collect(),
            });
        }
        for template in ready {
            let members = template
                .members
                .iter()
                .map(|m| member_def(&template.name, m))
                .collect::<Result<Vec<_>, _>>()?;
            let parents: Vec<&str> = template.parents.iter().map(String::as_str).collect();
            builder.register_template(&template.name, &parents, members)?;
        }
        pending = waiting;
    }

    let registry = builder.build()?;
    debug!(templates = registry.template_count(), "built API registry");
    Ok(registry)
}

/// Read template definitions from `path` and build the registry.
/// TOML files keep the list under a `templates` key.
pub fn load_api(path: &Path) -> Result<ApiRegistry, DataLoadError> {
    let templates: Vec<ApiTemplateData> = read_list(path, "templates")?;
    build_registry(&templates, path)
}
