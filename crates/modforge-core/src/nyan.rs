//! Target object format: an immutable registry of API templates and the
//! objects built from them.
//!
//! Templates form a multiple-inheritance hierarchy. An object built from a
//! set of parent templates inherits every member declared by any ancestor.
//! Because two ancestors may declare members with the same name, members
//! are addressed by `(name, origin template)`.

use crate::id::TemplateId;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Declared type of a template member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberType {
    Int,
    Float,
    Bool,
    Text,
    File,
    Object,
    Set,
}

impl MemberType {
    /// Whether a value may be assigned to a member of this type.
    /// Numbers accept `inf`, floats accept integers.
    pub fn accepts(&self, value: &NyanValue) -> bool {
        matches!(
            (self, value),
            (MemberType::Int, NyanValue::Int(_) | NyanValue::Inf)
                | (
                    MemberType::Float,
                    NyanValue::Float(_) | NyanValue::Int(_) | NyanValue::Inf
                )
                | (MemberType::Bool, NyanValue::Bool(_))
                | (MemberType::Text, NyanValue::Text(_))
                | (MemberType::File, NyanValue::File(_) | NyanValue::Text(_))
                | (MemberType::Object, NyanValue::Object(_))
                | (MemberType::Set, NyanValue::Set(_))
        )
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberType::Int => "int",
            MemberType::Float => "float",
            MemberType::Bool => "bool",
            MemberType::Text => "text",
            MemberType::File => "file",
            MemberType::Object => "object",
            MemberType::Set => "set",
        };
        f.write_str(name)
    }
}

/// A concrete member value.
#[derive(Debug, Clone, PartialEq)]
pub enum NyanValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    File(String),
    /// Identifier of another object.
    Object(String),
    Set(Vec<NyanValue>),
    Inf,
}

impl fmt::Display for NyanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NyanValue::Int(v) => write!(f, "{v}"),
            NyanValue::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            NyanValue::Bool(true) => f.write_str("True"),
            NyanValue::Bool(false) => f.write_str("False"),
            NyanValue::Text(s) | NyanValue::File(s) => write!(f, "\"{s}\""),
            NyanValue::Object(fqon) => f.write_str(fqon),
            NyanValue::Set(values) => {
                f.write_str("{")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("}")
            }
            NyanValue::Inf => f.write_str("inf"),
        }
    }
}

/// How an assigned value combines with the inherited one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MemberOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            MemberOperator::Assign => "=",
            MemberOperator::Add => "+=",
            MemberOperator::Subtract => "-=",
            MemberOperator::Multiply => "*=",
            MemberOperator::Divide => "/=",
        }
    }
}

/// A member declared by a template.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDef {
    pub name: String,
    pub ty: MemberType,
    /// Value inherited by objects that never assign the member.
    pub default: Option<NyanValue>,
}

impl MemberDef {
    pub fn new(name: &str, ty: MemberType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            default: None,
        }
    }

    pub fn with_default(name: &str, ty: MemberType, default: NyanValue) -> Self {
        Self {
            name: name.to_string(),
            ty,
            default: Some(default),
        }
    }
}

/// A template definition in the registry.
#[derive(Debug, Clone)]
pub struct ApiTemplate {
    /// Dotted name, e.g. `engine.ability.type.Live`.
    pub name: String,
    pub parents: Vec<TemplateId>,
    pub members: Vec<MemberDef>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NyanError {
    #[error("unknown API template '{0}'")]
    UnknownTemplate(String),

    #[error("duplicate API template '{0}'")]
    DuplicateTemplate(String),

    #[error("template '{template}' declares member '{member}' twice")]
    DuplicateMember { template: String, member: String },

    #[error("default of member '{member}' in '{template}' does not match type {ty}")]
    InvalidDefault {
        template: String,
        member: String,
        ty: MemberType,
    },

    #[error("object '{object}' has no member '{member}' inherited from '{origin}'")]
    MemberNotFound {
        object: String,
        member: String,
        origin: String,
    },

    #[error("member '{member}' of type {ty} cannot hold value {value}")]
    TypeMismatch {
        member: String,
        ty: MemberType,
        value: String,
    },
}

/// Builder for constructing an immutable [`ApiRegistry`].
/// Templates must be registered after their parents.
#[derive(Debug, Default)]
pub struct ApiRegistryBuilder {
    templates: Vec<ApiTemplate>,
    name_to_id: HashMap<String, TemplateId>,
}

impl ApiRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Every parent must already be registered.
    pub fn register_template(
        &mut self,
        name: &str,
        parents: &[&str],
        members: Vec<MemberDef>,
    ) -> Result<TemplateId, NyanError> {
        if self.name_to_id.contains_key(name) {
            return Err(NyanError::DuplicateTemplate(name.to_string()));
        }
        let parents = parents
            .iter()
            .map(|p| {
                self.template_id(p)
                    .ok_or_else(|| NyanError::UnknownTemplate(p.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let id = TemplateId(self.templates.len() as u32);
        self.templates.push(ApiTemplate {
            name: name.to_string(),
            parents,
            members,
        });
        self.name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn template_id(&self, name: &str) -> Option<TemplateId> {
        self.name_to_id.get(name).copied()
    }

    /// Validate member declarations and freeze the registry.
    pub fn build(self) -> Result<ApiRegistry, NyanError> {
        for template in &self.templates {
            let mut seen = HashSet::new();
            for member in &template.members {
                if !seen.insert(member.name.as_str()) {
                    return Err(NyanError::DuplicateMember {
                        template: template.name.clone(),
                        member: member.name.clone(),
                    });
                }
                if let Some(default) = &member.default
                    && !member.ty.accepts(default)
                {
                    return Err(NyanError::InvalidDefault {
                        template: template.name.clone(),
                        member: member.name.clone(),
                        ty: member.ty,
                    });
                }
            }
        }

        Ok(ApiRegistry {
            templates: self.templates,
            name_to_id: self.name_to_id,
        })
    }
}

/// Immutable template registry. Built once and shared by reference through
/// the whole conversion.
#[derive(Debug)]
pub struct ApiRegistry {
    templates: Vec<ApiTemplate>,
    name_to_id: HashMap<String, TemplateId>,
}

impl ApiRegistry {
    pub fn get_template(&self, id: TemplateId) -> Option<&ApiTemplate> {
        self.templates.get(id.0 as usize)
    }

    pub fn template_id(&self, name: &str) -> Option<TemplateId> {
        self.name_to_id.get(name).copied()
    }

    pub fn template_name(&self, id: TemplateId) -> &str {
        self.get_template(id).map(|t| t.name.as_str()).unwrap_or("?")
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// The template itself followed by all of its ancestors, depth first,
    /// each listed once.
    pub fn ancestors(&self, id: TemplateId) -> Vec<TemplateId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        self.collect_ancestors(id, &mut order, &mut seen);
        order
    }

    fn collect_ancestors(
        &self,
        id: TemplateId,
        order: &mut Vec<TemplateId>,
        seen: &mut HashSet<TemplateId>,
    ) {
        if !seen.insert(id) {
            return;
        }
        order.push(id);
        if let Some(template) = self.get_template(id) {
            for &parent in &template.parents {
                self.collect_ancestors(parent, order, seen);
            }
        }
    }
}

/// A member slot of a [`NyanObject`].
#[derive(Debug, Clone, PartialEq)]
pub struct NyanMember {
    name: String,
    origin: TemplateId,
    ty: MemberType,
    value: Option<NyanValue>,
    operator: Option<MemberOperator>,
    inherited: bool,
}

impl NyanMember {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> TemplateId {
        self.origin
    }

    pub fn member_type(&self) -> MemberType {
        self.ty
    }

    pub fn value(&self) -> Option<&NyanValue> {
        self.value.as_ref()
    }

    pub fn operator(&self) -> Option<MemberOperator> {
        self.operator
    }

    /// True while the member still holds its template default (or nothing).
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }

    pub fn set_value(
        &mut self,
        value: NyanValue,
        operator: MemberOperator,
    ) -> Result<(), NyanError> {
        if !self.ty.accepts(&value) {
            return Err(NyanError::TypeMismatch {
                member: self.name.clone(),
                ty: self.ty,
                value: value.to_string(),
            });
        }
        self.value = Some(value);
        self.operator = Some(operator);
        self.inherited = false;
        Ok(())
    }
}

/// An object instantiated from one or more parent templates.
#[derive(Debug, Clone, PartialEq)]
pub struct NyanObject {
    name: String,
    parents: Vec<TemplateId>,
    members: Vec<NyanMember>,
}

impl NyanObject {
    pub fn new(name: &str, parents: Vec<TemplateId>, registry: &ApiRegistry) -> Self {
        let mut members = Vec::new();
        let mut seen = HashSet::new();
        for &parent in &parents {
            for ancestor in registry.ancestors(parent) {
                if !seen.insert(ancestor) {
                    continue;
                }
                let Some(template) = registry.get_template(ancestor) else {
                    continue;
                };
                for def in &template.members {
                    members.push(NyanMember {
                        name: def.name.clone(),
                        origin: ancestor,
                        ty: def.ty,
                        value: def.default.clone(),
                        operator: def.default.as_ref().map(|_| MemberOperator::Assign),
                        inherited: true,
                    });
                }
            }
        }

        Self {
            name: name.to_string(),
            parents,
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &[TemplateId] {
        &self.parents
    }

    pub fn members(&self) -> &[NyanMember] {
        &self.members
    }

    pub fn get_member(&self, name: &str, origin: TemplateId) -> Option<&NyanMember> {
        self.members
            .iter()
            .find(|m| m.name == name && m.origin == origin)
    }

    /// Look up a member by name and declaring template.
    pub fn get_member_by_name(
        &mut self,
        name: &str,
        origin: TemplateId,
        registry: &ApiRegistry,
    ) -> Result<&mut NyanMember, NyanError> {
        let object = self.name.clone();
        self.members
            .iter_mut()
            .find(|m| m.name == name && m.origin == origin)
            .ok_or_else(|| NyanError::MemberNotFound {
                object,
                member: name.to_string(),
                origin: registry.template_name(origin).to_string(),
            })
    }

    /// An object is abstract while any inherited member lacks a value.
    pub fn is_abstract(&self) -> bool {
        self.members.iter().any(|m| !m.is_initialized())
    }

    /// Names of members that still need a value.
    pub fn uninitialized_members(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|m| !m.is_initialized())
            .map(|m| m.name.as_str())
            .collect()
    }

    /// True if another inherited member shares this member's name.
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.members.iter().filter(|m| m.name == name).count() > 1
    }
}
