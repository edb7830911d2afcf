//! Text rendering of ready objects.
//!
//! ```text
//! Archer(engine.aux.game_entity.GameEntity):
//!     abilities = {Archer.Idle, Archer.Live}
//!
//!     Live(engine.ability.type.Live):
//!         attributes = {Archer.Live.Health}
//! ```
//!
//! Only members assigned by the object itself are written; inherited
//! defaults stay implicit. A member name shared by two ancestors is
//! qualified with its declaring template.

use modforge_core::nyan::ApiRegistry;
use modforge_core::staging::{StagingError, StagingObject};

const INDENT: &str = "    ";

/// Render `object` with its already rendered nested objects.
pub fn render_object(
    object: &StagingObject,
    registry: &ApiRegistry,
    children: &[String],
) -> Result<String, StagingError> {
    let nyan = object.nyan_object()?;

    let parents: Vec<&str> = nyan
        .parents()
        .iter()
        .map(|&p| registry.template_name(p))
        .collect();
    let mut out = format!("{}({}):", object.name(), parents.join(", "));

    let mut body: Vec<String> = Vec::new();
    for member in nyan.members().iter().filter(|m| !m.is_inherited()) {
        let (Some(value), Some(operator)) = (member.value(), member.operator()) else {
            continue;
        };
        let name = if nyan.is_ambiguous(member.name()) {
            format!("{}.{}", registry.template_name(member.origin()), member.name())
        } else {
            member.name().to_string()
        };
        body.push(format!("{name} {} {value}", operator.symbol()));
    }
    for child in children {
        if !body.is_empty() {
            body.push(String::new());
        }
        body.push(child.clone());
    }
    if body.is_empty() {
        body.push("pass".to_string());
    }

    for line in body.iter().flat_map(|b| b.lines()) {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(INDENT);
            out.push_str(line);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::nyan::{ApiRegistryBuilder, MemberDef, MemberType, NyanValue};
    use modforge_core::reference::SymbolTable;

    const ABILITY: &str = "engine.ability.Ability";
    const LIVE: &str = "engine.ability.type.Live";
    const NAMED: &str = "engine.aux.Named";

    fn registry() -> ApiRegistry {
        let mut b = ApiRegistryBuilder::new();
        b.register_template(
            ABILITY,
            &[],
            vec![MemberDef::with_default("priority", MemberType::Int, NyanValue::Int(0))],
        )
        .unwrap();
        b.register_template(
            LIVE,
            &[ABILITY],
            vec![MemberDef::new("attributes", MemberType::Set)],
        )
        .unwrap();
        b.register_template(NAMED, &[], vec![MemberDef::new("attributes", MemberType::Set)])
            .unwrap();
        b.build().unwrap()
    }

    fn ready(mut object: StagingObject, registry: &ApiRegistry) -> StagingObject {
        object.materialize(registry).unwrap();
        object.fill_members(registry, &SymbolTable::new()).unwrap();
        object
    }

    #[test]
    fn inherited_defaults_are_not_written() {
        let reg = registry();
        let mut live = StagingObject::new("Archer.Live", "Live", "data/");
        live.add_raw_parent(LIVE);
        live.add_raw_member("attributes", Vec::<i64>::new(), LIVE);
        let live = ready(live, &reg);

        let text = render_object(&live, &reg, &[]).unwrap();
        assert_eq!(text, "Live(engine.ability.type.Live):\n    attributes = {}");
    }

    #[test]
    fn children_are_indented_after_a_blank_line() {
        let reg = registry();
        let mut live = StagingObject::new("Archer.Live", "Live", "data/");
        live.add_raw_parent(LIVE);
        live.add_raw_member("attributes", Vec::<i64>::new(), LIVE);
        let live = ready(live, &reg);

        let child = "Health(engine.aux.Health):\n    pass".to_string();
        let text = render_object(&live, &reg, &[child]).unwrap();
        assert_eq!(
            text,
            "Live(engine.ability.type.Live):\n    attributes = {}\n\n    Health(engine.aux.Health):\n        pass"
        );
    }

    #[test]
    fn ambiguous_members_are_qualified() {
        let reg = registry();
        let mut object = StagingObject::new("Both", "Both", "data/");
        object.add_raw_parent(LIVE);
        object.add_raw_parent(NAMED);
        object.add_raw_member("attributes", vec![1i64], LIVE);
        object.add_raw_member("attributes", vec![2i64], NAMED);
        let object = ready(object, &reg);

        let text = render_object(&object, &reg, &[]).unwrap();
        assert!(text.starts_with("Both(engine.ability.type.Live, engine.aux.Named):"));
        assert!(text.contains("engine.ability.type.Live.attributes = {1}"));
        assert!(text.contains("engine.aux.Named.attributes = {2}"));
        assert!(!text.contains("priority"));
    }

    #[test]
    fn object_without_own_members_passes() {
        let reg = registry();
        let mut object = StagingObject::new("Plain", "Plain", "data/");
        object.add_raw_parent(ABILITY);
        let object = ready(object, &reg);
        assert_eq!(
            render_object(&object, &reg, &[]).unwrap(),
            "Plain(engine.ability.Ability):\n    pass"
        );
    }

    #[test]
    fn unmaterialized_object_fails() {
        let reg = registry();
        let object = StagingObject::new("Plain", "Plain", "data/");
        assert!(matches!(
            render_object(&object, &reg, &[]),
            Err(StagingError::NotMaterialized { .. })
        ));
    }
}
