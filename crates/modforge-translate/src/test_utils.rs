//! API templates for every object the translators produce.

use crate::ability::*;
use crate::civ::CIVILIZATION;
use crate::entity::{CREATABLE_GAME_ENTITY, GAME_ENTITY};
use crate::tech::{RESEARCHABLE_TECH, TECH};
use modforge_core::nyan::{ApiRegistry, ApiRegistryBuilder, MemberDef, MemberType, NyanValue};

pub const ABILITY: &str = "engine.ability.Ability";

/// A registry declaring all templates the translators use as parents or
/// member origins.
pub fn api_registry() -> ApiRegistry {
    use MemberType::*;

    let mut b = ApiRegistryBuilder::new();
    let mut add = |name: &str, parents: &[&str], members: Vec<MemberDef>| {
        b.register_template(name, parents, members).unwrap();
    };

    add(
        GAME_ENTITY,
        &[],
        vec![
            MemberDef::new("types", Set),
            MemberDef::new("abilities", Set),
            MemberDef::with_default("modifiers", Set, NyanValue::Set(Vec::new())),
        ],
    );
    add(ABILITY, &[], vec![]);
    add(
        ANIMATED_ABILITY,
        &[ABILITY],
        vec![MemberDef::new("animations", Set)],
    );
    add(IDLE, &[ABILITY], vec![]);
    add(LIVE, &[ABILITY], vec![MemberDef::new("attributes", Set)]);
    add(CREATE, &[ABILITY], vec![MemberDef::new("creatables", Set)]);
    add(RESEARCH, &[ABILITY], vec![MemberDef::new("researchables", Set)]);
    add(PROVIDE_CONTINGENT, &[ABILITY], vec![MemberDef::new("amount", Set)]);
    add(
        SHOOT_PROJECTILE,
        &[ABILITY],
        vec![MemberDef::new("spawn_delay", Float)],
    );
    add(ANIMATION, &[], vec![MemberDef::new("sprite", File)]);
    add(
        ATTRIBUTE_SETTING,
        &[],
        vec![
            MemberDef::new("attribute", Object),
            MemberDef::new("min_value", Int),
            MemberDef::new("max_value", Int),
            MemberDef::new("starting_value", Int),
        ],
    );
    add(
        RESOURCE_AMOUNT,
        &[],
        vec![
            MemberDef::new("type", Object),
            MemberDef::new("amount", Float),
        ],
    );
    add(
        CREATABLE_GAME_ENTITY,
        &[],
        vec![
            MemberDef::new("game_entity", Object),
            MemberDef::new("creation_time", Float),
        ],
    );
    add(TECH, &[], vec![MemberDef::new("updates", Set)]);
    add(
        RESEARCHABLE_TECH,
        &[],
        vec![
            MemberDef::new("tech", Object),
            MemberDef::new("research_time", Float),
        ],
    );
    add(
        CIVILIZATION,
        &[],
        vec![
            MemberDef::new("civ_bonuses", Set),
            MemberDef::new("unique_units", Set),
        ],
    );

    b.build().unwrap()
}
