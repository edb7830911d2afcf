//! Game entities and their creatables.

use crate::ability;
use crate::catalog::{Catalog, Entity};
use crate::{TranslateError, add_object};
use modforge_core::dataset::DataSet;
use modforge_core::reference::DeferredRef;
use modforge_core::staging::{RawValue, StagingObject};
use tracing::debug;

pub const GAME_ENTITY: &str = "engine.aux.game_entity.GameEntity";
pub const CREATABLE_GAME_ENTITY: &str = "engine.aux.create.CreatableGameEntity";

pub const UNIT_TYPE: &str = "aux.game_entity_type.types.Unit";
pub const BUILDING_TYPE: &str = "aux.game_entity_type.types.Building";

/// Translate one line into a game entity with its abilities. Lines that
/// are trained somewhere also get a creatable.
pub fn translate_game_entity(
    data: &mut DataSet,
    catalog: &Catalog,
    entity: &Entity,
) -> Result<DeferredRef, TranslateError> {
    let mut abilities = vec![
        ability::idle_ability(data, entity)?,
        ability::live_ability(data, entity)?,
    ];
    abilities.extend(ability::provide_contingent_ability(data, entity)?);
    abilities.extend(ability::shoot_projectile_ability(data, entity)?);
    abilities.extend(ability::create_ability(data, catalog, entity)?);
    abilities.extend(ability::research_ability(data, catalog, entity)?);

    let entity_type = if entity.building { BUILDING_TYPE } else { UNIT_TYPE };

    let mut game_entity = StagingObject::new(
        entity.name.name.as_str(),
        entity.name.name.as_str(),
        entity.directory().as_str(),
    );
    game_entity.set_filename(&entity.name.filename);
    game_entity.add_raw_parent(GAME_ENTITY);
    game_entity.add_raw_member(
        "types",
        vec![RawValue::Object(entity_type.to_string())],
        GAME_ENTITY,
    );
    game_entity.add_raw_member("abilities", abilities, GAME_ENTITY);
    game_entity.add_raw_member("modifiers", Vec::<RawValue>::new(), GAME_ENTITY);
    let reference = add_object(data, entity.key, game_entity)?;

    if entity.train_location.is_some() {
        creatable_game_entity(data, entity)?;
    }
    debug!(entity = %entity.name.name, group = %entity.key, "translated game entity");
    Ok(reference)
}

/// Creatable pointing at the entity, nested in it. Creation time is taken
/// from the head unit.
pub fn creatable_game_entity(data: &mut DataSet, entity: &Entity) -> Result<DeferredRef, TranslateError> {
    let creation_time = data.unit(entity.head_unit)?.int_or("creation_time", 0)?;

    let mut creatable = StagingObject::new(
        entity.nested_id("CreatableGameEntity"),
        "CreatableGameEntity",
        entity.reference(),
    );
    creatable.add_raw_parent(CREATABLE_GAME_ENTITY);
    creatable.add_raw_member("game_entity", entity.reference(), CREATABLE_GAME_ENTITY);
    creatable.add_raw_member("creation_time", creation_time as f64, CREATABLE_GAME_ENTITY);
    add_object(data, entity.key, creatable)
}
