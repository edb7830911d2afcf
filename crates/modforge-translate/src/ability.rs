//! Ability translators. Each adds its ability object (and any objects
//! nested in it) to the entity's group and returns a reference to the
//! ability, or `None` when the entity has nothing to put into it.

use crate::catalog::{Catalog, Entity};
use crate::{TranslateError, add_object};
use modforge_core::dataset::DataSet;
use modforge_core::reference::DeferredRef;
use modforge_core::staging::{RawValue, StagingObject};
use modforge_core::time::frame_to_seconds;
use tracing::debug;

pub const CREATE: &str = "engine.ability.type.Create";
pub const IDLE: &str = "engine.ability.type.Idle";
pub const LIVE: &str = "engine.ability.type.Live";
pub const PROVIDE_CONTINGENT: &str = "engine.ability.type.ProvideContingent";
pub const RESEARCH: &str = "engine.ability.type.Research";
pub const SHOOT_PROJECTILE: &str = "engine.ability.type.ShootProjectile";
pub const ANIMATED_ABILITY: &str = "engine.ability.specialization.AnimatedAbility";
pub const ANIMATION: &str = "engine.aux.graphics.Animation";
pub const ATTRIBUTE_SETTING: &str = "engine.aux.attribute.AttributeSetting";
pub const RESOURCE_AMOUNT: &str = "engine.aux.resource.ResourceAmount";

/// Objects predefined by the modpack, referenced by name.
pub const HEALTH: &str = "aux.attribute.types.Health";
pub const POPULATION_SPACE: &str = "aux.resource.types.PopulationSpace";

/// Resource storage type holding population space.
const POP_SPACE_STORAGE: i64 = 4;

fn ability_object(entity: &Entity, name: &str, parent: &str) -> StagingObject {
    let mut ability = StagingObject::new(entity.nested_id(name), name, entity.reference());
    ability.add_raw_parent(parent);
    ability
}

/// Create: lines whose head unit is trained by this entity. Lines unique
/// to a civilization are left to the civ.
pub fn create_ability(
    data: &mut DataSet,
    catalog: &Catalog,
    entity: &Entity,
) -> Result<Option<DeferredRef>, TranslateError> {
    let creatables: Vec<DeferredRef> = catalog
        .entities
        .iter()
        .filter(|other| other.is_created_by(entity) && !catalog.is_unique(other.key))
        .map(|other| DeferredRef::new(other.key, other.nested_id("CreatableGameEntity")))
        .collect();
    if creatables.is_empty() {
        return Ok(None);
    }

    let mut ability = ability_object(entity, "Create", CREATE);
    ability.add_raw_member("creatables", creatables, CREATE);
    add_object(data, entity.key, ability).map(Some)
}

/// Idle, animated with the head unit's idle graphic if it has one.
pub fn idle_ability(data: &mut DataSet, entity: &Entity) -> Result<DeferredRef, TranslateError> {
    let graphic_id = data.unit(entity.head_unit)?.int_or("idle_graphic0", -1)?;

    let mut ability = ability_object(entity, "Idle", IDLE);
    if graphic_id > -1 {
        ability.add_raw_parent(ANIMATED_ABILITY);

        let animation_id = entity.nested_id("Idle.IdleAnimation");
        let mut animation = StagingObject::new(
            animation_id.as_str(),
            "IdleAnimation",
            DeferredRef::new(entity.key, ability.id()),
        );
        animation.add_raw_parent(ANIMATION);
        let sprite = data.reference_sprite(
            graphic_id,
            &format!("idle_{}", entity.name.filename),
            &animation_id,
        );
        animation.add_raw_member("sprite", sprite, ANIMATION);

        let animation = add_object(data, entity.key, animation)?;
        ability.add_raw_member("animations", vec![animation], ANIMATED_ABILITY);
    }
    add_object(data, entity.key, ability)
}

/// Live with a single health attribute.
pub fn live_ability(data: &mut DataSet, entity: &Entity) -> Result<DeferredRef, TranslateError> {
    let hit_points = data.unit(entity.head_unit)?.get_int("hit_points")?;

    let mut ability = ability_object(entity, "Live", LIVE);
    let mut health = StagingObject::new(
        entity.nested_id("Live.Health"),
        "Health",
        DeferredRef::new(entity.key, ability.id()),
    );
    health.add_raw_parent(ATTRIBUTE_SETTING);
    health.add_raw_member("attribute", RawValue::Object(HEALTH.to_string()), ATTRIBUTE_SETTING);
    health.add_raw_member("min_value", -1i64, ATTRIBUTE_SETTING);
    health.add_raw_member("max_value", hit_points, ATTRIBUTE_SETTING);
    health.add_raw_member("starting_value", hit_points, ATTRIBUTE_SETTING);

    let health = add_object(data, entity.key, health)?;
    ability.add_raw_member("attributes", vec![health], LIVE);
    add_object(data, entity.key, ability)
}

/// ShootProjectile for units that fire a projectile. The spawn delay is
/// `frame_delay` frames of the attack graphic; without one it is zero.
pub fn shoot_projectile_ability(
    data: &mut DataSet,
    entity: &Entity,
) -> Result<Option<DeferredRef>, TranslateError> {
    let unit = data.unit(entity.head_unit)?;
    if unit.int_or("projectile_id0", -1)? < 0 {
        return Ok(None);
    }
    let frame_delay = unit.int_or("frame_delay", 0)?;
    let attack_graphic = unit.int_or("attack_graphic", -1)?;
    let frame_rate = if attack_graphic > -1 {
        data.graphic(attack_graphic)?.get_float("frame_rate")?
    } else {
        0.0
    };
    let spawn_delay = frame_to_seconds(frame_delay, frame_rate)?;

    let mut ability = ability_object(entity, "ShootProjectile", SHOOT_PROJECTILE);
    ability.add_raw_member("spawn_delay", spawn_delay, SHOOT_PROJECTILE);
    add_object(data, entity.key, ability).map(Some)
}

/// ProvideContingent from the population space slots of the head unit's
/// resource storage.
pub fn provide_contingent_ability(
    data: &mut DataSet,
    entity: &Entity,
) -> Result<Option<DeferredRef>, TranslateError> {
    let unit = data.unit(entity.head_unit)?;
    let mut amounts = Vec::new();
    if unit.has_member("resource_storage") {
        for slot in unit.get_container("resource_storage")? {
            if slot.get_int("type")? == POP_SPACE_STORAGE {
                amounts.push(slot.get_float("amount")?);
            }
        }
    }
    if amounts.is_empty() {
        debug!(entity = %entity.name.name, "no contingent provided");
        return Ok(None);
    }

    let mut ability = ability_object(entity, "ProvideContingent", PROVIDE_CONTINGENT);
    let mut contingents = Vec::with_capacity(amounts.len());
    for amount in amounts {
        let mut pop_space = StagingObject::new(
            entity.nested_id("ProvideContingent.PopSpace"),
            "PopSpace",
            DeferredRef::new(entity.key, ability.id()),
        );
        pop_space.add_raw_parent(RESOURCE_AMOUNT);
        pop_space.add_raw_member(
            "type",
            RawValue::Object(POPULATION_SPACE.to_string()),
            RESOURCE_AMOUNT,
        );
        pop_space.add_raw_member("amount", amount, RESOURCE_AMOUNT);
        contingents.push(add_object(data, entity.key, pop_space)?);
    }
    ability.add_raw_member("amount", contingents, PROVIDE_CONTINGENT);
    add_object(data, entity.key, ability).map(Some)
}

/// Research: techs researched at this entity. Civ-specific techs are left
/// to the civ.
pub fn research_ability(
    data: &mut DataSet,
    catalog: &Catalog,
    entity: &Entity,
) -> Result<Option<DeferredRef>, TranslateError> {
    let researchables: Vec<DeferredRef> = catalog
        .techs
        .iter()
        .filter(|t| t.tech.research_location() == Some(entity.head_unit) && !t.tech.is_unique())
        .map(|t| DeferredRef::new(t.key, t.nested_id("ResearchableTech")))
        .collect();
    if researchables.is_empty() {
        return Ok(None);
    }

    let mut ability = ability_object(entity, "Research", RESEARCH);
    ability.add_raw_member("researchables", researchables, RESEARCH);
    add_object(data, entity.key, ability).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::id::GroupKey;
    use modforge_core::linker;
    use modforge_core::staging::Location;
    use modforge_core::test_utils::{ARCHERY_RANGE, HOUSE, archer_data_set, graphic};
    use modforge_core::time::TimeError;
    use modforge_core::value::ValueMember;
    use modforge_data::NameTable;

    fn setup() -> (DataSet, Catalog) {
        let mut data = archer_data_set();
        linker::link(&mut data).unwrap();
        let catalog = Catalog::build(&data, &NameTable::new()).unwrap();
        (data, catalog)
    }

    fn entity(catalog: &Catalog, key: GroupKey) -> Entity {
        catalog.entity(key).unwrap().clone()
    }

    #[test]
    fn create_skips_unique_lines() {
        let (mut data, catalog) = setup();
        let range = entity(&catalog, GroupKey::BuildingLine(ARCHERY_RANGE));

        let reference = create_ability(&mut data, &catalog, &range).unwrap().unwrap();
        assert_eq!(reference.target(), "ArcheryRange.Create");

        let group = data.groups.get(range.key).unwrap();
        let create = group.get_staging_object("ArcheryRange.Create").unwrap();
        assert_eq!(
            create.raw_members()[0].value,
            RawValue::List(vec![RawValue::Reference(DeferredRef::new(
                GroupKey::UnitLine(4),
                "Archer.CreatableGameEntity"
            ))])
        );
    }

    #[test]
    fn create_without_creatables_is_skipped() {
        let (mut data, catalog) = setup();
        let house = entity(&catalog, GroupKey::BuildingLine(HOUSE));
        assert_eq!(create_ability(&mut data, &catalog, &house).unwrap(), None);
    }

    #[test]
    fn idle_registers_sprite() {
        let (mut data, catalog) = setup();
        let archer = entity(&catalog, GroupKey::UnitLine(4));
        idle_ability(&mut data, &archer).unwrap();

        let sprite = &data.combined_sprites[&1203];
        assert_eq!(sprite.filename, "idle_archer");
        assert_eq!(sprite.references(), ["Archer.Idle.IdleAnimation".to_string()]);

        let group = data.groups.get(archer.key).unwrap();
        let idle = group.get_staging_object("Archer.Idle").unwrap();
        assert_eq!(idle.raw_parents(), [IDLE, ANIMATED_ABILITY]);
        let animation = group.get_staging_object("Archer.Idle.IdleAnimation").unwrap();
        assert_eq!(
            animation.location(),
            &Location::Nested(DeferredRef::new(archer.key, "Archer.Idle"))
        );
    }

    #[test]
    fn live_carries_hit_points() {
        let (mut data, catalog) = setup();
        let archer = entity(&catalog, GroupKey::UnitLine(4));
        live_ability(&mut data, &archer).unwrap();

        let group = data.groups.get(archer.key).unwrap();
        let health = group.get_staging_object("Archer.Live.Health").unwrap();
        let max = health
            .raw_members()
            .iter()
            .find(|m| m.name == "max_value")
            .unwrap();
        assert_eq!(max.value, RawValue::Int(30));
    }

    fn arm_archer(data: &mut DataSet, frame_delay: i64, attack_graphic: i64) {
        let archer = data.units.get_mut(&4).unwrap();
        archer.add_member(ValueMember::int("projectile_id0", 9));
        archer.add_member(ValueMember::int("frame_delay", frame_delay));
        archer.add_member(ValueMember::int("attack_graphic", attack_graphic));
    }

    #[test]
    fn spawn_delay_from_attack_graphic() {
        let (mut data, catalog) = setup();
        arm_archer(&mut data, 5, 1203);
        let archer = entity(&catalog, GroupKey::UnitLine(4));

        let reference = shoot_projectile_ability(&mut data, &archer).unwrap().unwrap();
        assert_eq!(reference.target(), "Archer.ShootProjectile");
        let group = data.groups.get(archer.key).unwrap();
        let shoot = group.get_staging_object("Archer.ShootProjectile").unwrap();
        assert_eq!(shoot.raw_members()[0].value, RawValue::Float(5.0 * 0.1));

        let house = entity(&catalog, GroupKey::BuildingLine(HOUSE));
        assert_eq!(shoot_projectile_ability(&mut data, &house).unwrap(), None);
    }

    #[test]
    fn spawn_delay_without_attack_graphic_is_zero() {
        let (mut data, catalog) = setup();
        arm_archer(&mut data, 5, -1);
        let archer = entity(&catalog, GroupKey::UnitLine(4));
        shoot_projectile_ability(&mut data, &archer).unwrap();

        let group = data.groups.get(archer.key).unwrap();
        let shoot = group.get_staging_object("Archer.ShootProjectile").unwrap();
        assert_eq!(shoot.raw_members()[0].value, RawValue::Float(0.0));
    }

    #[test]
    fn unusable_frame_rate_fails() {
        let (mut data, catalog) = setup();
        arm_archer(&mut data, 5, 1203);
        data.graphics.insert(1203, graphic(1203, 10, f64::NAN));
        let archer = entity(&catalog, GroupKey::UnitLine(4));

        assert!(matches!(
            shoot_projectile_ability(&mut data, &archer),
            Err(TranslateError::Time(TimeError::InvalidFrameRate(_)))
        ));
    }

    #[test]
    fn contingent_only_for_population_space() {
        let (mut data, catalog) = setup();
        let house = entity(&catalog, GroupKey::BuildingLine(HOUSE));
        let archer = entity(&catalog, GroupKey::UnitLine(4));

        assert!(provide_contingent_ability(&mut data, &house).unwrap().is_some());
        assert_eq!(provide_contingent_ability(&mut data, &archer).unwrap(), None);

        let group = data.groups.get(house.key).unwrap();
        let pop_space = group
            .get_staging_object("House.ProvideContingent.PopSpace")
            .unwrap();
        assert_eq!(pop_space.raw_members()[1].value, RawValue::Float(5.0));
    }

    #[test]
    fn research_lists_techs_at_building() {
        let (mut data, catalog) = setup();
        let range = entity(&catalog, GroupKey::BuildingLine(ARCHERY_RANGE));
        research_ability(&mut data, &catalog, &range).unwrap().unwrap();

        let group = data.groups.get(range.key).unwrap();
        let research = group.get_staging_object("ArcheryRange.Research").unwrap();
        let RawValue::List(items) = &research.raw_members()[0].value else {
            panic!("researchables must be a list");
        };
        assert_eq!(items.len(), 3);
        assert!(items.contains(&RawValue::Reference(DeferredRef::new(
            GroupKey::Tech(3),
            "Fletching.ResearchableTech"
        ))));

        let house = entity(&catalog, GroupKey::BuildingLine(HOUSE));
        assert_eq!(research_ability(&mut data, &catalog, &house).unwrap(), None);
    }
}
