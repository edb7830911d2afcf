//! Objects may be created before the objects they reference; the result
//! must not depend on the order translators run in.

use modforge_core::dataset::DataSet;
use modforge_core::linker;
use modforge_core::pipeline::finalize;
use modforge_core::test_utils::archer_data_set;
use modforge_data::{ConversionSettings, NameTable};
use modforge_export::{Modpack, build_modpack};
use modforge_translate::test_utils::api_registry;
use modforge_translate::{Catalog, civ, entity, tech, translate_all};

fn export(mut data: DataSet) -> Modpack {
    let registry = api_registry();
    let symbols = finalize(&mut data, &registry).unwrap();
    build_modpack(&data, &symbols, &registry, &ConversionSettings::default()).unwrap()
}

fn linked() -> DataSet {
    let mut data = archer_data_set();
    linker::link(&mut data).unwrap();
    data
}

#[test]
fn reversed_translation_order_gives_same_modpack() {
    let mut forward = linked();
    translate_all(&mut forward, &NameTable::new()).unwrap();

    let mut reversed = linked();
    let catalog = Catalog::build(&reversed, &NameTable::new()).unwrap();
    // Civilizations first: every reference they hold is dangling at this point.
    for c in catalog.civs.iter().rev() {
        civ::translate_civ(&mut reversed, &catalog, c).unwrap();
    }
    for t in catalog.techs.iter().rev() {
        tech::translate_tech(&mut reversed, t).unwrap();
    }
    for e in catalog.entities.iter().rev() {
        entity::translate_game_entity(&mut reversed, &catalog, e).unwrap();
    }

    assert_eq!(export(forward), export(reversed));
}

#[test]
fn reference_to_untranslated_group_fails_at_finalize() {
    let mut data = linked();
    let catalog = Catalog::build(&data, &NameTable::new()).unwrap();
    // Britons point at the Longbowman entity, which is never translated.
    let britons = catalog.civs.iter().find(|c| c.civ_id == 1).unwrap();
    civ::translate_civ(&mut data, &catalog, britons).unwrap();

    let registry = api_registry();
    assert!(finalize(&mut data, &registry).is_err());
}
