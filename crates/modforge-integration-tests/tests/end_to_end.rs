//! Full conversion of the archer fixture: load, link, translate, finalize
//! and write.

use modforge_export::{ExportError, MediaKind, convert};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/archers")
}

fn make_export_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "modforge_e2e_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).unwrap_or_else(|e| panic!("{file}: {e}"))
}

#[test]
fn archer_fixture_converts() {
    let out = make_export_dir("archers");
    let summary = convert(&fixture_dir(), &out).unwrap();

    assert_eq!(summary.root, out.join("archers"));
    // Five game entities, five techs, two civilizations.
    assert_eq!(summary.files, 12);
    assert_eq!(summary.objects, 12);

    let info = read(&summary.root, "modpack.toml");
    assert!(info.contains("name = \"archers\""));
    assert!(info.contains("version = \"0.2.0\""));
    assert!(info.contains("data/civ/britons/britons.nyan"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn entities_carry_their_abilities() {
    let out = make_export_dir("entities");
    let summary = convert(&fixture_dir(), &out).unwrap();
    let root = &summary.root;

    let archer = read(root, "data/game_entity/generic/archer/archer.nyan");
    assert!(archer.starts_with("Archer(engine.aux.game_entity.GameEntity):\n"));
    assert!(archer.contains("    types = {aux.game_entity_type.types.Unit}\n"));
    assert!(archer.contains("    abilities = {Archer.Idle, Archer.Live, Archer.ShootProjectile}\n"));
    assert!(archer.contains(
        "    Idle(engine.ability.type.Idle, engine.ability.specialization.AnimatedAbility):\n"
    ));
    assert!(archer.contains("            sprite = \"graphics/idle_archer.sprite\"\n"));
    assert!(archer.contains("            max_value = 30\n"));
    assert!(archer.contains("        creation_time = 35.0\n"));
    // Five frames of the attack graphic at 0.1s each.
    assert!(archer.contains(
        "    ShootProjectile(engine.ability.type.ShootProjectile):\n        spawn_delay = 0.5\n"
    ));
    // Inherited defaults stay implicit.
    assert!(!archer.contains("priority"));

    // Named through the names file, including the file stem.
    let range = read(root, "data/game_entity/generic/range/range.nyan");
    assert!(range.starts_with("ArcheryRange("));
    assert!(range.contains("        creatables = {Archer.CreatableGameEntity}\n"));
    assert!(range.contains(
        "        researchables = {Crossbowman.ResearchableTech, Arbalest.ResearchableTech, Fletching.ResearchableTech}\n"
    ));

    let house = read(root, "data/game_entity/generic/house/house.nyan");
    assert!(house.contains("    types = {aux.game_entity_type.types.Building}\n"));
    assert!(house.contains("            amount = 5.0\n"));

    let villager = read(root, "data/game_entity/generic/villager/villager.nyan");
    assert!(villager.starts_with("Villager("));
    assert!(!villager.contains("CreatableGameEntity"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn techs_and_civs_reference_each_other() {
    let out = make_export_dir("techs");
    let summary = convert(&fixture_dir(), &out).unwrap();
    let root = &summary.root;

    let fletching = read(root, "data/tech/generic/fletching/fletching.nyan");
    assert!(fletching.starts_with("Fletching(engine.aux.tech.Tech):\n    updates = {}\n"));
    assert!(fletching.contains("        tech = Fletching\n"));
    assert!(fletching.contains("        research_time = 30.0\n"));

    let feudal = read(root, "data/tech/generic/feudal_age/feudal_age.nyan");
    assert!(feudal.starts_with("FeudalAge("));

    // The unlock tech is named apart from the unit it unlocks.
    let unlock = read(root, "data/tech/generic/longbowman_tech/longbowman_tech.nyan");
    assert!(unlock.starts_with("LongbowmanTech(engine.aux.tech.Tech):"));
    assert!(!unlock.contains("ResearchableTech"));

    let britons = read(root, "data/civ/britons/britons.nyan");
    assert!(britons.contains("    civ_bonuses = {LongbowmanTech}\n"));
    assert!(britons.contains("    unique_units = {Longbowman}\n"));

    let gaia = read(root, "data/civ/gaia/gaia.nyan");
    assert!(gaia.contains("    civ_bonuses = {}\n"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn referenced_sprites_are_requested() {
    let out = make_export_dir("media");
    let summary = convert(&fixture_dir(), &out).unwrap();

    let mut targets: Vec<&str> = summary.media.iter().map(|m| m.target.as_str()).collect();
    targets.sort();
    assert_eq!(
        targets,
        [
            "graphics/idle_archer.sprite",
            "graphics/idle_house.sprite",
            "graphics/idle_longbowman.sprite",
            "graphics/idle_range.sprite",
            "graphics/idle_villager.sprite",
        ]
    );
    assert!(summary.media.iter().all(|m| m.kind == MediaKind::Sprite));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn missing_template_aborts_before_writing() {
    let source = make_export_dir("broken_source");
    for file in ["gamedata.json", "names.toml", "settings.ron"] {
        fs::copy(fixture_dir().join(file), source.join(file)).unwrap();
    }
    let api = fs::read_to_string(fixture_dir().join("api.toml")).unwrap();
    let cut = api
        .find("[[templates]]\nname = \"engine.aux.civilization.Civilization\"")
        .unwrap();
    fs::write(source.join("api.toml"), &api[..cut]).unwrap();

    let out = make_export_dir("broken_out");
    let err = convert(&source, &out).unwrap_err();
    assert!(matches!(err, ExportError::Convert(_)), "{err}");
    assert!(!out.join("archers").exists());

    let _ = fs::remove_dir_all(&source);
    let _ = fs::remove_dir_all(&out);
}

#[test]
fn missing_gamedata_is_a_load_error() {
    let source = make_export_dir("empty_source");
    let out = make_export_dir("empty_out");
    assert!(matches!(
        convert(&source, &out),
        Err(ExportError::Load(_))
    ));
    let _ = fs::remove_dir_all(&source);
    let _ = fs::remove_dir_all(&out);
}
