//! Turn a finalized data set into a [`Modpack`] and write it to disk.

use crate::ExportError;
use crate::modpack::{MediaKind, MediaRequest, Modpack};
use crate::render::render_object;
use modforge_core::dataset::DataSet;
use modforge_core::id::GroupKey;
use modforge_core::nyan::ApiRegistry;
use modforge_core::reference::SymbolTable;
use modforge_core::staging::{Location, StagingObject};
use modforge_data::ConversionSettings;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INFO_FILE: &str = "modpack.toml";

struct Placed<'a> {
    object: &'a StagingObject,
    directory: String,
    filename: String,
}

/// Place every ready object in its file and collect media requests.
///
/// An object is written inside its parent when it has no file name of its
/// own and ends up in the same file; otherwise it is a top-level object of
/// its file.
pub fn build_modpack(
    data: &DataSet,
    symbols: &SymbolTable,
    registry: &ApiRegistry,
    settings: &ConversionSettings,
) -> Result<Modpack, ExportError> {
    let mut keys: Vec<GroupKey> = data.groups.keys().collect();
    keys.sort();

    let mut placed: Vec<Placed<'_>> = Vec::new();
    let mut index: HashMap<(GroupKey, &str), usize> = HashMap::new();
    for key in keys {
        let Some(group) = data.groups.get(key) else {
            continue;
        };
        for object in group.staging_objects() {
            object.ensure_ready()?;
            let (directory, filename) = object.get_file_location(symbols)?;
            let filename = filename.ok_or_else(|| ExportError::MissingFilename {
                object: object.id().to_string(),
            })?;
            index.insert((key, object.id()), placed.len());
            placed.push(Placed {
                object,
                directory,
                filename,
            });
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); placed.len()];
    let mut roots = Vec::new();
    for (i, entry) in placed.iter().enumerate() {
        let parent = match entry.object.location() {
            Location::Nested(parent) if entry.object.filename().is_none() => index
                .get(&(parent.group(), parent.target()))
                .copied()
                .filter(|&p| {
                    placed[p].directory == entry.directory && placed[p].filename == entry.filename
                }),
            _ => None,
        };
        match parent {
            Some(p) => children[p].push(i),
            None => roots.push(i),
        }
    }

    let mut modpack = Modpack::new(settings);
    for root in roots {
        let text = render_tree(&placed, &children, root, registry)?;
        let entry = &placed[root];
        modpack
            .data_file(&entry.directory, &entry.filename)
            .objects
            .push(text);
    }

    for sprite in data.combined_sprites.values() {
        if sprite.is_referenced() || settings.export_unreferenced_media {
            modpack.media.push(MediaRequest {
                kind: MediaKind::Sprite,
                source_id: sprite.head_sprite_id,
                target: sprite.relative_sprite_location(),
            });
        }
    }
    for sound in data.combined_sounds.values() {
        if sound.is_referenced() || settings.export_unreferenced_media {
            modpack.media.push(MediaRequest {
                kind: MediaKind::Sound,
                source_id: sound.head_sound_id,
                target: sound.relative_file_location(),
            });
        }
    }

    info!(
        files = modpack.data_files.len(),
        objects = placed.len(),
        media = modpack.media.len(),
        "built modpack"
    );
    Ok(modpack)
}

fn render_tree(
    placed: &[Placed<'_>],
    children: &[Vec<usize>],
    i: usize,
    registry: &ApiRegistry,
) -> Result<String, ExportError> {
    let nested = children[i]
        .iter()
        .map(|&c| render_tree(placed, children, c, registry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(render_object(placed[i].object, registry, &nested)?)
}

/// Write `modpack.toml` and all data files below `export_dir/<name>/`.
/// Returns the modpack root.
pub fn write_modpack(modpack: &Modpack, export_dir: &Path) -> Result<PathBuf, ExportError> {
    let root = export_dir.join(&modpack.name);
    fs::create_dir_all(&root)?;
    fs::write(root.join(INFO_FILE), modpack.definition().to_toml()?)?;

    for file in modpack.data_files.values() {
        let path = root.join(file.relative_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, file.contents())?;
        debug!(path = %path.display(), objects = file.objects.len(), "wrote data file");
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::linker;
    use modforge_core::pipeline::finalize;
    use modforge_core::test_utils::archer_data_set;
    use modforge_data::NameTable;
    use modforge_translate::test_utils::api_registry;
    use modforge_translate::translate_all;

    fn archer_modpack(settings: &ConversionSettings) -> Modpack {
        let mut data = archer_data_set();
        linker::link(&mut data).unwrap();
        translate_all(&mut data, &NameTable::new()).unwrap();
        let registry = api_registry();
        let symbols = finalize(&mut data, &registry).unwrap();
        build_modpack(&data, &symbols, &registry, settings).unwrap()
    }

    #[test]
    fn one_file_per_root_object() {
        let modpack = archer_modpack(&ConversionSettings::default());
        let archer = &modpack.data_files["data/game_entity/generic/archer/archer.nyan"];
        assert_eq!(archer.objects.len(), 1);

        let text = &archer.objects[0];
        assert!(text.starts_with("Archer(engine.aux.game_entity.GameEntity):\n"));
        assert!(text.contains("\n    abilities = {Archer.Idle, Archer.Live}\n"));
        assert!(text.contains("\n    Live(engine.ability.type.Live):\n"));
        assert!(text.contains("\n        Health(engine.aux.attribute.AttributeSetting):\n"));
        assert!(text.contains("\n            max_value = 30\n"));
        assert!(text.contains("\n    CreatableGameEntity(engine.aux.create.CreatableGameEntity):\n"));

        assert!(modpack.data_files.contains_key("data/civ/britons/britons.nyan"));
        assert!(modpack.data_files.contains_key("data/tech/generic/fletching/fletching.nyan"));
    }

    #[test]
    fn only_referenced_media_requested() {
        let mut data = archer_data_set();
        linker::link(&mut data).unwrap();
        translate_all(&mut data, &NameTable::new()).unwrap();
        let registry = api_registry();
        let symbols = finalize(&mut data, &registry).unwrap();

        if let Some(sprite) = data.combined_sprites.get_mut(&1203) {
            sprite.remove_reference("Archer.Idle.IdleAnimation");
        }
        let modpack =
            build_modpack(&data, &symbols, &registry, &ConversionSettings::default()).unwrap();
        assert!(modpack.media.iter().all(|m| m.source_id != 1203));
        assert!(modpack.media.iter().any(|m| m.target == "graphics/idle_archery_range.sprite"));

        let settings = ConversionSettings {
            export_unreferenced_media: true,
            ..ConversionSettings::default()
        };
        let modpack = build_modpack(&data, &symbols, &registry, &settings).unwrap();
        assert!(modpack.media.iter().any(|m| m.source_id == 1203));
    }

    #[test]
    fn unfinalized_objects_are_rejected() {
        let mut data = archer_data_set();
        linker::link(&mut data).unwrap();
        translate_all(&mut data, &NameTable::new()).unwrap();
        let symbols = SymbolTable::collect(&data.groups);
        assert!(matches!(
            build_modpack(&data, &symbols, &api_registry(), &ConversionSettings::default()),
            Err(ExportError::Staging(_))
        ));
    }

    #[test]
    fn write_creates_info_and_data_files() {
        let modpack = archer_modpack(&ConversionSettings::default());
        let dir = std::env::temp_dir().join(format!("modforge_export_test_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let root = write_modpack(&modpack, &dir).unwrap();
        assert_eq!(root, dir.join("aoe2_base"));
        let info = fs::read_to_string(root.join("modpack.toml")).unwrap();
        assert!(info.contains("name = \"aoe2_base\""));
        let archer =
            fs::read_to_string(root.join("data/game_entity/generic/archer/archer.nyan")).unwrap();
        assert!(archer.starts_with("Archer("));

        let _ = fs::remove_dir_all(&dir);
    }
}
