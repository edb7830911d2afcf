//! Property tests across the reader, the linker and the symbol table.

use modforge_core::dataset::DataSet;
use modforge_core::id::GroupKey;
use modforge_core::linker;
use modforge_core::reference::{DeferredRef, Symbol, SymbolTable};
use modforge_core::staging::Location;
use modforge_core::test_utils::{named_unit, unit_connection};
use modforge_data::names::{file_stem, object_name};
use proptest::prelude::*;

/// A unit line given as connections in source order: the first is the head,
/// every later one names the previous unit as its predecessor.
fn chain_data_set(ids: &[i64]) -> DataSet {
    let mut data = DataSet::new();
    for (i, &id) in ids.iter().enumerate() {
        data.units.insert(id, named_unit(id, "Unit", 10, -1));
        let connection = if i == 0 {
            unit_connection(id, ids[0], 2, &[], -1, -1)
        } else {
            unit_connection(id, ids[0], 3, &[(2, ids[i - 1])], -1, -1)
        };
        data.unit_connections.push(connection);
    }
    data
}

proptest! {
    #[test]
    fn linked_line_follows_predecessor_chain(
        ids in proptest::collection::hash_set(1i64..5_000, 1..20)
    ) {
        let ids: Vec<i64> = ids.into_iter().collect();
        let mut data = chain_data_set(&ids);
        linker::link(&mut data).unwrap();

        let group = data.groups.get(GroupKey::UnitLine(ids[0])).unwrap();
        prop_assert_eq!(group.kind().line().unwrap().units(), ids.as_slice());
    }

    #[test]
    fn nested_locations_end_at_root_path(depth in 1usize..40) {
        let key = GroupKey::UnitLine(4);
        let mut symbols = SymbolTable::new();
        symbols.insert(key, "Root", Symbol {
            identifier: "Root".into(),
            location: Location::Path("data/root/".into()),
            filename: Some("root.nyan".into()),
        });
        let mut parent = "Root".to_string();
        for level in 0..depth {
            let id = format!("{parent}.N{level}");
            symbols.insert(key, &id, Symbol {
                identifier: id.clone(),
                location: Location::Nested(DeferredRef::new(key, parent.as_str())),
                filename: None,
            });
            parent = id;
        }

        prop_assert!(symbols.check_locations().is_ok());
        let (path, root) = symbols.root_of(&DeferredRef::new(key, parent.as_str())).unwrap();
        prop_assert_eq!(path, "data/root/");
        prop_assert_eq!(root.identifier.as_str(), "Root");
    }

    #[test]
    fn file_stems_are_lower_snake_case(text in "[A-Za-z0-9 ()_-]{0,30}") {
        let name = object_name(&text);
        let stem = file_stem(&name);
        prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
        prop_assert!(stem.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        prop_assert_eq!(stem.replace('_', ""), name.to_ascii_lowercase());
    }
}
