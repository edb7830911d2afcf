//! Finalization: turn every staging object into a ready target object.

use crate::dataset::DataSet;
use crate::linker::LinkError;
use crate::nyan::{ApiRegistry, NyanError};
use crate::record::RecordError;
use crate::reference::{ReferenceError, SymbolTable};
use crate::staging::StagingError;
use crate::time::TimeError;
use tracing::info;

/// Any failure of a conversion run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Nyan(#[from] NyanError),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Materialize all staging objects, check that every location chain ends
/// in a path, then fill all members.
///
/// Returns the symbol table the members were resolved against; export
/// uses it to place nested objects.
pub fn finalize(data: &mut DataSet, registry: &ApiRegistry) -> Result<SymbolTable, ConvertError> {
    for (_, group) in data.groups.iter_mut() {
        group.materialize_all(registry)?;
    }

    let symbols = SymbolTable::collect(&data.groups);
    symbols.check_locations()?;

    for (_, group) in data.groups.iter_mut() {
        group.fill_all(registry, &symbols)?;
    }

    info!(
        groups = data.groups.len(),
        objects = symbols.len(),
        "finalized staging objects"
    );
    Ok(symbols)
}
