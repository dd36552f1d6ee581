use anyhow::bail;
use shelter_graph_core::{RecordStore, Shelter, ShelterEngine, ShelterId};

/// Resolve a shelter id against the engine catalog.
///
/// Fails for ids the record store never returned; membership in the
/// current graph is left to the query.
pub fn resolve_node<S: RecordStore>(
    engine: &ShelterEngine<S>,
    id: ShelterId,
) -> anyhow::Result<&Shelter> {
    match engine.shelter(id) {
        Some(shelter) => Ok(shelter),
        None => bail!("shelter {id} not found in catalog"),
    }
}
