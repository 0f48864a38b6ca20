use std::collections::HashSet;

use crate::barcode;
use crate::config::ClientConfig;
use crate::domain::{Granularity, IdType};
use crate::endpoint::{self, CASE_SUBMITTER_FIELD};
use crate::error::IdMapError;
use crate::gdc::{Entity, Filter, GdcClient, GdcHttpClient, GdcQuery};
use crate::relation::{IdPair, IdRelation};
use crate::response::id_value_pairs;

const BARCODE_COLUMN: &str = "barcode";
const FILE_ID: &str = "file_id";
const CASE_ID: &str = "case_id";
const CASE_ID_PATH: &str = "cases.case_id";

/// Translates identifiers through one [`GdcClient`].
///
/// Every operation issues at most one query. Empty input returns an empty
/// relation without touching the client, and malformed barcodes are
/// rejected before any query is built.
#[derive(Clone)]
pub struct Translator<C: GdcClient> {
    client: C,
}

impl Translator<GdcHttpClient> {
    pub fn connect(config: ClientConfig) -> Result<Self, IdMapError> {
        Ok(Self::new(GdcHttpClient::new(config)?))
    }
}

impl<C: GdcClient> Translator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Pairs each case or file UUID with the barcodes the GDC holds for it.
    ///
    /// Case UUIDs always resolve to participant barcodes through the case
    /// record's own `submitter_id`; `end_point` only applies to file UUIDs.
    pub fn uuid_to_barcode(
        &self,
        ids: &[String],
        id_type: IdType,
        end_point: Granularity,
        legacy: bool,
    ) -> Result<IdRelation, IdMapError> {
        let id_field = id_type.id_field();
        let (entity, path) = match id_type {
            IdType::Case => {
                if end_point != Granularity::Participant {
                    tracing::debug!(%end_point, "end point ignored for case ids");
                }
                (Entity::Cases, CASE_SUBMITTER_FIELD)
            }
            IdType::File => (Entity::Files, endpoint::resolve(end_point)),
        };

        let relation = IdRelation::new(id_field, path);
        if ids.is_empty() {
            return Ok(relation);
        }

        let query = GdcQuery {
            entity,
            filter: Filter::any_of(id_field, ids),
            fields: vec![id_field.to_string(), path.to_string()],
            legacy,
        };
        let hits = self.client.query(&query)?;
        let rows = id_value_pairs(&hits, id_field, path)?
            .into_iter()
            .map(|(id, barcode)| IdPair::new(id, barcode))
            .collect::<Vec<_>>();
        tracing::debug!(
            %entity,
            path,
            requested = ids.len(),
            hits = hits.len(),
            rows = rows.len(),
            "uuid to barcode"
        );
        Ok(relation.with_rows(rows))
    }

    /// Pairs each barcode with the UUIDs of files derived from it.
    ///
    /// The GDC match is not exact at every level, so only rows whose barcode
    /// literally appears in `barcodes` are kept.
    pub fn barcode_to_uuid(
        &self,
        barcodes: &[String],
        legacy: bool,
    ) -> Result<IdRelation, IdMapError> {
        let relation = IdRelation::new(BARCODE_COLUMN, FILE_ID);
        if barcodes.is_empty() {
            return Ok(relation);
        }

        barcode::validate(barcodes)?;
        let level = barcode::classify_granularity(barcodes)?;
        let path = endpoint::resolve(level);

        let query = GdcQuery {
            entity: Entity::Files,
            filter: Filter::any_of(path, barcodes),
            fields: vec![FILE_ID.to_string(), path.to_string()],
            legacy,
        };
        let hits = self.client.query(&query)?;

        let wanted = barcodes.iter().map(String::as_str).collect::<HashSet<_>>();
        let pairs = id_value_pairs(&hits, FILE_ID, path)?;
        let matched = pairs.len();
        let rows = pairs
            .into_iter()
            .filter(|(_, barcode)| wanted.contains(barcode.as_str()))
            .map(|(file_id, barcode)| IdPair::new(barcode, file_id))
            .collect::<Vec<_>>();
        tracing::debug!(
            %level,
            path,
            hits = hits.len(),
            matched,
            kept = rows.len(),
            "barcode to uuid"
        );
        Ok(relation.with_rows(rows))
    }

    /// Pairs each case UUID with the UUIDs of the files attached to that case.
    pub fn case_to_file_uuids(
        &self,
        case_ids: &[String],
        legacy: bool,
    ) -> Result<IdRelation, IdMapError> {
        let relation = IdRelation::new(CASE_ID, FILE_ID);
        if case_ids.is_empty() {
            return Ok(relation);
        }

        let query = GdcQuery {
            entity: Entity::Files,
            filter: Filter::any_of(CASE_ID_PATH, case_ids),
            fields: vec![FILE_ID.to_string(), CASE_ID_PATH.to_string()],
            legacy,
        };
        let hits = self.client.query(&query)?;

        // files shared between cases list every case; keep the requested ones
        let wanted = case_ids.iter().map(String::as_str).collect::<HashSet<_>>();
        let rows = id_value_pairs(&hits, FILE_ID, CASE_ID_PATH)?
            .into_iter()
            .filter(|(_, case_id)| wanted.contains(case_id.as_str()))
            .map(|(file_id, case_id)| IdPair::new(case_id, file_id))
            .collect::<Vec<_>>();
        tracing::debug!(hits = hits.len(), rows = rows.len(), "case to file uuids");
        Ok(relation.with_rows(rows))
    }
}
