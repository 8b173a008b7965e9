use crate::types::{Attributes, Category, Condition, InfrastructureRecord, RecordId};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::{MultiPoint, Point, Rect};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

// Position in `records`, keyed by [lon, lat]
type IndexedPoint = GeomWithData<[f64; 2], usize>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("duplicate record id {0}")]
    DuplicateId(RecordId),
}

/// Map viewport the dataset should be fitted to, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
        }
    }
}

/// Immutable, preloaded record collection.
pub struct Dataset {
    records: Vec<InfrastructureRecord>,
    by_id: HashMap<RecordId, usize>,
    tree: RTree<IndexedPoint>,
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset").field("records", &self.records.len()).finish()
    }
}

impl Dataset {
    pub fn new(records: Vec<InfrastructureRecord>) -> Result<Self, DatasetError> {
        let by_id = id_index(&records)?;
        let tree = spatial_index(&records);
        Ok(Self { records, by_id, tree })
    }

    /// The dashboard's built-in records for Cross River State.
    pub fn builtin() -> Result<Self, DatasetError> {
        Self::new(builtin_records())
    }

    pub fn records(&self) -> &[InfrastructureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&InfrastructureRecord> {
        self.by_id.get(&id).and_then(|&i| self.records.get(i))
    }

    /// Bounding box of all record locations; `None` for an empty dataset.
    pub fn bounds(&self) -> Option<Bounds> {
        let points: MultiPoint<f64> = self.records.iter().map(|r| r.location).collect();
        points.bounding_rect().map(Bounds::from)
    }

    /// Nearest record to `point` within `max_distance` degrees that satisfies `accept`.
    pub fn nearest_where<F>(
        &self,
        point: Point<f64>,
        max_distance: f64,
        accept: F,
    ) -> Option<&InfrastructureRecord>
    where
        F: Fn(&InfrastructureRecord) -> bool,
    {
        let max_d2 = max_distance * max_distance;
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[point.x(), point.y()])
            .take_while(|(_, d2)| *d2 <= max_d2)
            .filter_map(|(candidate, _)| self.records.get(candidate.data))
            .find(|record| accept(record))
    }
}

fn id_index(records: &[InfrastructureRecord]) -> Result<HashMap<RecordId, usize>, DatasetError> {
    let mut by_id = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if by_id.insert(record.id, i).is_some() {
            return Err(DatasetError::DuplicateId(record.id));
        }
    }
    Ok(by_id)
}

fn spatial_index(records: &[InfrastructureRecord]) -> RTree<IndexedPoint> {
    RTree::bulk_load(
        records
            .iter()
            .enumerate()
            .map(|(i, r)| GeomWithData::new([r.longitude(), r.latitude()], i))
            .collect(),
    )
}

fn builtin_records() -> Vec<InfrastructureRecord> {
    use Category::{Hospital, School};
    use Condition::{Fair, Good, Poor};

    let attrs = |capacity: Option<u32>, year_built: Option<i32>, condition: Condition| Attributes {
        capacity,
        year_built,
        condition,
    };

    vec![
        InfrastructureRecord::new(1, "General Hospital Ikom", Hospital, 5.9617, 8.7206, attrs(Some(180), Some(1976), Fair)),
        InfrastructureRecord::new(2, "General Hospital Ogoja", Hospital, 6.6584, 8.7992, attrs(Some(150), Some(1969), Poor)),
        InfrastructureRecord::new(3, "General Hospital Obudu", Hospital, 6.6667, 9.1667, attrs(Some(120), Some(1981), Good)),
        InfrastructureRecord::new(4, "Ugep Comprehensive Health Centre", Hospital, 5.8086, 8.0811, attrs(Some(60), None, Fair)),
        InfrastructureRecord::new(5, "General Hospital Obubra", Hospital, 6.0833, 8.3333, attrs(None, Some(1988), Good)),
        InfrastructureRecord::new(6, "Cottage Hospital Akamkpa", Hospital, 5.4167, 8.3500, attrs(Some(40), Some(2004), Good)),
        InfrastructureRecord::new(7, "Government Secondary School Ikom", School, 5.9700, 8.7100, attrs(Some(900), Some(1979), Fair)),
        InfrastructureRecord::new(8, "Holy Child Secondary School Ogoja", School, 6.6450, 8.8120, attrs(Some(750), None, Good)),
        InfrastructureRecord::new(9, "Community Secondary School Boje", School, 6.2830, 8.9420, attrs(None, None, Poor)),
        InfrastructureRecord::new(10, "Government Technical College Ugep", School, 5.8000, 8.0900, attrs(Some(600), Some(1985), Poor)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_six_hospitals_and_four_schools() {
        let dataset = Dataset::builtin().unwrap();
        let hospitals = dataset.records().iter().filter(|r| r.category == Category::Hospital).count();
        assert_eq!(dataset.len(), 10);
        assert_eq!(hospitals, 6);
        assert_eq!(dataset.get(RecordId(3)).map(|r| r.category), Some(Category::Hospital));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut records = builtin_records();
        records.push(records[0].clone());
        assert_eq!(Dataset::new(records).unwrap_err(), DatasetError::DuplicateId(RecordId(1)));
    }

    #[test]
    fn builtin_ids_are_unique_and_indexed() {
        let records = builtin_records();
        let by_id = id_index(&records).unwrap();
        assert_eq!(by_id.len(), records.len());

        let dataset = Dataset::builtin().unwrap();
        for (i, record) in records.iter().enumerate() {
            assert_eq!(dataset.get(record.id), dataset.records().get(i));
        }
    }

    #[test]
    fn bounds_cover_every_record() {
        let dataset = Dataset::builtin().unwrap();
        let bounds = dataset.bounds().unwrap();
        for r in dataset.records() {
            assert!(r.latitude() >= bounds.south && r.latitude() <= bounds.north);
            assert!(r.longitude() >= bounds.west && r.longitude() <= bounds.east);
        }
        assert!(Dataset::new(Vec::new()).unwrap().bounds().is_none());
    }

    #[test]
    fn nearest_respects_predicate_and_distance() {
        let dataset = Dataset::builtin().unwrap();
        // Ikom: hospital 1 and school 7 sit close together
        let near_ikom = Point::new(8.7190, 5.9620);
        assert_eq!(dataset.nearest_where(near_ikom, 0.05, |_| true).map(|r| r.id), Some(RecordId(1)));
        assert_eq!(
            dataset
                .nearest_where(near_ikom, 0.05, |r| r.category == Category::School)
                .map(|r| r.id),
            Some(RecordId(7))
        );
        assert!(dataset.nearest_where(Point::new(0.0, 0.0), 0.05, |_| true).is_none());
    }
}
