use super::schema::*;
use crate::foundation::TrackerError;
use rocksdb::{ColumnFamilyDescriptor, Options as RocksOptions, DB};
use std::path::Path;

pub fn open_db_with_cfs(path: impl AsRef<Path>) -> Result<DB, TrackerError> {
    let mut options = RocksOptions::default();
    options.create_if_missing(true);
    options.create_missing_column_families(true);
    options.set_use_fsync(true);
    options.set_paranoid_checks(true);

    let mut point_lookup = RocksOptions::default();
    point_lookup.optimize_for_point_lookup(64);

    let cfs = vec![
        ColumnFamilyDescriptor::new(CF_DEFAULT, RocksOptions::default()),
        ColumnFamilyDescriptor::new(CF_METADATA, RocksOptions::default()),
        ColumnFamilyDescriptor::new(CF_CONFIG, point_lookup.clone()),
        ColumnFamilyDescriptor::new(CF_COUNTERFACTUAL, point_lookup.clone()),
        ColumnFamilyDescriptor::new(CF_SIGNER, RocksOptions::default()),
        ColumnFamilyDescriptor::new(CF_EDGE, RocksOptions::default()),
        ColumnFamilyDescriptor::new(CF_EDGE_ID, point_lookup),
    ];

    DB::open_cf_descriptors(&options, path, cfs).map_err(|err| TrackerError::RocksDBOpenError {
        details: format!("open_cf_descriptors: {err}"),
        source: Some(Box::new(err)),
    })
}
