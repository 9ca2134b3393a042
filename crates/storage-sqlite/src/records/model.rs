use diesel::prelude::*;

/// One durable JSON record, keyed by store instance.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::app_records)]
pub struct AppRecordDB {
    pub record_key: String,
    pub record_value: String,
    pub updated_at: String,
}
