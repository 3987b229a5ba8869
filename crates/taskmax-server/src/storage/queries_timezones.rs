//! Timezone catalog queries for the taskmax server.

use super::db::{Database, DatabaseError};
use super::models::Timezone;

/// Offset catalog spans UTC-12 through UTC+14 inclusive (27 entries).
const OFFSET_RANGE: std::ops::RangeInclusive<i64> = -12..=14;

fn offset_name(offset: i64) -> String {
    match offset {
        0 => "UTC".to_string(),
        o if o > 0 => format!("UTC+{o}"),
        o => format!("UTC{o}"),
    }
}

impl Database {
    /// Insert the fixed offset catalog. Existing names are left untouched,
    /// so repeated calls are safe. Returns the number of rows inserted.
    pub async fn populate_timezones(&self) -> Result<u64, DatabaseError> {
        let mut tx = self.pool().begin().await?;
        let mut inserted = 0;

        for offset in OFFSET_RANGE {
            let result = sqlx::query(
                "INSERT INTO timezones (name, utc_offset) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
            )
            .bind(offset_name(offset))
            .bind(offset)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    /// List the full catalog, offset ascending.
    pub async fn get_all_timezones(&self) -> Result<Vec<Timezone>, DatabaseError> {
        let timezones =
            sqlx::query_as::<_, Timezone>("SELECT * FROM timezones ORDER BY utc_offset ASC")
                .fetch_all(self.pool())
                .await?;

        Ok(timezones)
    }

    /// Look up a timezone by UTC offset.
    pub async fn get_timezone_by_offset(
        &self,
        utc_offset: i64,
    ) -> Result<Option<Timezone>, DatabaseError> {
        let timezone = sqlx::query_as::<_, Timezone>("SELECT * FROM timezones WHERE utc_offset = ?")
            .bind(utc_offset)
            .fetch_optional(self.pool())
            .await?;

        Ok(timezone)
    }

    /// Look up a timezone by label.
    pub async fn get_timezone_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Timezone>, DatabaseError> {
        let timezone = sqlx::query_as::<_, Timezone>("SELECT * FROM timezones WHERE name = ?")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;

        Ok(timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn populate_inserts_full_catalog() {
        let db = Database::open_in_memory().await.unwrap();

        let inserted = db.populate_timezones().await.unwrap();
        assert_eq!(inserted, 27);

        let all = db.get_all_timezones().await.unwrap();
        assert_eq!(all.len(), 27);
        assert_eq!(all[0].name, "UTC-12");
        assert_eq!(all[26].name, "UTC+14");
    }

    #[tokio::test]
    async fn populate_twice_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();

        db.populate_timezones().await.unwrap();
        let second = db.populate_timezones().await.unwrap();
        assert_eq!(second, 0);

        assert_eq!(db.get_all_timezones().await.unwrap().len(), 27);
    }

    #[tokio::test]
    async fn lookup_by_offset_and_name() {
        let db = Database::open_in_memory().await.unwrap();
        db.populate_timezones().await.unwrap();

        let utc3 = db.get_timezone_by_offset(3).await.unwrap().unwrap();
        assert_eq!(utc3.name, "UTC+3");

        let zero = db.get_timezone_by_name("UTC").await.unwrap().unwrap();
        assert_eq!(zero.utc_offset, 0);

        let minus5 = db.get_timezone_by_name("UTC-5").await.unwrap().unwrap();
        assert_eq!(minus5.utc_offset, -5);

        assert!(db.get_timezone_by_offset(99).await.unwrap().is_none());
        assert!(db.get_timezone_by_name("Mars").await.unwrap().is_none());
    }

    #[test]
    fn offset_names() {
        assert_eq!(offset_name(-12), "UTC-12");
        assert_eq!(offset_name(0), "UTC");
        assert_eq!(offset_name(14), "UTC+14");
    }
}
