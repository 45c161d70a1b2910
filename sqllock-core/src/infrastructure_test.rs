#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::infrastructure::table_name_for_prefix;
    use crate::infrastructure_sqlite::{is_duplicate_key, LockTable};
    use crate::types::{ClaimToken, LockRecord};

    fn table_in_memory() -> (Connection, LockTable) {
        let conn = Connection::open_in_memory().unwrap();
        let table = LockTable::new("test_locks".to_string());
        table.create(&conn).unwrap();
        (conn, table)
    }

    /// Moves a row's contact time into the past without waiting.
    fn age_row(conn: &Connection, id: &str, millis: i64) {
        conn.execute(
            "UPDATE test_locks SET last_contact = last_contact - ?2 WHERE id = ?1",
            rusqlite::params![id, millis],
        )
        .unwrap();
    }

    #[test]
    fn test_table_name_for_prefix() {
        assert_eq!(table_name_for_prefix("sqllock").unwrap(), "sqllock_locks");
        assert_eq!(table_name_for_prefix("a_b_").unwrap(), "a_b_locks");
        assert!(table_name_for_prefix("a;b").is_err());
        assert!(table_name_for_prefix("___").is_err());
    }

    #[test]
    fn test_create_and_exists() {
        let conn = Connection::open_in_memory().unwrap();
        let table = LockTable::new("test_locks".to_string());

        assert!(!table.exists(&conn).unwrap());
        table.create(&conn).unwrap();
        table.create(&conn).unwrap();
        assert!(table.exists(&conn).unwrap());
        table.drop_table(&conn).unwrap();
        assert!(!table.exists(&conn).unwrap());
    }

    #[test]
    fn test_duplicate_insert_is_detected() {
        let (conn, table) = table_in_memory();

        assert_eq!(table.insert(&conn, "job", &ClaimToken::generate(), "", 60).unwrap(), 1);
        let err = table
            .insert(&conn, "job", &ClaimToken::generate(), "", 60)
            .unwrap_err();
        assert!(is_duplicate_key(&err));
    }

    #[test]
    fn test_other_failures_are_not_duplicates() {
        let conn = Connection::open_in_memory().unwrap();
        let table = LockTable::new("test_locks".to_string());

        let err = table
            .insert(&conn, "job", &ClaimToken::generate(), "", 60)
            .unwrap_err();
        assert!(!is_duplicate_key(&err));
    }

    #[test]
    fn test_staleness_uses_seconds() {
        let (conn, table) = table_in_memory();
        let token = ClaimToken::generate();
        table.insert(&conn, "job", &token, "", 5).unwrap();

        // 4.5s old with a 5s expiry: still live
        age_row(&conn, "job", 4_500);
        assert!(table.is_live(&conn, "job", &token).unwrap());
        assert_eq!(table.sweep(&conn).unwrap(), 0);

        // 5.5s old: stale
        age_row(&conn, "job", 1_000);
        assert!(!table.is_live(&conn, "job", &token).unwrap());
        assert!(table.live_records(&conn).unwrap().is_empty());
        assert_eq!(table.sweep(&conn).unwrap(), 1);
    }

    #[test]
    fn test_touch_and_delete_match_token() {
        let (conn, table) = table_in_memory();
        let token = ClaimToken::generate();
        let other = ClaimToken::generate();
        table.insert(&conn, "job", &token, "", 5).unwrap();
        age_row(&conn, "job", 4_000);

        assert_eq!(table.touch(&conn, "job", &other).unwrap(), 0);
        assert_eq!(table.touch(&conn, "job", &token).unwrap(), 1);

        // renewal reset the age, so the row survives another 4s
        age_row(&conn, "job", 4_000);
        assert!(table.is_live(&conn, "job", &token).unwrap());
        assert!(!table.is_live(&conn, "job", &other).unwrap());

        assert_eq!(table.delete(&conn, "job", &other).unwrap(), 0);
        assert_eq!(table.delete(&conn, "job", &token).unwrap(), 1);
        assert!(!table.is_live(&conn, "missing", &token).unwrap());
    }

    #[test]
    fn test_live_records_round_trip_token() {
        let (conn, table) = table_in_memory();
        let token = ClaimToken::generate();
        table.insert(&conn, "b", &token, "owner-b", 30).unwrap();
        table.insert(&conn, "a", &ClaimToken::generate(), "owner-a", 30).unwrap();

        let records = table.live_records(&conn).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[1].claim_token, token);
        assert_eq!(records[1].owner, "owner-b");
    }

    #[test]
    fn test_claim_tokens_are_distinct() {
        let a = ClaimToken::generate();
        let b = ClaimToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), 64);
        assert_eq!(ClaimToken::from_slice(a.as_bytes()), Some(a));
        assert_eq!(ClaimToken::from_slice(&[0u8; 16]), None);
    }

    #[test]
    fn test_claim_token_serializes_as_hex() {
        let token = ClaimToken::generate();
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, format!("\"{}\"", token.to_hex()));

        let back: ClaimToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
        assert!(serde_json::from_str::<ClaimToken>("\"abcd\"").is_err());
    }

    #[test]
    fn test_record_expiry_time_saturates() {
        let record = LockRecord {
            id: "job".to_string(),
            claim_token: ClaimToken::generate(),
            owner: String::new(),
            last_contact_ms: 1_700_000_000_000,
            expiry_secs: i64::MAX,
        };
        assert_eq!(record.expires_at_ms(), i64::MAX);

        let record = LockRecord { expiry_secs: 30, ..record };
        assert_eq!(record.expires_at_ms(), 1_700_000_030_000);
    }
}
