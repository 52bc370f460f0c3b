//! In-memory store with an optional append-only JSON-lines journal.
//!
//! Each insert appends one line to the journal and nothing else; opening the
//! store replays the journal into memory. A line that was only partly
//! written when the process died is cut off on the next open.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::{ReportStore, StoreError, StoreResult};
use crate::domain::{HealthReport, User, WaterQualityReport};

#[derive(Debug, Default)]
struct Tables {
    health_reports: Vec<HealthReport>,
    water_reports: Vec<WaterQualityReport>,
    users: Vec<User>,
}

impl Tables {
    fn apply(&mut self, entry: Entry) {
        match entry {
            Entry::HealthReport(report) => self.health_reports.push(report),
            Entry::WaterReport(report) => self.water_reports.push(report),
            Entry::User(user) => self.users.push(user),
        }
    }
}

/// One journal line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
enum Entry {
    HealthReport(HealthReport),
    WaterReport(WaterQualityReport),
    User(User),
}

struct Journal {
    file: File,
    /// Bytes known to hold complete lines
    committed: u64,
    /// Set when a failed write could not be cut back off the file
    broken: bool,
}

impl Journal {
    fn append(&mut self, entry: &Entry) -> StoreResult<()> {
        if self.broken {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "journal is unusable after a failed write",
            )));
        }

        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let written = self
            .file
            .write_all(&line)
            .and_then(|()| self.file.sync_data());
        if let Err(error) = written {
            if let Err(truncate_error) = self.file.set_len(self.committed) {
                tracing::error!(%truncate_error, "could not cut failed write off the journal");
                self.broken = true;
            }
            return Err(error.into());
        }

        self.committed += line.len() as u64;
        Ok(())
    }
}

/// Lock-protected tables, optionally mirrored to a journal file.
///
/// Writers are serialized on the journal; readers only ever wait for the
/// in-memory push that follows a successful append.
pub struct InMemoryStore {
    data: RwLock<Tables>,
    journal: Mutex<Option<Journal>>,
    journal_path: Option<PathBuf>,
}

impl InMemoryStore {
    /// Volatile store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Tables::default()),
            journal: Mutex::new(None),
            journal_path: None,
        }
    }

    /// Store backed by the journal at `path`, created if missing.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;
        let (tables, committed) = replay(&raw)?;

        if committed < raw.len() as u64 {
            tracing::warn!(
                path = %path.display(),
                dropped_bytes = raw.len() as u64 - committed,
                "journal ends in a partial line, truncating"
            );
            file.set_len(committed)?;
        }

        tracing::info!(
            path = %path.display(),
            health_reports = tables.health_reports.len(),
            water_reports = tables.water_reports.len(),
            users = tables.users.len(),
            "opened report store"
        );

        Ok(Self {
            data: RwLock::new(tables),
            journal: Mutex::new(Some(Journal {
                file,
                committed,
                broken: false,
            })),
            journal_path: Some(path),
        })
    }

    /// Store that journals to an already-open `file`, starting empty.
    #[cfg(test)]
    fn with_journal_file(file: File) -> Self {
        Self {
            data: RwLock::new(Tables::default()),
            journal: Mutex::new(Some(Journal {
                file,
                committed: 0,
                broken: false,
            })),
            journal_path: None,
        }
    }

    /// Journal file, if persistent.
    pub fn journal_path(&self) -> Option<&Path> {
        self.journal_path.as_deref()
    }

    /// Append `entry` to the journal, then make it visible to readers.
    /// Caller holds the journal lock.
    fn commit(&self, journal: &mut Option<Journal>, entry: Entry) -> StoreResult<()> {
        if let Some(journal) = journal.as_mut() {
            if let Err(error) = journal.append(&entry) {
                tracing::error!(%error, "failed to append to journal, insert discarded");
                return Err(error);
            }
        }
        self.data.write().apply(entry);
        Ok(())
    }
}

/// Rebuild the tables from journal bytes. Returns the tables and the length
/// of the prefix made of complete lines.
fn replay(raw: &[u8]) -> StoreResult<(Tables, u64)> {
    let mut tables = Tables::default();
    let mut committed = 0usize;

    for (index, line) in raw.split_inclusive(|b| *b == b'\n').enumerate() {
        let Some(body) = line.strip_suffix(b"\n") else {
            // unterminated tail
            break;
        };
        if !body.iter().all(u8::is_ascii_whitespace) {
            let entry: Entry = serde_json::from_slice(body).map_err(|error| {
                tracing::error!(line = index + 1, %error, "journal line is corrupt");
                StoreError::Corrupt(error)
            })?;
            tables.apply(entry);
        }
        committed += line.len();
    }

    Ok((tables, committed as u64))
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportStore for InMemoryStore {
    fn insert_health_report(&self, report: HealthReport) -> StoreResult<HealthReport> {
        let mut journal = self.journal.lock();
        self.commit(&mut journal, Entry::HealthReport(report.clone()))?;
        Ok(report)
    }

    fn insert_water_report(&self, report: WaterQualityReport) -> StoreResult<WaterQualityReport> {
        let mut journal = self.journal.lock();
        self.commit(&mut journal, Entry::WaterReport(report.clone()))?;
        Ok(report)
    }

    fn health_reports_since(&self, since: DateTime<Utc>) -> Vec<HealthReport> {
        let mut reports: Vec<_> = self
            .data
            .read()
            .health_reports
            .iter()
            .filter(|r| r.timestamp >= since)
            .cloned()
            .collect();
        reports.sort_by_key(|r| r.timestamp);
        reports
    }

    fn latest_water_report(&self, village: &str) -> Option<WaterQualityReport> {
        // max_by_key keeps the last of equal keys, i.e. the latest insert
        self.data
            .read()
            .water_reports
            .iter()
            .filter(|r| r.village == village)
            .max_by_key(|r| r.timestamp)
            .cloned()
    }

    fn insert_user(&self, user: User) -> StoreResult<User> {
        // uniqueness is checked and committed under one journal lock
        let mut journal = self.journal.lock();
        {
            let data = self.data.read();
            if data.users.iter().any(|u| u.username == user.username) {
                return Err(StoreError::Duplicate {
                    field: "username",
                    value: user.username,
                });
            }
            if data.users.iter().any(|u| u.email == user.email) {
                return Err(StoreError::Duplicate {
                    field: "email",
                    value: user.email,
                });
            }
        }
        self.commit(&mut journal, Entry::User(user.clone()))?;
        Ok(user)
    }

    fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.data
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.data
            .read()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    fn user_count(&self) -> usize {
        self.data.read().users.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{Decimal2, Role, UserId};

    fn water(village: &str, turbidity: i64, at: DateTime<Utc>) -> WaterQualityReport {
        WaterQualityReport {
            id: Uuid::new_v4(),
            village: village.to_string(),
            ph: Decimal2::from_hundredths(710),
            turbidity: Decimal2::from_hundredths(turbidity),
            contaminants: BTreeMap::new(),
            timestamp: at,
        }
    }

    fn health(village: &str, at: DateTime<Utc>) -> HealthReport {
        HealthReport {
            id: Uuid::new_v4(),
            village: village.to_string(),
            age_group: "5-17".to_string(),
            symptoms: vec!["cough".to_string()],
            reported_by: UserId::new(),
            timestamp: at,
        }
    }

    fn user(username: &str, email: &str) -> User {
        User {
            id: UserId::new(),
            username: username.to_string(),
            email: email.to_string(),
            phone_number: None,
            password_hash: String::new(),
            role: Role::Official,
        }
    }

    #[test]
    fn test_latest_water_report_per_village() {
        let store = InMemoryStore::new();
        let t0 = Utc::now();
        store.insert_water_report(water("ziro_arunachal", 100, t0)).unwrap();
        store
            .insert_water_report(water("ziro_arunachal", 620, t0 + Duration::seconds(10)))
            .unwrap();
        store
            .insert_water_report(water("pelling_sikkim", 900, t0 + Duration::seconds(20)))
            .unwrap();

        let latest = store.latest_water_report("ziro_arunachal").unwrap();
        assert_eq!(latest.turbidity.hundredths(), 620);
        assert!(store.latest_water_report("majuli_assam").is_none());
    }

    #[test]
    fn test_latest_water_report_same_timestamp_prefers_last_insert() {
        let store = InMemoryStore::new();
        let t0 = Utc::now();
        store.insert_water_report(water("ziro_arunachal", 100, t0)).unwrap();
        store.insert_water_report(water("ziro_arunachal", 700, t0)).unwrap();

        let latest = store.latest_water_report("ziro_arunachal").unwrap();
        assert_eq!(latest.turbidity.hundredths(), 700);
    }

    #[test]
    fn test_health_reports_since_is_inclusive() {
        let store = InMemoryStore::new();
        let cutoff = Utc::now();
        store
            .insert_health_report(health("ziro_arunachal", cutoff - Duration::seconds(1)))
            .unwrap();
        store.insert_health_report(health("ziro_arunachal", cutoff)).unwrap();

        assert_eq!(store.health_reports_since(cutoff).len(), 1);
    }

    #[test]
    fn test_duplicate_users_rejected() {
        let store = InMemoryStore::new();
        store.insert_user(user("asha", "asha@health.gov.in")).unwrap();

        assert!(matches!(
            store.insert_user(user("asha", "other@health.gov.in")),
            Err(StoreError::Duplicate { field: "username", .. })
        ));
        assert!(matches!(
            store.insert_user(user("asha2", "asha@health.gov.in")),
            Err(StoreError::Duplicate { field: "email", .. })
        ));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_journal_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aquaalert.jsonl");

        {
            let store = InMemoryStore::open(&path).unwrap();
            store
                .insert_water_report(water("pelling_sikkim", 501, Utc::now()))
                .unwrap();
            store.insert_user(user("asha", "asha@health.gov.in")).unwrap();
        }

        let reopened = InMemoryStore::open(&path).unwrap();
        assert_eq!(reopened.journal_path(), Some(path.as_path()));
        assert_eq!(
            reopened
                .latest_water_report("pelling_sikkim")
                .unwrap()
                .turbidity
                .hundredths(),
            501
        );
        assert!(reopened.find_user_by_email("asha@health.gov.in").is_some());

        reopened
            .insert_health_report(health("pelling_sikkim", Utc::now()))
            .unwrap();
        drop(reopened);
        let again = InMemoryStore::open(&path).unwrap();
        assert_eq!(again.user_count(), 1);
        assert_eq!(
            again
                .health_reports_since(Utc::now() - Duration::hours(1))
                .len(),
            1
        );
    }

    #[test]
    fn test_inserts_only_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aquaalert.jsonl");
        let store = InMemoryStore::open(&path).unwrap();

        let mut previous = Vec::new();
        for i in 0..50 {
            store
                .insert_water_report(water("ziro_arunachal", 100 + i, Utc::now()))
                .unwrap();
            let current = fs::read(&path).unwrap();
            assert!(current.starts_with(&previous));
            let added = &current[previous.len()..];
            assert_eq!(added.iter().filter(|b| **b == b'\n').count(), 1);
            previous = current;
        }

        let text = String::from_utf8(previous).unwrap();
        assert_eq!(text.lines().count(), 50);
        assert!(text.lines().all(|l| l.starts_with("{\"kind\":\"water_report\"")));
    }

    #[test]
    fn test_partial_tail_is_dropped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aquaalert.jsonl");
        {
            let store = InMemoryStore::open(&path).unwrap();
            store.insert_user(user("asha", "asha@health.gov.in")).unwrap();
        }
        let intact = fs::read(&path).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"kind\":\"user\",\"rec").unwrap();
        drop(file);

        let store = InMemoryStore::open(&path).unwrap();
        assert_eq!(store.user_count(), 1);
        assert_eq!(fs::read(&path).unwrap(), intact);

        store.insert_user(user("ravi", "ravi@health.gov.in")).unwrap();
        drop(store);
        assert_eq!(InMemoryStore::open(&path).unwrap().user_count(), 2);
    }

    #[test]
    fn test_corrupt_line_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aquaalert.jsonl");
        fs::write(&path, "not json\n").unwrap();

        assert!(matches!(
            InMemoryStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("aquaalert.jsonl");
        assert!(matches!(InMemoryStore::open(&path), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_failed_append_inserts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("read-only.jsonl");
        fs::write(&path, "").unwrap();
        let store = InMemoryStore::with_journal_file(File::open(&path).unwrap());

        let result = store.insert_health_report(health("ziro_arunachal", Utc::now()));
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(store
            .health_reports_since(Utc::now() - Duration::hours(1))
            .is_empty());

        assert!(store.insert_user(user("asha", "asha@health.gov.in")).is_err());
        assert_eq!(store.user_count(), 0);
    }
}
