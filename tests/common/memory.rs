//! In-memory stand-ins for the database and the storage backend

use async_trait::async_trait;
use sea_orm::DbErr;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;
use uploader::entries::{Entry, EntryStore, NewEntry};
use uploader::storage::{StorageBackend, StorageError, StoredObject};

/// Entry store keeping rows in a Vec, ids assigned like AUTO_INCREMENT.
pub struct MemoryEntryStore {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicI32,
    fail: AtomicBool,
    insert_calls: AtomicUsize,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
            fail: AtomicBool::new(false),
            insert_calls: AtomicUsize::new(0),
        }
    }

    /// Make every following operation fail like a lost connection.
    pub fn fail_queries(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DbErr> {
        if self.fail.load(Ordering::SeqCst) {
            Err(DbErr::Conn("connection lost".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn insert_entry(&self, entry: NewEntry) -> Result<i32, DbErr> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().push(Entry {
            id,
            name: entry.name,
            email: entry.email,
            image_name: entry.image_name,
            image_url: entry.image_url,
        });
        Ok(id)
    }

    async fn list_entries(&self) -> Result<Vec<Entry>, DbErr> {
        self.check()?;
        Ok(self.entries())
    }

    async fn delete_entry(&self, id: i32) -> Result<u64, DbErr> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok((before - entries.len()) as u64)
    }
}

/// Storage backend that keeps uploads in memory.
pub struct RecordingStorage {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    fail: AtomicBool,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every following store fail like a full disk.
    pub fn fail_writes(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Stored keys and contents, in upload order.
    pub fn objects(&self) -> Vec<(String, Vec<u8>)> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageBackend for RecordingStorage {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
    ) -> Result<StoredObject, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("No space left on device")));
        }

        let mut objects = self.objects.lock().unwrap();
        let key = format!("{}-{}", objects.len() + 1, original_filename);
        objects.push((key.clone(), data));
        Ok(StoredObject {
            url: format!("/uploads/{}", key),
            key,
        })
    }
}
