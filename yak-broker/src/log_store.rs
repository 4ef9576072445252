use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use yak_core::{LogError, Message, Offset, TopicName};
use yak_runtime::LocalLog;

/// On-disk, append-only log for every locally known topic.
///
/// One [`parking_lot::Mutex`]-guarded writer handle per topic, held in a
/// [`DashMap`] so independent topics never contend with each other.
/// `read_all` opens a fresh read handle rather than taking the write lock —
/// readers are allowed to run concurrently with an in-progress append and
/// must tolerate a partial last line.
pub struct LogStore {
    data_root: PathBuf,
    broker_id: u64,
    writers: DashMap<TopicName, Mutex<File>>,
}

impl LogStore {
    pub fn new(data_root: PathBuf, broker_id: u64) -> Self {
        Self {
            data_root,
            broker_id,
            writers: DashMap::new(),
        }
    }

    fn topic_dir(&self, topic: &TopicName) -> PathBuf {
        self.data_root
            .join(format!("broker-{}", self.broker_id))
            .join(topic.as_str())
            .join("partition-0")
    }

    fn log_path(&self, topic: &TopicName) -> PathBuf {
        self.topic_dir(topic).join("messages.log")
    }

    /// True if `topic` has a writer handle open (i.e. is locally known).
    pub fn has_topic(&self, topic: &TopicName) -> bool {
        self.writers.contains_key(topic)
    }

    /// Create the on-disk directory and open the writer handle for `topic`.
    ///
    /// Returns `true` if this call created the topic, `false` if it already
    /// existed — re-registering an existing topic is a no-op.
    pub fn ensure_topic(&self, topic: &TopicName) -> Result<bool, LogError> {
        if self.writers.contains_key(topic) {
            return Ok(false);
        }
        let dir = self.topic_dir(topic);
        fs::create_dir_all(&dir).map_err(|e| LogError::new(topic.as_str(), e))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(topic))
            .map_err(|e| LogError::new(topic.as_str(), e))?;
        // Another thread may have raced us between the contains_key check and
        // here; insert is still correct either way since OpenOptions::append
        // is idempotent on an existing file.
        self.writers.insert(topic.clone(), Mutex::new(file));
        Ok(true)
    }

    /// Append one record. Caller (the per-topic async mutex in
    /// `yak-broker::state`) already serializes this against concurrent
    /// appends to the same topic.
    pub fn append(&self, topic: &TopicName, message: &Message) -> Result<(), LogError> {
        let writer = self
            .writers
            .get(topic)
            .ok_or_else(|| LogError::new(topic.as_str(), io::Error::new(io::ErrorKind::NotFound, "topic not registered")))?;
        let mut file = writer.lock();
        let line = serde_json::to_string(message).expect("Message always serializes");
        writeln!(file, "{line}").map_err(|e| LogError::new(topic.as_str(), e))?;
        file.flush().map_err(|e| LogError::new(topic.as_str(), e))
    }

    /// Read every well-formed message in `topic`'s log, in on-disk order.
    ///
    /// Malformed or truncated lines — including a partial last line from a
    /// writer mid-append — are skipped, not fatal.
    pub fn read_all(&self, topic: &TopicName) -> Result<Vec<Message>, LogError> {
        let path = self.log_path(topic);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LogError::new(topic.as_str(), e)),
        };
        let reader = BufReader::new(file);
        Ok(reader
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| Message::parse_line(&line))
            .collect())
    }

    pub fn list_topics(&self) -> Vec<TopicName> {
        self.writers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Seed the registry from whatever topic directories already exist under
    /// this broker's data root. The filesystem remains the durable truth;
    /// the in-memory registry is just a cache of it, seeded once at startup.
    pub fn discover_existing_topics(&self) -> Result<(), LogError> {
        let broker_dir = self.data_root.join(format!("broker-{}", self.broker_id));
        if !broker_dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&broker_dir).map_err(|e| LogError::new("<root>", e))? {
            let entry = entry.map_err(|e| LogError::new("<root>", e))?;
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Ok(topic) = TopicName::parse(name) {
                self.ensure_topic(&topic)?;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }
}

#[async_trait]
impl LocalLog for LogStore {
    async fn ensure_topic(&self, topic: &TopicName) -> Result<(), LogError> {
        LogStore::ensure_topic(self, topic)?;
        Ok(())
    }

    async fn has_offset(&self, topic: &TopicName, offset: Offset) -> Result<bool, LogError> {
        Ok(self.read_all(topic)?.iter().any(|m| m.offset == offset))
    }

    async fn append(&self, topic: &TopicName, message: &Message) -> Result<(), LogError> {
        LogStore::append(self, topic, message)
    }

    async fn known_topics(&self) -> Vec<TopicName> {
        self.list_topics()
    }
}
