#![allow(dead_code)]
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use deploypilot::DeployError;
use deploypilot::prompt::Confirmation;
use deploypilot::session::{CommandOutput, RemoteEntry, RemoteFs, Transport};

fn parent_of(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(i) => trimmed[..i].to_string(),
        None => String::new(),
    }
}

fn leaf_of(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => trimmed[i + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// In-memory remote filesystem. Enforces the same preconditions a real SFTP
/// server would: mkdir/put need an existing parent, rmdir needs an empty
/// directory, mkdir fails on an existing path.
pub struct MockRemoteFs {
    pub dirs: Mutex<BTreeSet<String>>,
    pub files: Mutex<BTreeMap<String, u64>>,
    pub fail_paths: Mutex<BTreeSet<String>>,
    pub mkdir_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
    pub alive_flag: AtomicBool,
}

impl Default for MockRemoteFs {
    fn default() -> Self {
        Self {
            dirs: Mutex::new(BTreeSet::new()),
            files: Mutex::new(BTreeMap::new()),
            fail_paths: Mutex::new(BTreeSet::new()),
            mkdir_calls: AtomicUsize::new(0),
            mutation_calls: AtomicUsize::new(0),
            alive_flag: AtomicBool::new(true),
        }
    }
}

impl MockRemoteFs {
    pub fn seed_dir(&self, path: &str) {
        self.dirs.lock().unwrap().insert(path.to_string());
    }

    pub fn seed_file(&self, path: &str, size: u64) {
        self.files.lock().unwrap().insert(path.to_string(), size);
    }

    pub fn fail_on(&self, path: &str) {
        self.fail_paths.lock().unwrap().insert(path.to_string());
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive_flag.store(alive, Ordering::SeqCst);
    }

    fn should_fail(&self, path: &str) -> bool {
        self.fail_paths.lock().unwrap().contains(path)
    }

    fn parent_present(&self, path: &str) -> bool {
        let parent = parent_of(path);
        parent.is_empty() || parent == "/" || self.dirs.lock().unwrap().contains(&parent)
    }

    fn has_children(&self, path: &str) -> bool {
        let dirs = self.dirs.lock().unwrap();
        let files = self.files.lock().unwrap();
        dirs.iter().any(|d| parent_of(d) == path) || files.keys().any(|f| parent_of(f) == path)
    }
}

impl RemoteFs for MockRemoteFs {
    fn stat_is_dir(&self, path: &str) -> Result<bool, String> {
        if self.dirs.lock().unwrap().contains(path) {
            Ok(true)
        } else if self.files.lock().unwrap().contains_key(path) {
            Ok(false)
        } else {
            Err(format!("no such file: {}", path))
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.dirs.lock().unwrap().contains(path) || self.files.lock().unwrap().contains_key(path)
    }

    fn mkdir(&self, path: &str) -> Result<(), String> {
        self.mkdir_calls.fetch_add(1, Ordering::SeqCst);
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(path) {
            return Err(format!("injected mkdir failure: {}", path));
        }
        if self.exists(path) {
            return Err(format!("file exists: {}", path));
        }
        if !self.parent_present(path) {
            return Err(format!("no parent directory: {}", path));
        }
        self.dirs.lock().unwrap().insert(path.to_string());
        Ok(())
    }

    fn readdir(&self, path: &str) -> Result<Vec<RemoteEntry>, String> {
        if !self.dirs.lock().unwrap().contains(path) {
            return Err(format!("not a directory: {}", path));
        }
        let mut entries = Vec::new();
        for d in self.dirs.lock().unwrap().iter() {
            if parent_of(d) == path {
                entries.push(RemoteEntry { name: leaf_of(d), is_dir: true, size: 0 });
            }
        }
        for (f, size) in self.files.lock().unwrap().iter() {
            if parent_of(f) == path {
                entries.push(RemoteEntry { name: leaf_of(f), is_dir: false, size: *size });
            }
        }
        Ok(entries)
    }

    fn unlink(&self, path: &str) -> Result<(), String> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(path) {
            return Err(format!("injected unlink failure: {}", path));
        }
        match self.files.lock().unwrap().remove(path) {
            Some(_) => Ok(()),
            None => Err(format!("no such file: {}", path)),
        }
    }

    fn rmdir(&self, path: &str) -> Result<(), String> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(path) {
            return Err(format!("injected rmdir failure: {}", path));
        }
        if self.has_children(path) {
            return Err(format!("directory not empty: {}", path));
        }
        if self.dirs.lock().unwrap().remove(path) {
            Ok(())
        } else {
            Err(format!("no such directory: {}", path))
        }
    }

    fn put_file(&self, local: &Path, remote: &str) -> Result<(), String> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(remote) {
            return Err(format!("injected put failure: {}", remote));
        }
        if !self.parent_present(remote) {
            return Err(format!("no parent directory: {}", remote));
        }
        let size = std::fs::metadata(local)
            .map_err(|e| format!("local read failed: {} — {}", local.display(), e))?
            .len();
        self.files.lock().unwrap().insert(remote.to_string(), size);
        Ok(())
    }

    fn alive(&self) -> bool {
        self.alive_flag.load(Ordering::SeqCst)
    }
}

/// Prompt whose answers are fixed up front; records which prompts were asked.
pub struct ScriptedPrompt {
    pub connect: bool,
    pub backup: bool,
    pub mkdir: bool,
    pub delete: bool,
    pub asked: Mutex<Vec<&'static str>>,
}

impl ScriptedPrompt {
    pub fn new(connect: bool, backup: bool, mkdir: bool, delete: bool) -> Self {
        Self { connect, backup, mkdir, delete, asked: Mutex::new(Vec::new()) }
    }

    pub fn asked(&self) -> Vec<&'static str> {
        self.asked.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.asked.lock().unwrap().push(name);
    }
}

impl Confirmation for ScriptedPrompt {
    fn confirm_connect(&self) -> bool {
        self.record("connect");
        self.connect
    }

    fn confirm_backup(&self) -> bool {
        self.record("backup");
        self.backup
    }

    fn confirm_mkdir(&self) -> bool {
        self.record("mkdir");
        self.mkdir
    }

    fn confirm_delete(&self) -> bool {
        self.record("delete");
        self.delete
    }

    fn select_target(&self, _names: &[String]) -> Option<usize> {
        Some(0)
    }
}

/// Transport over the in-memory filesystem; records executed remote commands.
pub struct MockTransport {
    pub fs: MockRemoteFs,
    pub executed: Mutex<Vec<String>>,
    pub exec_exit_code: i32,
    pub closed: AtomicBool,
}

impl MockTransport {
    pub fn new(fs: MockRemoteFs) -> Self {
        Self {
            fs,
            executed: Mutex::new(Vec::new()),
            exec_exit_code: 0,
            closed: AtomicBool::new(false),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transport for &MockTransport {
    fn fs(&self) -> &dyn RemoteFs {
        &self.fs
    }

    fn execute(&self, command: &str) -> Result<CommandOutput, DeployError> {
        self.executed.lock().unwrap().push(command.to_string());
        Ok(CommandOutput { exit_code: self.exec_exit_code, output: String::new() })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
