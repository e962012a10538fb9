//! In-memory ZFS used by the integration tests.
//!
//! `MockBackend` and `MockRunner` share one `MockState`, so a `zfs create`
//! issued through the runner shows up as a dataset in the backend.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use zfs_ldd::{
    CommandOutput, CommandRunner, DatasetHandle, DatasetKind, Result, Settings, ZfsBackend,
    ZfsError, ZfsManager,
};

#[derive(Debug, Clone)]
pub struct MockDatasetState {
    pub kind: DatasetKind,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub datasets: BTreeMap<String, MockDatasetState>,
    pub pools: BTreeSet<String>,
    /// Every property write, in order
    pub set_calls: Vec<(String, String, String)>,
    /// Every command line run, program basename first
    pub commands: Vec<Vec<String>>,
    pub destroyed: Vec<String>,
    /// Writes of this property fail
    pub fail_property: Option<String>,
    pub fail_destroy: bool,
    pub modprobe_status: i32,
}

pub type SharedState = Arc<Mutex<MockState>>;

pub fn new_state() -> SharedState {
    Arc::new(Mutex::new(MockState::default()))
}

pub fn add_pool(state: &SharedState, pool: &str) {
    state.lock().unwrap().pools.insert(pool.to_string());
}

pub fn add_dataset(state: &SharedState, name: &str, kind: DatasetKind, props: &[(&str, &str)]) {
    let properties = props
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    state
        .lock()
        .unwrap()
        .datasets
        .insert(name.to_string(), MockDatasetState { kind, properties });
}

pub fn properties(state: &SharedState, name: &str) -> BTreeMap<String, String> {
    state
        .lock()
        .unwrap()
        .datasets
        .get(name)
        .map(|ds| ds.properties.clone())
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct MockBackend {
    pub state: SharedState,
}

pub struct MockDataset {
    name: String,
    kind: DatasetKind,
}

impl DatasetHandle for MockDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> DatasetKind {
        self.kind
    }
}

impl ZfsBackend for MockBackend {
    type Dataset = MockDataset;

    fn open_dataset(&self, name: &str, kind: DatasetKind) -> Result<Option<MockDataset>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .datasets
            .get(name)
            .filter(|ds| ds.kind == kind)
            .map(|_| MockDataset {
                name: name.to_string(),
                kind,
            }))
    }

    fn user_properties(&self, dataset: &MockDataset) -> Result<BTreeMap<String, String>> {
        let state = self.state.lock().unwrap();
        state
            .datasets
            .get(&dataset.name)
            .map(|ds| ds.properties.clone())
            .ok_or_else(|| ZfsError::NotFound {
                kind: "dataset",
                name: dataset.name.clone(),
            })
    }

    fn set_user_property(&self, dataset: &MockDataset, property: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_property.as_deref() == Some(property) {
            return Err(ZfsError::Library {
                operation: "set property",
                target: format!("{} {}={}", dataset.name, property, value),
                reason: "permission denied".to_string(),
            });
        }

        state
            .set_calls
            .push((dataset.name.clone(), property.to_string(), value.to_string()));
        let ds = state
            .datasets
            .get_mut(&dataset.name)
            .ok_or_else(|| ZfsError::NotFound {
                kind: "dataset",
                name: dataset.name.clone(),
            })?;
        ds.properties.insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn destroy_dataset(&self, dataset: MockDataset) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_destroy {
            return Err(ZfsError::Library {
                operation: "destroy dataset",
                target: dataset.name.clone(),
                reason: "dataset is busy".to_string(),
            });
        }
        state.datasets.remove(&dataset.name);
        state.destroyed.push(dataset.name);
        Ok(())
    }

    fn pool_exists(&self, pool: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().pools.contains(pool))
    }
}

/// Emulates `zpool create`, `zfs create` and `modprobe` against the state
pub struct MockRunner {
    pub state: SharedState,
}

fn output(status: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        status,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let tool = Path::new(program)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut state = self.state.lock().unwrap();
        let mut line = vec![tool.clone()];
        line.extend(args.iter().cloned());
        state.commands.push(line);

        match (tool.as_str(), args.first().map(String::as_str)) {
            ("zpool", Some("create")) => {
                let pool = args[4].clone();
                if state.pools.contains(&pool) {
                    return Ok(output(1, &format!("cannot create '{}': pool already exists", pool)));
                }
                state.pools.insert(pool);
                Ok(output(0, ""))
            }
            ("zfs", Some("create")) => {
                let ds = args.last().cloned().unwrap_or_default();
                let pool = ds.split('/').next().unwrap_or_default().to_string();
                if !state.pools.contains(&pool) {
                    return Ok(output(1, &format!("cannot create '{}': no such pool '{}'", ds, pool)));
                }
                if state.datasets.contains_key(&ds) {
                    return Ok(output(1, &format!("cannot create '{}': dataset already exists", ds)));
                }
                state.datasets.insert(
                    ds,
                    MockDatasetState {
                        kind: DatasetKind::Filesystem,
                        properties: BTreeMap::new(),
                    },
                );
                Ok(output(0, ""))
            }
            ("modprobe", _) => Ok(output(state.modprobe_status, "")),
            _ => Ok(output(127, "command not found")),
        }
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn manager_with(state: &SharedState, settings: Settings) -> ZfsManager<MockBackend> {
    init_logging();
    let backend = MockBackend {
        state: state.clone(),
    };
    let runner = MockRunner {
        state: state.clone(),
    };
    ZfsManager::init_with(settings, Box::new(runner), move || Ok(backend.clone()))
        .expect("mock backend should initialize")
}

pub fn manager(state: &SharedState) -> ZfsManager<MockBackend> {
    manager_with(state, Settings::default())
}
