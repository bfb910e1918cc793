use std::path::{Path, PathBuf};

/// Monitor configuration: which ports to record, against which time
/// reference, and where to write the VCD output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformSpec {
    pub(crate) time_reference: String,
    pub(crate) signals: Vec<(String, String)>,
    pub(crate) file: Option<PathBuf>,
    pub(crate) timescale: String,
    pub(crate) keep_records: bool,
}

impl WaveformSpec {
    /// Start a monitor keyed on the port at `time_reference`
    pub fn new(time_reference: &str) -> Self {
        Self {
            time_reference: time_reference.to_string(),
            signals: Vec::new(),
            file: None,
            timescale: "1ns".to_string(),
            keep_records: true,
        }
    }

    /// Record the port at `path` under `name`
    pub fn signal(mut self, name: &str, path: &str) -> Self {
        self.signals.push((name.to_string(), path.to_string()));
        self
    }

    /// Stream the records to a VCD file
    pub fn to_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// VCD timescale of one time reference unit
    pub fn timescale(mut self, timescale: &str) -> Self {
        self.timescale = timescale.to_string();
        self
    }

    /// Do not keep records in memory; only the VCD file receives them
    pub fn without_records(mut self) -> Self {
        self.keep_records = false;
        self
    }

    pub fn time_reference(&self) -> &str {
        &self.time_reference
    }

    pub fn signals(&self) -> &[(String, String)] {
        &self.signals
    }
}
