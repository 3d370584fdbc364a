use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use robofit_evaluator::{params::FitnessParams, run_evaluator::RunTrace};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a recorded run from a JSON file
///
/// # Arguments
///
/// * `path` - Path to the trace JSON file
///
/// # Returns
///
/// Deserialized run trace, with every robot's recorded steps
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_trace_file<P>(path: P) -> anyhow::Result<RunTrace>
where
    P: AsRef<Path>,
{
    read_json_file("trace", path)
}

/// Read fitness parameters, falling back to the tuned defaults when no file is given
///
/// # Arguments
///
/// * `path` - Optional path to a parameter JSON file; fields left out keep their defaults
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed, or if a cap or the lap target is not
/// positive
pub fn read_params_file(path: Option<&Path>) -> anyhow::Result<FitnessParams> {
    let Some(path) = path else {
        return Ok(FitnessParams::default());
    };
    let params: FitnessParams = read_json_file("fitness parameters", path)?;
    params
        .validate()
        .with_context(|| format!("Invalid fitness parameters in {}", path.display()))?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::NamedTempFile;

    use super::*;

    fn params_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_params_file_uses_defaults() {
        assert_eq!(read_params_file(None).unwrap(), FitnessParams::default());
    }

    #[test]
    fn test_partial_params_file_is_loaded() {
        let file = params_file(r#"{"lap_target": 2.0}"#);
        let params = read_params_file(Some(file.path())).unwrap();
        assert_eq!(params.lap_target, 2.0);
        assert_eq!(params.collision_cap, 10.0);
    }

    #[test]
    fn test_zero_cap_in_params_file_is_rejected() {
        let file = params_file(r#"{"misorientation_cap": 0.0}"#);
        let err = read_params_file(Some(file.path())).unwrap_err();
        assert!(
            err.chain()
                .any(|cause| cause.to_string().contains("misorientation_cap"))
        );
    }
}
