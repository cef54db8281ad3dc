//! Per-file conversion pipeline: Resolve → ensure dir → Decode → Index → Encode

use std::path::{Path, PathBuf};
use tracing::debug;

use super::config::BatchRequest;
use crate::error::ConvertError;
use crate::paths;
use crate::textures;

/// Where one discovered file comes from and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source_path: PathBuf,
    /// Path of the source relative to the input root
    pub relative_path: PathBuf,
    pub output_path: PathBuf,
}

impl ConversionTask {
    /// Plan the conversion of `source`
    ///
    /// Fails with `OutsideRoot` if `source` is not under the input root;
    /// such a file is never written anywhere.
    pub fn plan(request: &BatchRequest, source: &Path) -> Result<Self, ConvertError> {
        let relative_path = paths::relative_path(&request.input_dir, source)
            .ok_or_else(|| ConvertError::OutsideRoot(source.to_path_buf()))?;

        let output_path = paths::resolve_output_path(
            &request.input_dir,
            source,
            &request.output_dir,
            &request.target_extension,
        );

        Ok(Self {
            source_path: source.to_path_buf(),
            relative_path,
            output_path,
        })
    }

    /// Run the pipeline for this file
    ///
    /// Once started, a pipeline always runs to its end. Output is written
    /// atomically, so a failed run leaves no partial file.
    pub fn run(&self) -> Result<(), ConvertError> {
        if let Some(dir) = self.output_path.parent() {
            paths::ensure_dir_all(dir).map_err(|e| ConvertError::io(dir, e))?;
        }

        let pixels = textures::decode(&self.source_path)?;

        let indices = textures::build_index(&pixels)?;
        if indices.data.len() != pixels.data.len() {
            return Err(ConvertError::MalformedBuffer {
                width: pixels.width,
                height: pixels.height,
                expected: pixels.data.len(),
                actual: indices.data.len(),
            });
        }
        drop(pixels);

        textures::encode(&indices, &self.output_path)?;
        debug!(
            "Converted {} -> {}",
            self.relative_path.display(),
            self.output_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textures::write_test_dds;

    #[test]
    fn test_plan_mirrors_structure() {
        let req = BatchRequest::new("/in", "/out");
        let task = ConversionTask::plan(&req, Path::new("/in/chara/body_n.dds")).unwrap();
        assert_eq!(task.relative_path, PathBuf::from("chara/body_n.dds"));
        assert_eq!(task.output_path, PathBuf::from("/out/chara/body_n.tga"));
    }

    #[test]
    fn test_plan_rejects_file_outside_root() {
        let req = BatchRequest::new("/in", "/out");
        let err = ConversionTask::plan(&req, Path::new("/other/x.dds")).unwrap_err();
        assert!(matches!(err, ConvertError::OutsideRoot(_)));
    }

    #[test]
    fn test_run_writes_index_texture() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let source = input.path().join("sub/tex_n.dds");
        write_test_dds(&source, 8, 8);

        let req = BatchRequest::new(input.path(), output.path());
        let task = ConversionTask::plan(&req, &source).unwrap();
        task.run().unwrap();

        let img = image::open(output.path().join("sub/tex_n.tga"))
            .unwrap()
            .to_rgba8();
        assert_eq!(img.dimensions(), (8, 8));
        assert!(img.pixels().all(|p| p.0[1] == 255 && p.0[2] == 0 && p.0[3] == 255));
        assert!(img.pixels().all(|p| p.0[0] % 17 == 0));
    }

    #[test]
    fn test_run_failure_writes_nothing() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let source = input.path().join("broken.dds");
        std::fs::write(&source, b"DDS truncated").unwrap();

        let req = BatchRequest::new(input.path(), output.path());
        let task = ConversionTask::plan(&req, &source).unwrap();

        assert!(matches!(task.run(), Err(ConvertError::Decode(_))));
        assert!(!task.output_path.exists());
    }
}
