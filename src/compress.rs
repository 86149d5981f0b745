use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::DeployError;

/// Zip the contents of `local_path` (without the container directory itself)
/// into a sibling directory named `<basename>_`, using the remote archive
/// name with its extension swapped to `.zip`. Returns the output path.
pub fn compress_local_tree(local_path: &Path, archive_name: &str) -> Result<PathBuf, DeployError> {
    let display = local_path.display().to_string();
    let err = |msg: String| DeployError::CompressFailed(display.clone(), msg);

    if !local_path.is_dir() {
        return Err(err("本地目录不存在或不是目录".to_string()));
    }
    let basename = local_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| err("无法取得目录名".to_string()))?;
    let out_dir =
        local_path.parent().unwrap_or_else(|| Path::new(".")).join(format!("{}_", basename));
    std::fs::create_dir_all(&out_dir).map_err(|e| err(e.to_string()))?;
    let out_path = out_dir.join(archive_name.replace(".tar.gz", ".zip"));

    let out_file = std::fs::File::create(&out_path).map_err(|e| err(e.to_string()))?;
    let mut zip = zip::ZipWriter::new(out_file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let mut buf = Vec::new();
    for entry in WalkDir::new(local_path).into_iter().flatten() {
        let path = entry.path();
        let rel = path.strip_prefix(local_path).unwrap_or(path).to_string_lossy().replace('\\', "/");
        if rel.is_empty() {
            continue;
        }
        if entry.file_type().is_dir() {
            zip.add_directory(rel.as_str(), options).map_err(|e| err(e.to_string()))?;
        } else if entry.file_type().is_file() {
            zip.start_file(rel.as_str(), options).map_err(|e| err(e.to_string()))?;
            buf.clear();
            std::fs::File::open(path)
                .and_then(|mut f| f.read_to_end(&mut buf))
                .map_err(|e| err(e.to_string()))?;
            zip.write_all(&buf).map_err(|e| err(e.to_string()))?;
        }
    }
    zip.finish().map_err(|e| err(e.to_string()))?;
    Ok(out_path)
}
