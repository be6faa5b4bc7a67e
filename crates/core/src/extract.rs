//! Archive extraction.
//!
//! Each [`ArchiveKind`] has exactly one strategy, picked by [`extractor_for`].
//! The format is never sniffed from file contents or names.

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tar::Archive;

use crate::events::{EventSink, InstallEvent, Stage};
use crate::tool::ArchiveKind;
use crate::{Error, Result};

/// Extracts an executable from a downloaded release asset.
pub trait ArchiveExtractor: Send + Sync {
    /// Format handled by this extractor.
    fn kind(&self) -> ArchiveKind;

    /// Extract `archive` and return the path of the executable `binary`.
    ///
    /// `work_dir` is scratch space owned by the caller. Progress goes to `events`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extraction`] if the archive is corrupt, the target is
    /// unwritable, or the executable is missing from the payload.
    fn extract_binary(
        &self,
        archive: &Path,
        work_dir: &Path,
        binary: &str,
        events: &dyn EventSink,
    ) -> Result<PathBuf>;
}

/// Strategy for a given archive kind.
#[must_use]
pub fn extractor_for(kind: ArchiveKind) -> &'static dyn ArchiveExtractor {
    match kind {
        ArchiveKind::Bzip2 => &Bzip2Extractor,
        ArchiveKind::TarGz => &TarGzExtractor,
    }
}

/// Single-file bzip2 payloads, decompressed in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bzip2Extractor;

impl Bzip2Extractor {
    /// Decompress `path` next to itself and delete the archive.
    ///
    /// The payload lands at `path` minus its `.bz2` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extraction`] if `path` has no `.bz2` suffix or the
    /// stream cannot be decoded. A partially written payload is removed.
    pub fn extract_in_place(&self, path: &Path) -> Result<PathBuf> {
        let target = strip_suffix(path, ArchiveKind::Bzip2)
            .ok_or_else(|| Error::extraction(path, "expected a .bz2 file name"))?;

        if let Err(e) = decompress_bzip2(path, &target) {
            let _ = std::fs::remove_file(&target);
            return Err(Error::extraction(path, e.to_string()));
        }

        std::fs::remove_file(path).map_err(|e| Error::extraction(path, e.to_string()))?;
        Ok(target)
    }
}

fn decompress_bzip2(source: &Path, target: &Path) -> io::Result<()> {
    let mut decoder = BzDecoder::new(BufReader::new(File::open(source)?));
    let mut out = BufWriter::new(File::create(target)?);
    io::copy(&mut decoder, &mut out)?;
    out.flush()
}

impl ArchiveExtractor for Bzip2Extractor {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Bzip2
    }

    fn extract_binary(
        &self,
        archive: &Path,
        _work_dir: &Path,
        _binary: &str,
        events: &dyn EventSink,
    ) -> Result<PathBuf> {
        let target = self.extract_in_place(archive)?;
        detail(events, format!("decompressed bzip2 payload to {}", target.display()));
        Ok(target)
    }
}

/// Gzip-compressed tarballs, unpacked into a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl TarGzExtractor {
    /// Unpack every member of `archive` into `dest` and return `dest`.
    ///
    /// Members that would escape `dest` are not written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extraction`] if `dest` cannot be created or the
    /// archive cannot be read.
    pub fn extract_all(&self, archive: &Path, dest: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dest).map_err(|e| Error::extraction(archive, e.to_string()))?;
        let file = File::open(archive).map_err(|e| Error::extraction(archive, e.to_string()))?;

        let mut tarball = Archive::new(GzDecoder::new(BufReader::new(file)));
        tarball
            .unpack(dest)
            .map_err(|e| Error::extraction(archive, e.to_string()))?;

        Ok(dest.to_path_buf())
    }
}

impl ArchiveExtractor for TarGzExtractor {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::TarGz
    }

    fn extract_binary(
        &self,
        archive: &Path,
        work_dir: &Path,
        binary: &str,
        events: &dyn EventSink,
    ) -> Result<PathBuf> {
        let dir = self.extract_all(archive, &work_dir.join("extracted"))?;
        detail(events, format!("unpacked tarball into {}", dir.display()));
        let member = dir.join(binary);
        if member.is_file() {
            Ok(member)
        } else {
            Err(Error::extraction(
                archive,
                format!("archive has no member '{binary}'"),
            ))
        }
    }
}

fn detail(events: &dyn EventSink, message: String) {
    events.emit(InstallEvent::Detail {
        stage: Stage::Extracting,
        message,
    });
}

/// `path` with the extension of `kind` removed, if it carries it.
fn strip_suffix(path: &Path, kind: ArchiveKind) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(kind.extension())?.strip_suffix('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use bzip2::write::BzEncoder;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tar::Builder;
    use tempfile::TempDir;

    fn write_bz2(path: &Path, content: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = BzEncoder::new(file, bzip2::Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
    }

    fn write_tar_gz(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);

        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(name).unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append(&header, &content[..]).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_extractor_table() {
        assert_eq!(extractor_for(ArchiveKind::Bzip2).kind(), ArchiveKind::Bzip2);
        assert_eq!(extractor_for(ArchiveKind::TarGz).kind(), ArchiveKind::TarGz);
    }

    #[test]
    fn test_bzip2_in_place() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("restic_0.18.1_linux_amd64.bz2");
        write_bz2(&archive, b"#!restic binary");

        let extracted = Bzip2Extractor.extract_in_place(&archive).unwrap();

        assert_eq!(extracted, temp.path().join("restic_0.18.1_linux_amd64"));
        assert_eq!(std::fs::read(&extracted).unwrap(), b"#!restic binary");
        assert!(!archive.exists(), "archive should be replaced by its payload");
    }

    #[test]
    fn test_bzip2_extract_binary_reports_payload() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("restic_0.18.1_darwin_arm64.bz2");
        write_bz2(&archive, b"restic");
        let sink = MemorySink::new();

        let path = extractor_for(ArchiveKind::Bzip2)
            .extract_binary(&archive, temp.path(), "restic", &sink)
            .unwrap();

        assert_eq!(path, temp.path().join("restic_0.18.1_darwin_arm64"));
        let details = sink.details_of(Stage::Extracting);
        assert_eq!(details.len(), 1);
        assert!(details[0].contains("restic_0.18.1_darwin_arm64"));
    }

    #[test]
    fn test_bzip2_corrupt_leaves_no_payload() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("restic_0.18.1_linux_amd64.bz2");
        std::fs::write(&archive, b"this is not bzip2 data at all").unwrap();

        let err = Bzip2Extractor.extract_in_place(&archive).unwrap_err();

        assert!(matches!(err, Error::Extraction { ref path, .. } if *path == archive));
        assert!(!temp.path().join("restic_0.18.1_linux_amd64").exists());
    }

    #[test]
    fn test_bzip2_requires_suffix() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("restic.tar.gz");
        std::fs::write(&archive, b"x").unwrap();

        assert!(matches!(
            Bzip2Extractor.extract_in_place(&archive),
            Err(Error::Extraction { .. })
        ));
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(
            strip_suffix(Path::new("/a/b.tar.gz"), ArchiveKind::TarGz),
            Some(PathBuf::from("/a/b"))
        );
        assert_eq!(
            strip_suffix(Path::new("/a/b.bz2"), ArchiveKind::Bzip2),
            Some(PathBuf::from("/a/b"))
        );
        assert_eq!(strip_suffix(Path::new("/a/.bz2"), ArchiveKind::Bzip2), None);
        assert_eq!(strip_suffix(Path::new("/a/bbz2"), ArchiveKind::Bzip2), None);
    }

    #[test]
    fn test_tar_gz_extract_all() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("resticprofile_0.32.0_linux_amd64.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("LICENSE", b"license"),
                ("README.md", b"readme"),
                ("resticprofile", b"binary"),
            ],
        );

        let dest = temp.path().join("out");
        let dir = TarGzExtractor.extract_all(&archive, &dest).unwrap();

        assert_eq!(dir, dest);
        assert_eq!(std::fs::read(dest.join("resticprofile")).unwrap(), b"binary");
        assert!(dest.join("LICENSE").is_file());
        assert!(archive.exists(), "tarball is left for the caller");
    }

    #[test]
    fn test_tar_gz_extract_binary() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("rp.tar.gz");
        write_tar_gz(&archive, &[("resticprofile", b"binary")]);
        let sink = MemorySink::new();

        let path = TarGzExtractor
            .extract_binary(&archive, temp.path(), "resticprofile", &sink)
            .unwrap();
        assert_eq!(path, temp.path().join("extracted").join("resticprofile"));
        assert_eq!(sink.details_of(Stage::Extracting).len(), 1);
    }

    #[test]
    fn test_tar_gz_missing_member() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("rp.tar.gz");
        write_tar_gz(&archive, &[("README.md", b"readme")]);
        let sink = MemorySink::new();

        let err = TarGzExtractor
            .extract_binary(&archive, temp.path(), "resticprofile", &sink)
            .unwrap_err();
        assert!(err.to_string().contains("no member 'resticprofile'"));
    }

    #[test]
    fn test_tar_gz_corrupt() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("rp.tar.gz");
        std::fs::write(&archive, b"garbage").unwrap();

        let err = TarGzExtractor
            .extract_all(&archive, &temp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
