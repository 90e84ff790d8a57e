//! Archive download and extraction.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use log::info;
use tar::Archive;

use crate::error::{Error, Result};
use crate::fsutil::make_directory;

/// Archive formats we can unpack, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from the file name, or `None` if unsupported.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveFormat::Tar)
        } else if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }
}

/// Download `url` into `dest`.
///
/// The body is streamed into a sibling `.part` file that is renamed into place
/// only once complete, so an interrupted download never looks finished.
pub fn download(url: &str, dest: &Path) -> Result<()> {
    info!("Downloading '{}'...", url);

    if let Some(parent) = dest.parent() {
        make_directory(parent)?;
    }

    let download_error = |message: String| Error::Download {
        url: url.to_string(),
        message,
    };

    let mut response = reqwest::blocking::get(url).map_err(|e| download_error(e.to_string()))?;
    if !response.status().is_success() {
        return Err(download_error(format!("HTTP {}", response.status())));
    }

    let mut partial_name = dest.as_os_str().to_owned();
    partial_name.push(".part");
    let partial = Path::new(&partial_name);

    let mut file = File::create(partial)?;
    let copied = response.copy_to(&mut file);
    drop(file);
    if let Err(e) = copied {
        let _ = fs::remove_file(partial);
        return Err(download_error(e.to_string()));
    }
    fs::rename(partial, dest)?;

    info!("Downloaded to '{}'", dest.display());
    Ok(())
}

/// Unpack `archive_path` into `dest`, keeping the archive's own layout.
pub fn unpack(archive_path: &Path, dest: &Path) -> Result<()> {
    let format = ArchiveFormat::detect(archive_path).ok_or_else(|| Error::UnsupportedArchive {
        path: archive_path.to_path_buf(),
    })?;

    make_directory(dest)?;
    info!("Unpacking '{}'...", archive_path.display());

    let file = BufReader::new(File::open(archive_path)?);
    match format {
        ArchiveFormat::TarGz => Archive::new(GzDecoder::new(file)).unpack(dest)?,
        ArchiveFormat::Tar => Archive::new(file).unpack(dest)?,
        ArchiveFormat::Zip => zip::ZipArchive::new(file)?.extract(dest)?,
    }

    info!("Unpacked to '{}'", dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_tar_gz(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(ArchiveFormat::detect(Path::new("libsquish-1.15.tgz")), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect(Path::new("a.tar.gz")), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect(Path::new("a.tar")), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::detect(Path::new("dxc.ZIP")), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::detect(Path::new("a.7z")), None);
    }

    #[test]
    fn test_unpack_tar_gz_keeps_layout() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("squish.tgz");
        write_tar_gz(&archive, &[("squish.h", "// header"), ("src/squish.cpp", "// code")]);

        let dest = temp.path().join("out");
        unpack(&archive, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("squish.h")).unwrap(), "// header");
        assert!(dest.join("src/squish.cpp").is_file());
    }

    #[test]
    fn test_unpack_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("dxc.zip");
        write_zip(&archive, &[("inc/dxcapi.h", "// api"), ("bin/x64/dxcompiler.dll", "MZ")]);

        let dest = temp.path().join("out");
        unpack(&archive, &dest).unwrap();

        assert!(dest.join("inc/dxcapi.h").is_file());
        assert!(dest.join("bin/x64/dxcompiler.dll").is_file());
    }

    #[test]
    fn test_unpack_unsupported_extension() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("thing.rar");
        fs::write(&archive, b"Rar!").unwrap();

        let err = unpack(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedArchive { ref path } if *path == PathBuf::from(&archive)));
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_truncated_download_leaves_nothing_behind() {
        use std::io::Read;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        // promise 1000 bytes, send 10, hang up
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n0123456789")
                .unwrap();
        });

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("squish.tgz");
        let err = download(&format!("http://127.0.0.1:{}/squish.tgz", port), &dest).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, Error::Download { .. }));
        assert!(!dest.exists());
        assert!(!temp.path().join("squish.tgz.part").exists());
    }

    #[test]
    fn test_download_rejects_bad_url() {
        let temp = TempDir::new().unwrap();
        let err = download("not-a-url", &temp.path().join("x.tgz")).unwrap_err();
        assert!(matches!(err, Error::Download { .. }));
    }
}
