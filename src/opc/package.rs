//! OPC package: the ZIP container around the document parts

use crate::error::{Error, Result};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// One ZIP entry, kept as stored in the source archive
#[derive(Clone, Debug)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// An OPC package (ZIP-based container for DOCX, XLSX, PPTX, etc.)
///
/// Entries keep their order, names and compression. Parts that are not
/// written to are copied back unchanged.
#[derive(Clone, Debug, Default)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }

        debug!("read package with {} entries", entries.len());
        Ok(Package { entries })
    }

    /// Raw bytes of a part (`word/document.xml` or `/word/document.xml`)
    pub fn read_part(&self, path: &str) -> Result<&[u8]> {
        let name = normalize(path);
        self.entries
            .iter()
            .find(|e| !e.is_dir && e.name == name)
            .map(|e| e.data.as_slice())
            .ok_or_else(|| Error::PartNotFound(name.to_string()))
    }

    /// Replace the bytes of a part, appending a new entry if it is absent
    pub fn write_part(&mut self, path: &str, data: Vec<u8>) {
        let name = normalize(path);
        match self.entries.iter_mut().find(|e| !e.is_dir && e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    /// Whether the package has a part at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.read_part(path).is_ok()
    }

    /// Part names in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
    }

    /// Save the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        for entry in &self.entries {
            let options: FileOptions<()> =
                FileOptions::default().compression_method(match entry.compression {
                    CompressionMethod::Stored => CompressionMethod::Stored,
                    _ => CompressionMethod::Deflated,
                });
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }

        zip.finish()?;
        Ok(())
    }
}

/// Package-absolute part names are stored without the leading '/'
fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("[Content_Types].xml", deflated).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.add_directory("word/", stored).unwrap();
        zip.start_file("word/document.xml", deflated).unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        zip.start_file("word/media/image1.png", stored).unwrap();
        zip.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_part() {
        let pkg = Package::from_bytes(&sample()).unwrap();
        assert_eq!(pkg.read_part("word/document.xml").unwrap(), b"<w:document/>");
        assert_eq!(pkg.read_part("/word/document.xml").unwrap(), b"<w:document/>");
        assert!(matches!(
            pkg.read_part("word/missing.xml"),
            Err(Error::PartNotFound(name)) if name == "word/missing.xml"
        ));
        assert!(pkg.read_part("word/").is_err());
    }

    #[test]
    fn test_roundtrip_keeps_order_and_compression() {
        let mut pkg = Package::from_bytes(&sample()).unwrap();
        pkg.write_part("word/document.xml", b"<w:document>new</w:document>".to_vec());

        let bytes = pkg.to_bytes().unwrap();
        let again = Package::from_bytes(&bytes).unwrap();
        assert_eq!(
            again.part_names().collect::<Vec<_>>(),
            vec!["[Content_Types].xml", "word/document.xml", "word/media/image1.png"]
        );
        assert_eq!(
            again.read_part("word/document.xml").unwrap(),
            b"<w:document>new</w:document>"
        );

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("word/").unwrap().is_dir());
        assert_eq!(
            archive.by_name("word/media/image1.png").unwrap().compression(),
            CompressionMethod::Stored
        );
    }

    #[test]
    fn test_write_new_part() {
        let mut pkg = Package::default();
        assert!(!pkg.contains("word/document.xml"));
        pkg.write_part("/word/document.xml", b"x".to_vec());
        assert!(pkg.contains("word/document.xml"));

        let again = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(again.read_part("word/document.xml").unwrap(), b"x");
    }
}
