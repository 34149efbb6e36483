//! ZIP archive session.
//!
//! An [`ArchiveSession`] streams entries into a ZIP container. Entries are
//! flat: each one is named by the base name of its source file. Names are
//! not keyed, so adding the same file twice writes two entries with the same
//! name, which the format allows.
//!
//! Every entry is written as a local header with placeholder sizes, the
//! entry data, and then a seek back to patch CRC and sizes into the header.
//! The central directory and end record are written by [`finish`].
//!
//! [`finish`]: ArchiveSession::finish

use crate::PathfinderError;
use crate::Result;
use crate::collection::config::CollectConfig;
use byteorder::LittleEndian;
use byteorder::WriteBytesExt;
use flate2::Compression;
use flate2::CrcReader;
use flate2::write::DeflateEncoder;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

/// Local header size without the name.
const LOCAL_HEADER_SIZE: u64 = 30;

/// Offset of the CRC field inside a local header.
const LOCAL_HEADER_CRC_OFFSET: u64 = 14;

/// PKZIP 2.0, the first version with deflate.
const VERSION: u16 = 20;

/// General purpose flag bit 11: the name is UTF-8.
const FLAG_UTF8_NAME: u16 = 1 << 11;

/// 1980-01-01 00:00:00, the MS-DOS epoch.
const DOS_DATE: u16 = (1 << 5) | 1;
const DOS_TIME: u16 = 0;

/// Largest size or offset a record without zip64 fields can carry.
const MAX_FIELD: u64 = 0xFFFF_FFFF;

/// Largest entry count the end record can carry.
const MAX_ENTRIES: usize = 0xFFFF;

/// How entry data is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// No compression.
    Stored,
    /// Raw deflate.
    Deflated,
}

impl CompressionMethod {
    const fn code(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflated => 8,
        }
    }
}

/// Central directory record for one written entry.
#[derive(Debug, Clone)]
struct EntryRecord {
    name: String,
    method: CompressionMethod,
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    header_offset: u32,
}

impl EntryRecord {
    fn flags(&self) -> u16 {
        if self.name.is_ascii() { 0 } else { FLAG_UTF8_NAME }
    }

    fn name_len(&self) -> io::Result<u16> {
        u16::try_from(self.name.len()).map_err(|_| io::Error::other("entry name too long"))
    }
}

/// An open archive being populated by a collection run.
///
/// Finishing writes the central directory and hands the sink back; for a
/// file sink the handle is closed when the returned value is dropped, after
/// the archive is complete. A session dropped without [`finish`] writes the
/// central directory on drop.
///
/// [`finish`]: ArchiveSession::finish
///
/// # Examples
///
/// ```no_run
/// use pathfinder_core::collection::ArchiveSession;
/// use pathfinder_core::collection::CollectConfig;
/// use std::path::Path;
///
/// let mut session = ArchiveSession::create(Path::new("out.zip"), &CollectConfig::default())?;
/// session.add_file(Path::new("/etc/hostname"))?;
/// session.finish()?;
/// # Ok::<(), pathfinder_core::PathfinderError>(())
/// ```
pub struct ArchiveSession<W: Write + Seek> {
    writer: Option<W>,
    method: CompressionMethod,
    level: Compression,
    entries: Vec<EntryRecord>,
}

impl ArchiveSession<File> {
    /// Creates (or truncates) the archive file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PathfinderError::ArchiveCreate`] if the file cannot be
    /// created.
    pub fn create(path: &Path, config: &CollectConfig) -> Result<Self> {
        let file = File::create(path).map_err(|source| PathfinderError::ArchiveCreate {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file, config))
    }
}

impl<W: Write + Seek> ArchiveSession<W> {
    /// Wraps an arbitrary seekable sink.
    pub fn new(sink: W, config: &CollectConfig) -> Self {
        let (method, level) = compression_for(config.compression_level);
        Self {
            writer: Some(sink),
            method,
            level,
            entries: Vec::new(),
        }
    }

    /// Number of entries written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entry has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compression method used for every entry.
    #[must_use]
    pub fn method(&self) -> CompressionMethod {
        self.method
    }

    /// Copies `source` into a new entry named by its base name.
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// - [`PathfinderError::SourceOpen`] if the file cannot be opened; nothing
    ///   is written in that case.
    /// - [`PathfinderError::EntryCreate`] if the entry cannot be started or
    ///   completed, or would not fit a non-zip64 archive.
    /// - [`PathfinderError::Copy`] if reading fails mid-copy. The entry stays
    ///   in the archive holding the bytes read before the failure.
    pub fn add_file(&mut self, source: &Path) -> Result<u64> {
        let file = File::open(source).map_err(|e| PathfinderError::SourceOpen {
            path: source.to_path_buf(),
            source: e,
        })?;
        let name = entry_name(source)?;

        if self.entries.len() >= MAX_ENTRIES {
            return Err(entry_error(&name, "archive already holds 65535 entries"));
        }
        if file.metadata().map(|m| m.len()).unwrap_or_default() > MAX_FIELD {
            return Err(entry_error(&name, "file larger than 4 GiB"));
        }

        let method = self.method;
        let level = self.level;
        let writer = self.sink().map_err(|e| entry_error(&name, e))?;

        let header_offset = writer
            .stream_position()
            .ok()
            .and_then(|pos| u32::try_from(pos).ok())
            .ok_or_else(|| entry_error(&name, "archive larger than 4 GiB"))?;

        let mut record = EntryRecord {
            name,
            method,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            header_offset,
        };
        write_local_header(writer, &record).map_err(|e| entry_error(&record.name, e))?;

        let mut reader = CrcReader::new(file);
        let copied = copy_data(&mut reader, writer, method, level);

        record.crc32 = reader.crc().sum();
        record.uncompressed_size = reader.crc().amount();
        complete_entry(writer, &mut record).map_err(|e| entry_error(&record.name, e))?;
        self.entries.push(record);

        copied.map_err(|e| PathfinderError::Copy {
            path: source.to_path_buf(),
            source: e,
        })
    }

    /// Writes the central directory and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns [`PathfinderError::ArchiveFinish`] if the trailer cannot be
    /// written. The sink is dropped in that case.
    pub fn finish(mut self) -> Result<W> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| PathfinderError::ArchiveFinish("archive already finished".to_string()))?;
        write_central_directory(&mut writer, &self.entries)
            .map_err(|e| PathfinderError::ArchiveFinish(e.to_string()))?;
        Ok(writer)
    }

    fn sink(&mut self) -> io::Result<&mut W> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("archive already finished"))
    }
}

impl<W: Write + Seek> Drop for ArchiveSession<W> {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = write_central_directory(&mut writer, &self.entries)
        {
            log::error!("Error closing zip archive: {e}");
        }
    }
}

/// Maps the configured level to a method and deflate level.
fn compression_for(level: Option<u8>) -> (CompressionMethod, Compression) {
    match level {
        Some(0) => (CompressionMethod::Stored, Compression::none()),
        None => (CompressionMethod::Deflated, Compression::default()),
        Some(n) => (CompressionMethod::Deflated, Compression::new(u32::from(n.min(9)))),
    }
}

/// Streams entry data into `writer`.
///
/// A deflate stream is closed even after a failed read, so a truncated entry
/// still decodes.
fn copy_data<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    method: CompressionMethod,
    level: Compression,
) -> io::Result<u64> {
    match method {
        CompressionMethod::Stored => io::copy(reader, writer),
        CompressionMethod::Deflated => {
            let mut encoder = DeflateEncoder::new(writer, level);
            let copied = io::copy(reader, &mut encoder);
            encoder.finish()?;
            copied
        }
    }
}

/// Patches CRC and sizes into the local header and returns to the end.
fn complete_entry<W: Write + Seek>(writer: &mut W, record: &mut EntryRecord) -> io::Result<()> {
    let end = writer.stream_position()?;
    let data_start =
        u64::from(record.header_offset) + LOCAL_HEADER_SIZE + u64::from(record.name_len()?);
    record.compressed_size = u32::try_from(end - data_start)
        .map_err(|_| io::Error::other("compressed entry larger than 4 GiB"))?;
    if end > MAX_FIELD {
        return Err(io::Error::other("archive larger than 4 GiB"));
    }

    writer.seek(SeekFrom::Start(
        u64::from(record.header_offset) + LOCAL_HEADER_CRC_OFFSET,
    ))?;
    writer.write_u32::<LittleEndian>(record.crc32)?;
    writer.write_u32::<LittleEndian>(record.compressed_size)?;
    writer.write_u32::<LittleEndian>(record.uncompressed_size)?;
    writer.seek(SeekFrom::Start(end))?;
    Ok(())
}

fn write_local_header<W: Write>(writer: &mut W, record: &EntryRecord) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(LOCAL_HEADER_SIGNATURE)?;
    writer.write_u16::<LittleEndian>(VERSION)?;
    writer.write_u16::<LittleEndian>(record.flags())?;
    writer.write_u16::<LittleEndian>(record.method.code())?;
    writer.write_u16::<LittleEndian>(DOS_TIME)?;
    writer.write_u16::<LittleEndian>(DOS_DATE)?;
    writer.write_u32::<LittleEndian>(record.crc32)?;
    writer.write_u32::<LittleEndian>(record.compressed_size)?;
    writer.write_u32::<LittleEndian>(record.uncompressed_size)?;
    writer.write_u16::<LittleEndian>(record.name_len()?)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_all(record.name.as_bytes())
}

fn write_central_header<W: Write>(writer: &mut W, record: &EntryRecord) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(CENTRAL_HEADER_SIGNATURE)?;
    writer.write_u16::<LittleEndian>(VERSION)?;
    writer.write_u16::<LittleEndian>(VERSION)?;
    writer.write_u16::<LittleEndian>(record.flags())?;
    writer.write_u16::<LittleEndian>(record.method.code())?;
    writer.write_u16::<LittleEndian>(DOS_TIME)?;
    writer.write_u16::<LittleEndian>(DOS_DATE)?;
    writer.write_u32::<LittleEndian>(record.crc32)?;
    writer.write_u32::<LittleEndian>(record.compressed_size)?;
    writer.write_u32::<LittleEndian>(record.uncompressed_size)?;
    writer.write_u16::<LittleEndian>(record.name_len()?)?;
    // Extra field, comment, disk number, internal and external attributes
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(record.header_offset)?;
    writer.write_all(record.name.as_bytes())
}

fn write_central_directory<W: Write + Seek>(
    writer: &mut W,
    entries: &[EntryRecord],
) -> io::Result<()> {
    let start = writer.stream_position()?;
    for record in entries {
        write_central_header(writer, record)?;
    }
    let end = writer.stream_position()?;

    let count = u16::try_from(entries.len()).map_err(|_| io::Error::other("too many entries"))?;
    let size = u32::try_from(end - start)
        .map_err(|_| io::Error::other("central directory larger than 4 GiB"))?;
    let offset =
        u32::try_from(start).map_err(|_| io::Error::other("archive larger than 4 GiB"))?;

    writer.write_u32::<LittleEndian>(END_OF_CENTRAL_DIRECTORY_SIGNATURE)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_u16::<LittleEndian>(count)?;
    writer.write_u16::<LittleEndian>(count)?;
    writer.write_u32::<LittleEndian>(size)?;
    writer.write_u32::<LittleEndian>(offset)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.flush()
}

fn entry_error(name: &str, reason: impl ToString) -> PathfinderError {
    PathfinderError::EntryCreate {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Archive entry name for a source path: its final component.
fn entry_name(source: &Path) -> Result<String> {
    source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| entry_error(&source.display().to_string(), "path has no file name"))
}

/// Joins the output directory and archive file name.
#[must_use]
pub fn archive_path(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(file_name)
}

/// Reads every entry back in stored order, repeated names included.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn read_entries(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    let signature = LOCAL_HEADER_SIGNATURE.to_le_bytes();
    let mut reader = io::Cursor::new(data);
    let mut entries = Vec::new();
    // An empty archive is only the 22-byte trailer, too short for the stream reader
    while data[reader.position() as usize..].starts_with(&signature) {
        let Some(mut entry) = zip::read::read_zipfile_from_stream(&mut reader).unwrap() else {
            break;
        };
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        entries.push((entry.name().to_string(), content));
    }
    entries
}
